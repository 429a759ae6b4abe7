//! Type-reference rewriting into the unified namespace.
//!
//! The substitution table is computed once from the closed unified name sets
//! and then applied as a pure function. Rewriting an already rewritten name is
//! a no-op: unified names carry no platform prefix and geometry targets are
//! never geometry sources.
use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::config::UnifyConfig;
use crate::corpus::Corpus;
use crate::model::{InterfaceDescriptor, TypeDescriptor};
use crate::namespace::{platform_spellings, strip_platform_prefix, UNIFIED_PREFIX};

static IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Za-z_]\w*\b").unwrap());

/// Unified names produced by class, protocol and enumeration matching.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameSets {
    pub classes: BTreeSet<String>,
    pub protocols: BTreeSet<String>,
    pub enums: BTreeSet<String>,
}

#[derive(Clone, Debug)]
pub struct RewriteMap {
    geometry: BTreeMap<String, String>,
    classes: BTreeSet<String>,
    enums: BTreeSet<String>,
    /// Platform spelling → unified protocol name.
    protocols: BTreeMap<String, String>,
    /// Platform spelling → unified class or protocol name, for identifiers
    /// nested anywhere in a type (`NSArray<UIView*>`, `id<UIFooDelegate>`).
    identifiers: BTreeMap<String, String>,
}

impl RewriteMap {
    pub fn new(names: &NameSets, config: &UnifyConfig) -> Self {
        let protocols: BTreeMap<String, String> = spelling_table(&names.protocols);
        let mut identifiers = spelling_table(&names.classes);
        identifiers.extend(protocols.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self {
            geometry: config.geometry.clone(),
            classes: names.classes.clone(),
            enums: names.enums.clone(),
            protocols,
            identifiers,
        }
    }

    /// Rewrite a base type name.
    pub fn rewrite_name(&self, name: &str) -> String {
        if let Some(neutral) = self.geometry.get(name) {
            return neutral.clone();
        }
        let mut name = name.to_string();
        if let Some(rest) = strip_platform_prefix(&name) {
            let candidate = format!("{UNIFIED_PREFIX}{rest}");
            let base = candidate.split('<').next().unwrap_or(&candidate).trim_end();
            if self.enums.contains(&candidate) || self.classes.contains(base) {
                name = candidate;
            }
        }
        self.substitute_identifiers(&name)
    }

    /// An adopted-protocol name; unchanged unless it has a unified counterpart.
    pub fn rewrite_protocol<'a>(&'a self, name: &'a str) -> &'a str {
        self.protocols.get(name).map_or(name, String::as_str)
    }

    pub fn rewrite_type(&self, ty: &TypeDescriptor) -> TypeDescriptor {
        TypeDescriptor { name: self.rewrite_name(&ty.name), ..ty.clone() }
    }

    pub fn rewrite_interface(&self, interface: &mut InterfaceDescriptor) {
        for method in interface.methods.values_mut() {
            method.return_type = self.rewrite_type(&method.return_type);
            for argument in &mut method.arguments {
                argument.ty = self.rewrite_type(&argument.ty);
            }
        }
        for property in interface.properties.values_mut() {
            property.ty = self.rewrite_type(&property.ty);
        }
        interface.protocols = interface
            .protocols
            .iter()
            .map(|p| self.rewrite_protocol(p).to_string())
            .collect::<IndexSet<_>>();
    }

    /// Rewrite every class and protocol of a corpus in place. Enumeration
    /// values were rewritten at scan time and are left alone.
    pub fn rewrite_corpus(&self, corpus: &mut Corpus) {
        for interface in corpus.classes.values_mut().chain(corpus.protocols.values_mut()) {
            self.rewrite_interface(interface);
        }
    }

    // whole identifiers only: `UIFooDelegateEx` is never touched by `UIFooDelegate`
    fn substitute_identifiers(&self, name: &str) -> String {
        if self.identifiers.is_empty() {
            return name.to_string();
        }
        IDENT
            .replace_all(name, |caps: &Captures| {
                let ident = &caps[0];
                self.identifiers.get(ident).map_or(ident, String::as_str).to_string()
            })
            .into_owned()
    }
}

/// Both platform spellings of every unified name, mapped to that name.
fn spelling_table(unified: &BTreeSet<String>) -> BTreeMap<String, String> {
    unified
        .iter()
        .filter_map(|name| platform_spellings(name).map(|spellings| (name, spellings)))
        .flat_map(|(name, spellings)| spellings.into_iter().map(move |s| (s, name.clone())))
        .collect()
}
