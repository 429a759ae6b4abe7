//! Effective member sets along the superclass chain.
use std::collections::{BTreeMap, BTreeSet};

use crate::corpus::Corpus;
use crate::model::{InterfaceDescriptor, MethodDescriptor, PropertyDescriptor};
use crate::namespace::ROOT_CLASS;

/// Own plus inherited members of one interface.
#[derive(Clone, Debug, Default)]
pub struct Flattened {
    pub methods: BTreeMap<String, MethodDescriptor>,
    pub properties: BTreeMap<String, PropertyDescriptor>,
    /// First ancestor with no declaration in the corpus. `None` when the chain
    /// ends at the root sentinel or at a class with no known superclass.
    pub foreign_root: Option<String>,
}

impl Corpus {
    /// Nearest declaration wins. Protocols contribute only their own members;
    /// adopted protocols are never followed.
    pub fn flatten(&self, interface: &InterfaceDescriptor) -> Flattened {
        let mut flat = Flattened {
            methods: interface.methods.clone(),
            properties: interface.properties.clone(),
            foreign_root: None,
        };
        flat.foreign_root = self.walk_ancestors(interface, |ancestor| {
            for (key, method) in &ancestor.methods {
                flat.methods.entry(key.clone()).or_insert_with(|| method.clone());
            }
            for (name, property) in &ancestor.properties {
                flat.properties.entry(name.clone()).or_insert_with(|| property.clone());
            }
        });
        flat
    }

    /// The foreign root of `interface`'s chain, or the root sentinel when the
    /// whole chain is known.
    pub fn root_class(&self, interface: &InterfaceDescriptor) -> String {
        self.walk_ancestors(interface, |_| {})
            .unwrap_or_else(|| ROOT_CLASS.to_string())
    }

    // Visits known ancestors nearest first and returns the foreign root.
    fn walk_ancestors<'a>(
        &'a self,
        interface: &'a InterfaceDescriptor,
        mut visit: impl FnMut(&'a InterfaceDescriptor),
    ) -> Option<String> {
        let mut seen = BTreeSet::from([interface.name.as_str()]);
        let mut next = interface.superclass();
        while let Some(name) = next {
            if name == ROOT_CLASS {
                return None;
            }
            if !seen.insert(name) {
                tracing::debug!(class = %interface.name, at = name, "inheritance cycle");
                return None;
            }
            let Some(ancestor) = self.classes.get(name) else {
                return Some(name.to_string());
            };
            visit(ancestor);
            next = ancestor.superclass();
        }
        None
    }
}
