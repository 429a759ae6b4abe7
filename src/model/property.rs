use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::{Structural, TypeDescriptor};
use crate::syntax::{split_top_level, strip_attribute_macros, Cursor};

static BLOCK_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s*\^\s*(\w+)\s*\)").unwrap());
static TRAILING_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*?)\b(\w+)\s*$").unwrap());

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Nullability {
    #[default]
    Absent,
    Nullable,
    NullResettable,
}

#[derive(Clone, Debug, Serialize)]
pub struct PropertyDescriptor {
    pub ty: TypeDescriptor,
    pub name: String,
    pub nullability: Nullability,
    pub read_only: bool,
    pub getter: Option<String>,
    pub setter: Option<String>,
    pub required: bool,
}

impl PropertyDescriptor {
    /// Parse `@property (attr, ...) type name;`.
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.trim().strip_prefix("@property")?;
        let mut c = Cursor::new(rest);
        c.skip_ws();
        let attributes = if c.peek() == Some('(') { c.balanced('(', ')')? } else { "" };

        let decl = c.rest();
        let decl = decl.split(';').next().unwrap_or(decl);
        let decl = strip_attribute_macros(decl, false);

        let (type_text, name) = match BLOCK_NAME.captures(&decl) {
            Some(caps) => {
                let name = caps[1].to_string();
                (BLOCK_NAME.replace(&decl, "(^)").into_owned(), name)
            }
            None => {
                let caps = TRAILING_NAME.captures(&decl)?;
                (caps[1].to_string(), caps[2].to_string())
            }
        };
        if type_text.trim().is_empty() {
            return None;
        }

        let mut property = Self {
            ty: TypeDescriptor::parse(&type_text),
            name,
            nullability: Nullability::Absent,
            read_only: false,
            getter: None,
            setter: None,
            required: false,
        };
        for attribute in split_top_level(attributes, ',') {
            property.apply_attribute(attribute);
        }
        Some(property)
    }

    fn apply_attribute(&mut self, attribute: &str) {
        let attribute: String = attribute.split_whitespace().collect();
        match attribute.as_str() {
            "nullable" => self.nullability = Nullability::Nullable,
            "null_resettable" => self.nullability = Nullability::NullResettable,
            "readonly" => self.read_only = true,
            "readwrite" => self.read_only = false,
            other => {
                if let Some(setter) = other.strip_prefix("setter=") {
                    self.setter = Some(setter.to_string());
                } else if let Some(getter) = other.strip_prefix("getter=") {
                    self.getter = Some(getter.to_string());
                }
            }
        }
    }

    pub fn effective_getter(&self) -> &str {
        self.getter.as_deref().unwrap_or(&self.name)
    }

    /// `None` for read-only properties, even when a setter was spelled out.
    pub fn effective_setter(&self) -> Option<String> {
        if self.read_only {
            return None;
        }
        Some(match &self.setter {
            Some(setter) => setter.clone(),
            None => default_setter(&self.name),
        })
    }

    pub fn merge_flags(&mut self, other: &Self) {
        self.required |= other.required;
        self.read_only |= other.read_only;
    }
}

/// `value` → `setValue:`
pub fn default_setter(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("set{}{}:", first.to_ascii_uppercase(), chars.as_str()),
        None => "set:".to_string(),
    }
}

impl Structural for PropertyDescriptor {
    fn equivalent(&self, other: &Self) -> bool {
        self.ty == other.ty
            && self.name == other.name
            && self.nullability == other.nullability
            && self.read_only == other.read_only
            && self.effective_getter() == other.effective_getter()
            && self.effective_setter() == other.effective_setter()
    }
}

impl fmt::Display for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut attributes = vec!["nonatomic".to_string()];
        attributes.push(if self.read_only { "readonly" } else { "readwrite" }.to_string());
        match self.nullability {
            Nullability::Absent => {}
            Nullability::Nullable => attributes.push("nullable".to_string()),
            Nullability::NullResettable => attributes.push("null_resettable".to_string()),
        }
        if let Some(getter) = &self.getter {
            attributes.push(format!("getter={getter}"));
        }
        if let Some(setter) = &self.setter {
            attributes.push(format!("setter={setter}"));
        }
        write!(f, "@property({}) {} {}", attributes.join(", "), self.ty, self.name)
    }
}
