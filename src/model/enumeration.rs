use std::fmt;

use serde::Serialize;

use super::{Structural, TypeDescriptor};

/// Which two-argument macro opened the enumeration. Kept for the emitter only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumKind {
    #[default]
    Enum,
    Options,
}

impl EnumKind {
    pub fn from_macro(name: &str) -> Self {
        if name == "NS_OPTIONS" { Self::Options } else { Self::Enum }
    }

    pub fn macro_name(self) -> &'static str {
        match self {
            Self::Enum => "NS_ENUM",
            Self::Options => "NS_OPTIONS",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EnumMember {
    pub name: String,
    /// Already rewritten into the unified namespace.
    pub value: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EnumerationDescriptor {
    pub kind: EnumKind,
    pub underlying: TypeDescriptor,
    /// Unified-namespace name.
    pub name: String,
    pub members: Vec<EnumMember>,
}

impl EnumerationDescriptor {
    pub fn new(kind: EnumKind, underlying: TypeDescriptor, name: impl Into<String>) -> Self {
        Self { kind, underlying, name: name.into(), members: Vec::new() }
    }

    pub fn push_member(&mut self, name: impl Into<String>, value: Option<String>) {
        self.members.push(EnumMember { name: name.into(), value });
    }

    pub fn remove_member(&mut self, name: &str) {
        self.members.retain(|m| m.name != name);
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.members.iter().any(|m| m.name == name)
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.name.as_str())
    }

    /// Drop every member `other` does not declare.
    pub fn retain_shared(&mut self, other: &Self) {
        self.members.retain(|m| other.has_member(&m.name));
    }

    pub fn is_empty(&self) -> bool { self.members.is_empty() }
}

impl Structural for EnumerationDescriptor {
    fn equivalent(&self, other: &Self) -> bool {
        self.underlying == other.underlying
            && self.name == other.name
            && self.member_names().eq(other.member_names())
    }
}

impl fmt::Display for EnumerationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "typedef {}({}, {}) {{", self.kind.macro_name(), self.underlying, self.name)?;
        let members: Vec<String> = self
            .members
            .iter()
            .map(|m| match &m.value {
                Some(value) => format!("    {} = {value}", m.name),
                None => format!("    {}", m.name),
            })
            .collect();
        writeln!(f, "{}", members.join(",\n"))?;
        write!(f, "}};")
    }
}
