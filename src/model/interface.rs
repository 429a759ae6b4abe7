use std::collections::BTreeMap;

use indexmap::IndexSet;
use serde::Serialize;

use super::{MethodDescriptor, PropertyDescriptor};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InterfaceKind {
    /// `superclass` is `None` while only categories of the class have been seen.
    Class { superclass: Option<String> },
    Protocol,
}

/// A class or protocol: named container of methods, properties and adopted
/// protocol names (first-appearance order).
#[derive(Clone, Debug, Serialize)]
pub struct InterfaceDescriptor {
    pub name: String,
    #[serde(flatten)]
    pub kind: InterfaceKind,
    pub methods: BTreeMap<String, MethodDescriptor>,
    pub properties: BTreeMap<String, PropertyDescriptor>,
    pub protocols: IndexSet<String>,
}

impl InterfaceDescriptor {
    pub fn new_class(name: impl Into<String>, superclass: Option<String>) -> Self {
        Self::new(name, InterfaceKind::Class { superclass })
    }

    pub fn new_protocol(name: impl Into<String>) -> Self {
        Self::new(name, InterfaceKind::Protocol)
    }

    fn new(name: impl Into<String>, kind: InterfaceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            methods: BTreeMap::new(),
            properties: BTreeMap::new(),
            protocols: IndexSet::new(),
        }
    }

    pub fn is_class(&self) -> bool { matches!(self.kind, InterfaceKind::Class { .. }) }

    pub fn superclass(&self) -> Option<&str> {
        match &self.kind {
            InterfaceKind::Class { superclass } => superclass.as_deref(),
            InterfaceKind::Protocol => None,
        }
    }

    pub fn set_superclass(&mut self, name: impl Into<String>) {
        if let InterfaceKind::Class { superclass } = &mut self.kind {
            *superclass = Some(name.into());
        }
    }

    /// Later declarations of the same selector replace earlier ones.
    pub fn add_method(&mut self, method: MethodDescriptor) {
        self.methods.insert(method.key.clone(), method);
    }

    pub fn add_property(&mut self, property: PropertyDescriptor) {
        self.properties.insert(property.name.clone(), property);
    }

    pub fn adopt(&mut self, protocol: impl Into<String>) {
        self.protocols.insert(protocol.into());
    }

    /// Direct adoption only; inherited adoptions are not consulted.
    pub fn adopts(&self, protocol: &str) -> bool { self.protocols.contains(protocol) }
}
