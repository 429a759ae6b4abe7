//! Reconcile a property on one platform with an accessor-method pair on the other.
//!
//! Accessor methods named by a source property are removed from the method
//! table whenever they are present, even when the property itself is not
//! registered in the target. A not-fully-matching property therefore forfeits
//! its accessors. Callers run the merge exactly once per direction.
use std::collections::BTreeMap;

use crate::model::{MethodDescriptor, PropertyDescriptor};

/// For each property in `source`, look up its effective getter and setter in
/// `methods` (removing them) and register the property in `target` when:
/// - the getter exists, and the setter too unless the property is read-only
/// - `target` already has a property of that name
/// - the getter returns the property type and the setter takes it
///
/// Returns the number of properties registered.
pub fn merge_accessors(
    methods: &mut BTreeMap<String, MethodDescriptor>,
    source: &BTreeMap<String, PropertyDescriptor>,
    target: &mut BTreeMap<String, PropertyDescriptor>,
) -> usize {
    let mut registered = 0;
    for (name, property) in source {
        let getter = methods.remove(property.effective_getter());
        let setter = property.effective_setter().and_then(|key| methods.remove(&key));

        let Some(getter) = getter else {
            if setter.is_some() {
                tracing::trace!(property = %name, "setter forfeited without getter");
            }
            continue;
        };

        let types_match = getter.return_type == property.ty
            && (property.read_only
                || setter
                    .as_ref()
                    .and_then(|s| s.arguments.first())
                    .is_some_and(|arg| arg.ty == property.ty));
        let accessors_complete = property.read_only || setter.is_some();

        if accessors_complete && target.contains_key(name) && types_match {
            tracing::trace!(property = %name, "accessors merged into property");
            target.insert(name.clone(), property.clone());
            registered += 1;
        } else {
            tracing::trace!(property = %name, getter = %getter, "accessors forfeited");
        }
    }
    registered
}
