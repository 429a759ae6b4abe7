//! Typed declaration model shared by both corpora and the unified output.
//!
//! Per-corpus descriptors are built once by the scanner and afterwards only
//! touched by the rewriter (type names) and by unification (flag OR-ing on the
//! surviving copy). Unified descriptors are fresh values.
pub mod ty;
pub mod method;
pub mod property;
pub mod enumeration;
pub mod interface;

pub use ty::{Qualifier, TypeDescriptor};
pub use method::{Argument, MethodDescriptor, MethodFlags, MethodPrefix};
pub use property::{Nullability, PropertyDescriptor};
pub use enumeration::{EnumKind, EnumMember, EnumerationDescriptor};
pub use interface::{InterfaceDescriptor, InterfaceKind};

/// Cross-variant structural equivalence: every type- and attribute-relevant
/// field matches, presentation-only fields (argument names) are ignored.
pub trait Structural {
    fn equivalent(&self, other: &Self) -> bool;
}
