use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use super::Structural;
use crate::namespace::{is_unified, SMALL_INTEGER_TYPES};
use crate::syntax::collapse_whitespace;

/// Fixed qualifier vocabulary: nullability, ownership, genericity, storage,
/// outlet and const-ness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Qualifier {
    Nullable,
    Nonnull,
    NullUnspecified,
    Weak,
    Strong,
    UnsafeUnretained,
    Autoreleasing,
    Kindof,
    Static,
    Extern,
    Outlet,
    Const,
}

impl Qualifier {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "nullable" | "_Nullable" | "__nullable" => Self::Nullable,
            "nonnull" | "_Nonnull" | "__nonnull" => Self::Nonnull,
            "null_unspecified" | "_Null_unspecified" | "__null_unspecified" => Self::NullUnspecified,
            "__weak" => Self::Weak,
            "__strong" => Self::Strong,
            "__unsafe_unretained" => Self::UnsafeUnretained,
            "__autoreleasing" => Self::Autoreleasing,
            "__kindof" => Self::Kindof,
            "static" => Self::Static,
            "extern" => Self::Extern,
            "IBOutlet" => Self::Outlet,
            "const" => Self::Const,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nullable => "nullable",
            Self::Nonnull => "nonnull",
            Self::NullUnspecified => "null_unspecified",
            Self::Weak => "__weak",
            Self::Strong => "__strong",
            Self::UnsafeUnretained => "__unsafe_unretained",
            Self::Autoreleasing => "__autoreleasing",
            Self::Kindof => "__kindof",
            Self::Static => "static",
            Self::Extern => "extern",
            Self::Outlet => "IBOutlet",
            Self::Const => "const",
        }
    }
}

/// Normalized type reference: qualifiers, base name and a trailing-pointer flag.
///
/// Ordering doubles as equality. Two unqualified types where one is a small
/// integer and the other a non-pointer unified name compare equal, so an
/// integer parameter on one platform matches an enumeration on the other.
/// That rule makes equality non-transitive across distinct enumerations.
/// Never key a `BTreeMap`/`BTreeSet` on this type or sort a list of them.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TypeDescriptor {
    pub qualifiers: Vec<Qualifier>,
    pub name: String,
    pub pointer: bool,
}

impl TypeDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn parse(text: &str) -> Self {
        let mut out = Self::default();
        let mut text = collapse_whitespace(text);

        // leading qualifiers
        loop {
            let (head, tail) = text.split_once(' ').unwrap_or((text.as_str(), ""));
            match Qualifier::from_token(head) {
                Some(q) if !tail.is_empty() => {
                    out.push_qualifier(q);
                    text = tail.to_string();
                }
                _ => break,
            }
        }

        // qualifiers written after the pointer marker: `NSString * _Nullable`
        loop {
            let trimmed = text.trim_end();
            let split = trimmed.rfind([' ', '*']).map(|i| i + 1).unwrap_or(0);
            if split == 0 {
                break;
            }
            match Qualifier::from_token(&trimmed[split..]) {
                Some(q) => {
                    out.push_qualifier(q);
                    text = trimmed[..split].trim_end().to_string();
                }
                None => break,
            }
        }

        let mut text = text.trim_end();
        if let Some(stripped) = text.strip_suffix('*') {
            out.pointer = true;
            text = stripped.trim_end();
        }
        out.name = canonical_punctuation(text);
        out
    }

    fn push_qualifier(&mut self, q: Qualifier) {
        if !self.qualifiers.contains(&q) {
            self.qualifiers.push(q);
        }
    }

    pub fn is_small_integer(&self) -> bool {
        SMALL_INTEGER_TYPES.contains(&self.name.as_str())
    }

    /// A non-pointer name in the unified namespace.
    pub fn is_enumeration(&self) -> bool {
        is_unified(&self.name) && !self.pointer
    }

    fn sorted_qualifiers(&self) -> Vec<Qualifier> {
        let mut qualifiers = self.qualifiers.clone();
        qualifiers.sort();
        qualifiers
    }
}

/// `NSArray < NSString * >` → `NSArray<NSString*>`
fn canonical_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '*' | '<' | '>' | ',') {
            while out.ends_with(' ') {
                out.pop();
            }
            out.push(c);
        } else if c == ' ' && out.ends_with(['*', '<', '>', ',']) {
            continue;
        } else {
            out.push(c);
        }
    }
    out
}

impl Ord for TypeDescriptor {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.qualifiers.is_empty() && other.qualifiers.is_empty() {
            let interchangeable = (self.is_small_integer() && other.is_enumeration())
                || (self.is_enumeration() && other.is_small_integer());
            if interchangeable {
                return Ordering::Equal;
            }
        }
        self.sorted_qualifiers()
            .cmp(&other.sorted_qualifiers())
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.pointer.cmp(&other.pointer))
    }
}

impl PartialOrd for TypeDescriptor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl Eq for TypeDescriptor {}

impl Structural for TypeDescriptor {
    fn equivalent(&self, other: &Self) -> bool { self == other }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for q in &self.qualifiers {
            write!(f, "{} ", q.as_str())?;
        }
        f.write_str(&self.name)?;
        if self.pointer {
            f.write_str(" *")?;
        }
        Ok(())
    }
}
