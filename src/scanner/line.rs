//! Declaration-kind classifier for a single comment-free line.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::EnumKind;
use crate::syntax::{is_deprecation_marker, is_ident_char, leading_ident, split_top_level, Cursor};

static CLASS_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@interface\s+(\w+)\s*(?:<([^>]*)>)?\s*:\s*(\w+)(.*)$").unwrap());
static CATEGORY_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@interface\s+(\w+)\s*(?:<[^>]*>)?\s*\(\s*(\w*)\s*\)(.*)$").unwrap());
static PROTOCOL_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"@protocol\s+(\w+)(.*)$").unwrap());
static ENUM_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(NS_ENUM|NS_OPTIONS|NS_CLOSED_ENUM|NS_ERROR_ENUM)\s*\(\s*(\w+)\s*,\s*(\w+)\s*\)").unwrap()
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Line<'a> {
    ClassOpen {
        name: &'a str,
        superclass: &'a str,
        protocols: Option<&'a str>,
        /// A deprecation macro precedes `@interface` on the same line.
        deprecated: bool,
    },
    CategoryOpen {
        class: &'a str,
        category: &'a str,
        protocols: Option<&'a str>,
    },
    ProtocolOpen {
        name: &'a str,
        protocols: Option<&'a str>,
    },
    /// `@class X;` / `@protocol X;`
    Forward,
    End,
    Required,
    Optional,
    EnumOpen {
        kind: EnumKind,
        underlying: &'a str,
        name: &'a str,
        /// Text after `{` when the body starts on this line.
        body: Option<&'a str>,
    },
    Method(&'a str),
    Property(&'a str),
    /// A standalone deprecation marker.
    Deprecation,
    Other,
}

pub fn classify(line: &str) -> Line<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Line::Other;
    }
    if trimmed.starts_with("@end") {
        return Line::End;
    }
    if trimmed.starts_with("@required") {
        return Line::Required;
    }
    if trimmed.starts_with("@optional") {
        return Line::Optional;
    }
    if trimmed.starts_with("@class") {
        return Line::Forward;
    }
    if trimmed.starts_with("@property") {
        return Line::Property(trimmed);
    }
    if trimmed.starts_with(['-', '+']) {
        return Line::Method(trimmed);
    }

    if let Some(caps) = ENUM_OPEN.captures(trimmed) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        let tail = &trimmed[whole.end..];
        // `typedef NS_ENUM(NSInteger, X);` declares nothing
        if tail.trim_start().starts_with(';') {
            return Line::Other;
        }
        let (Some(kind), Some(underlying), Some(name)) = (caps.get(1), caps.get(2), caps.get(3)) else {
            return Line::Other;
        };
        return Line::EnumOpen {
            kind: EnumKind::from_macro(kind.as_str()),
            underlying: underlying.as_str(),
            name: name.as_str(),
            body: tail.find('{').map(|i| &tail[i + 1..]),
        };
    }

    if let Some(caps) = CLASS_OPEN.captures(trimmed) {
        let (Some(whole), Some(name), Some(superclass)) = (caps.get(0), caps.get(1), caps.get(3)) else {
            return Line::Other;
        };
        let generics = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        let tail = caps.get(4).map(|m| m.as_str()).unwrap_or("");
        let prefix = &trimmed[..whole.start()];
        return Line::ClassOpen {
            name: name.as_str(),
            superclass: superclass.as_str(),
            protocols: adoption_list(tail, generics),
            deprecated: prefix.split(|c: char| !is_ident_char(c)).any(is_deprecation_marker),
        };
    }

    if let Some(caps) = CATEGORY_OPEN.captures(trimmed) {
        let (Some(class), Some(category)) = (caps.get(1), caps.get(2)) else {
            return Line::Other;
        };
        let tail = caps.get(3).map(|m| m.as_str()).unwrap_or("");
        return Line::CategoryOpen {
            class: class.as_str(),
            category: category.as_str(),
            protocols: adoption_list(tail, ""),
        };
    }

    if let Some(caps) = PROTOCOL_OPEN.captures(trimmed) {
        let Some(name) = caps.get(1) else {
            return Line::Other;
        };
        let tail = caps.get(2).map(|m| m.as_str()).unwrap_or("").trim_start();
        if tail.starts_with([';', ',']) {
            return Line::Forward;
        }
        return Line::ProtocolOpen {
            name: name.as_str(),
            protocols: adoption_list(tail, ""),
        };
    }

    match leading_ident(trimmed) {
        Some(ident) if is_deprecation_marker(ident) => Line::Deprecation,
        _ => Line::Other,
    }
}

/// The `<...>` adoption list following a class, category or protocol name.
/// For generic classes a first group naming only the class's own type
/// parameters is the superclass's type arguments and is skipped.
fn adoption_list<'a>(tail: &'a str, generics: &str) -> Option<&'a str> {
    let params: Vec<&str> = split_top_level(generics, ',')
        .into_iter()
        .filter_map(|p| p.split_whitespace().last())
        .collect();

    let mut c = Cursor::new(tail);
    c.skip_ws();
    let first = c.balanced('<', '>')?;
    let is_type_arguments = !params.is_empty()
        && split_top_level(first, ',').iter().all(|arg| params.contains(&arg.trim()));
    if !is_type_arguments {
        return Some(first);
    }
    c.skip_ws();
    c.balanced('<', '>')
}
