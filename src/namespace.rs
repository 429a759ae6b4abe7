//! Platform namespace prefixes and the conversions between them.
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub const MOBILE_PREFIX: &str = "UI";
pub const DESKTOP_PREFIX: &str = "NS";
pub const UNIFIED_PREFIX: &str = "MAI";

/// Sentinel root of every class chain; flattening stops here.
pub const ROOT_CLASS: &str = "NSObject";

const PLATFORM_PREFIXES: [&str; 2] = [MOBILE_PREFIX, DESKTOP_PREFIX];

/// Integer types that may stand in for a unified enumeration.
pub const SMALL_INTEGER_TYPES: [&str; 4] = ["NSUInteger", "NSInteger", "unsigned int", "int"];

static PLATFORM_IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:NS|UI)[A-Z]\w*").unwrap());

/// Remainder of `name` after a platform prefix (`UIView` → `View`).
/// The remainder must start with an uppercase letter, so `UInt8` is not prefixed.
pub fn strip_platform_prefix(name: &str) -> Option<&str> {
    PLATFORM_PREFIXES.iter().find_map(|prefix| {
        name.strip_prefix(prefix)
            .filter(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase()))
    })
}

pub fn is_unified(name: &str) -> bool {
    name.starts_with(UNIFIED_PREFIX)
}

/// `UIView` → `MAIView`; names without a platform prefix are returned unchanged.
pub fn to_unified(name: &str) -> String {
    match strip_platform_prefix(name) {
        Some(rest) => format!("{UNIFIED_PREFIX}{rest}"),
        None => name.to_string(),
    }
}

/// Desktop counterpart of a platform-prefixed name (`UIView` → `NSView`).
pub fn to_desktop(name: &str) -> Option<String> {
    strip_platform_prefix(name).map(|rest| format!("{DESKTOP_PREFIX}{rest}"))
}

/// Platform spellings of a unified name (`MAIView` → `NSView`, `UIView`).
pub fn platform_spellings(unified: &str) -> Option<[String; 2]> {
    let rest = unified.strip_prefix(UNIFIED_PREFIX)?;
    Some([format!("{DESKTOP_PREFIX}{rest}"), format!("{MOBILE_PREFIX}{rest}")])
}

/// Rewrite platform-prefixed identifiers inside an enumeration value expression.
/// All-caps macro constants such as `UINT_MAX` are left alone.
pub fn unify_identifiers(expr: &str) -> String {
    PLATFORM_IDENT
        .replace_all(expr, |caps: &Captures| {
            let ident = &caps[0];
            if is_macro_constant(ident) {
                ident.to_string()
            } else {
                to_unified(ident)
            }
        })
        .into_owned()
}

fn is_macro_constant(ident: &str) -> bool {
    ident.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
