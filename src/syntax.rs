//! Small, tolerant lexical helpers shared by the scanner and the descriptor parsers.
//!
//! Nothing in here fails loudly: unbalanced input yields `None` or the
//! untouched remainder, and callers skip the declaration.

/// Byte cursor over a single declaration.
pub struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(src: &'a str) -> Self { Self { src, pos: 0 } }

    pub fn rest(&self) -> &'a str { &self.src[self.pos..] }

    pub fn is_done(&self) -> bool { self.pos >= self.src.len() }

    pub fn peek(&self) -> Option<char> { self.rest().chars().next() }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    pub fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// `[A-Za-z_][A-Za-z0-9_]*`
    pub fn ident(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        if !rest.starts_with(is_ident_start) {
            return None;
        }
        let len = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
        self.pos += len;
        Some(&rest[..len])
    }

    /// Consume a group opened by `open` at the cursor and return its inner text.
    /// Returns `None` (cursor untouched) when the cursor is not on `open` or the
    /// group never closes.
    pub fn balanced(&mut self, open: char, close: char) -> Option<&'a str> {
        let rest = self.rest();
        if !rest.starts_with(open) {
            return None;
        }
        let mut depth = 0usize;
        for (i, c) in rest.char_indices() {
            if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    self.pos += i + c.len_utf8();
                    return Some(&rest[open.len_utf8()..i]);
                }
            }
        }
        None
    }
}

pub fn is_ident_start(c: char) -> bool { c.is_ascii_alphabetic() || c == '_' }

pub fn is_ident_char(c: char) -> bool { c.is_ascii_alphanumeric() || c == '_' }

/// Leading identifier of `text` after whitespace, if any.
pub fn leading_ident(text: &str) -> Option<&str> {
    Cursor::new(text.trim_start()).ident()
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split on `sep` outside of `()`, `[]` and `{}` groups. Angle brackets are
/// not tracked since `<<` shifts appear in enumeration values.
pub fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = (depth - 1).max(0),
            _ if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Availability/attribute macro spellings: `NS_AVAILABLE_IOS`, `UI_APPEARANCE_SELECTOR`,
/// `__TVOS_PROHIBITED`, `__attribute__`.
pub fn is_attribute_macro(ident: &str) -> bool {
    ident == "__attribute__"
        || (ident.len() > 2
            && ident.contains('_')
            && ident.chars().any(|c| c.is_ascii_uppercase())
            && ident.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'))
}

pub fn is_deprecation_marker(ident: &str) -> bool {
    const MARKERS: [&str; 4] = ["NS_DEPRECATED", "NS_CLASS_DEPRECATED", "API_DEPRECATED", "DEPRECATED_ATTRIBUTE"];
    ident == "__deprecated" || MARKERS.iter().any(|m| ident.starts_with(m))
}

/// Remove attribute macros together with their parenthesised arguments.
/// With `calls_only`, bare macro tokens (`UINT_MAX`) are kept.
pub fn strip_attribute_macros(text: &str, calls_only: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = Cursor::new(text);
    while !cursor.is_done() {
        match cursor.ident() {
            Some(ident) if is_attribute_macro(ident) => {
                let mut lookahead = Cursor { src: cursor.src, pos: cursor.pos };
                lookahead.skip_ws();
                if lookahead.balanced('(', ')').is_some() {
                    cursor = lookahead;
                } else if calls_only {
                    out.push_str(ident);
                }
            }
            Some(ident) => out.push_str(ident),
            None => {
                if let Some(c) = cursor.bump() {
                    out.push(c);
                }
            }
        }
    }
    collapse_whitespace(&out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_groups_nest() {
        let mut c = Cursor::new("(void (^)(int))rest");
        assert_eq!(c.balanced('(', ')'), Some("void (^)(int)"));
        assert_eq!(c.rest(), "rest");

        let mut open = Cursor::new("(never closes");
        assert_eq!(open.balanced('(', ')'), None);
        assert_eq!(open.rest(), "(never closes");
    }

    #[test]
    fn split_respects_macro_arguments() {
        let parts = split_top_level("A, NS_DEPRECATED(10_0, 10_9) B, C", ',');
        assert_eq!(parts, vec!["A", " NS_DEPRECATED(10_0, 10_9) B", " C"]);
        assert_eq!(split_top_level("A = 1 << 1, B", ','), vec!["A = 1 << 1", " B"]);
    }

    #[test]
    fn macros_are_stripped() {
        assert_eq!(
            strip_attribute_macros("UIColor *tintColor NS_AVAILABLE_IOS(7_0) UI_APPEARANCE_SELECTOR", false),
            "UIColor *tintColor"
        );
        assert_eq!(strip_attribute_macros("id x __attribute__((unavailable))", false), "id x");
        assert_eq!(strip_attribute_macros("UINT_MAX NS_ENUM_AVAILABLE(10_10, 8_0)", true), "UINT_MAX");
        assert!(!is_attribute_macro("NSInteger"));
        assert!(!is_attribute_macro("BOOL"));
        assert!(is_deprecation_marker("NS_DEPRECATED_IOS"));
    }
}
