//! Declaration scanner: a line-driven state machine that fills a [`Corpus`].
//!
//! The scanner is tolerant. Lines it does not recognise, members outside an
//! open interface, and declarations the descriptor parsers reject are skipped
//! (logged at `trace`) and scanning continues.
//!
//! State carried between lines:
//! - the open interface (class, category target, or protocol), if any
//! - the open enumeration, if any
//! - the required/optional default for protocol members (required)
//! - a pending deprecation flag that suppresses the next adopted protocol
//!   name on a class-open line
//! - a buffer holding a method/property declaration that has not reached `;`
pub mod comments;
pub mod line;

use crate::config::UnifyConfig;
use crate::corpus::Corpus;
use crate::model::{EnumKind, EnumerationDescriptor, InterfaceDescriptor, MethodDescriptor, PropertyDescriptor, TypeDescriptor};
use crate::namespace::{to_unified, unify_identifiers};
use crate::syntax::{is_attribute_macro, is_deprecation_marker, leading_ident, split_top_level, strip_attribute_macros, Cursor};

pub use comments::strip_comments;
pub use line::{classify, Line};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Open {
    Class(String),
    Protocol(String),
}

#[derive(Debug)]
struct ScanState {
    interface: Option<Open>,
    enumeration: Option<String>,
    required: bool,
    deprecated: bool,
    pending: Option<String>,
}

impl Default for ScanState {
    fn default() -> Self {
        Self { interface: None, enumeration: None, required: true, deprecated: false, pending: None }
    }
}

pub struct Scanner<'a> {
    corpus: &'a mut Corpus,
    config: &'a UnifyConfig,
    state: ScanState,
}

impl<'a> Scanner<'a> {
    pub fn new(corpus: &'a mut Corpus, config: &'a UnifyConfig) -> Self {
        Self { corpus, config, state: ScanState::default() }
    }

    /// Strip comments from raw file text and feed it line by line.
    pub fn scan(&mut self, text: &str) {
        let text = strip_comments(text);
        for line in text.lines() {
            self.feed(line);
        }
    }

    /// Feed one comment-free line.
    pub fn feed(&mut self, line: &str) {
        if let Some(mut pending) = self.state.pending.take() {
            if starts_declaration(line) {
                tracing::debug!(declaration = %pending, "unterminated declaration dropped");
            } else {
                pending.push(' ');
                pending.push_str(line.trim());
                if pending.contains(';') {
                    self.member(&pending);
                } else {
                    self.state.pending = Some(pending);
                }
                return;
            }
        }

        if let Some(enumeration) = &self.state.enumeration {
            if starts_declaration(line) || matches!(classify(line), Line::EnumOpen { .. }) {
                tracing::debug!(enumeration = %enumeration, "unterminated enumeration closed");
                self.state.enumeration = None;
            } else {
                self.enum_body(line);
                return;
            }
        }

        match classify(line) {
            Line::ClassOpen { name, superclass, protocols, deprecated } => {
                self.open_class(name, superclass, protocols, deprecated)
            }
            Line::CategoryOpen { class, category, protocols } => self.open_category(class, category, protocols),
            Line::ProtocolOpen { name, protocols } => self.open_protocol(name, protocols),
            Line::End => {
                self.state.interface = None;
                self.state.required = true;
                self.state.deprecated = false;
            }
            Line::Required => self.state.required = true,
            Line::Optional => self.state.required = false,
            Line::EnumOpen { kind, underlying, name, body } => self.open_enum(kind, underlying, name, body),
            Line::Method(text) | Line::Property(text) => {
                if self.state.interface.is_none() {
                    tracing::trace!(line = text, "member outside interface");
                } else if text.contains(';') {
                    self.member(text);
                } else {
                    self.state.pending = Some(text.to_string());
                }
            }
            Line::Deprecation => self.state.deprecated = true,
            Line::Forward => {}
            Line::Other => {
                if !line.trim().is_empty() {
                    tracing::trace!(line, "skipped");
                }
            }
        }
    }

    /// End of file: an unterminated declaration is dropped.
    pub fn finish(self) {
        if let Some(pending) = self.state.pending {
            tracing::debug!(declaration = %pending, "unterminated declaration dropped");
        }
    }

    fn current(&mut self) -> Option<&mut InterfaceDescriptor> {
        match self.state.interface.as_ref()? {
            Open::Class(name) => self.corpus.classes.get_mut(name),
            Open::Protocol(name) => self.corpus.protocols.get_mut(name),
        }
    }

    fn member(&mut self, text: &str) {
        let required = matches!(self.state.interface, Some(Open::Protocol(_))) && self.state.required;
        let Some(interface) = self.current() else {
            return;
        };
        if text.trim_start().starts_with("@property") {
            match PropertyDescriptor::parse(text) {
                Some(mut property) => {
                    property.required = required;
                    interface.add_property(property);
                }
                None => tracing::trace!(declaration = text, "unparsed property"),
            }
        } else {
            match MethodDescriptor::parse(text) {
                Some(mut method) => {
                    method.flags.required = required;
                    interface.add_method(method);
                }
                None => tracing::trace!(declaration = text, "unparsed method"),
            }
        }
    }

    fn open_class(&mut self, name: &str, superclass: &str, protocols: Option<&str>, deprecated: bool) {
        if deprecated {
            self.state.deprecated = true;
        }
        let adopted = self.adopted_names(protocols, true);
        let class = self
            .corpus
            .classes
            .entry(name.to_string())
            .or_insert_with(|| InterfaceDescriptor::new_class(name, None));
        class.set_superclass(superclass);
        for protocol in adopted {
            class.adopt(protocol);
        }
        self.state.interface = Some(Open::Class(name.to_string()));
    }

    fn open_category(&mut self, class: &str, category: &str, protocols: Option<&str>) {
        if self.config.is_protected_category(category) {
            tracing::debug!(class, category, "protected category ignored");
            self.state.interface = None;
            return;
        }
        let adopted = self.adopted_names(protocols, false);
        let target = self
            .corpus
            .classes
            .entry(class.to_string())
            .or_insert_with(|| InterfaceDescriptor::new_class(class, None));
        for protocol in adopted {
            target.adopt(protocol);
        }
        self.state.interface = Some(Open::Class(class.to_string()));
    }

    fn open_protocol(&mut self, name: &str, protocols: Option<&str>) {
        let adopted = self.adopted_names(protocols, false);
        let protocol = self
            .corpus
            .protocols
            .entry(name.to_string())
            .or_insert_with(|| InterfaceDescriptor::new_protocol(name));
        for adopted in adopted {
            protocol.adopt(adopted);
        }
        self.state.interface = Some(Open::Protocol(name.to_string()));
        self.state.required = true;
    }

    /// Names in an adoption list, minus availability macros. On class-open
    /// lines a pending deprecation drops exactly the next name.
    fn adopted_names(&mut self, list: Option<&str>, class_open: bool) -> Vec<String> {
        let Some(list) = list else {
            return Vec::new();
        };
        let mut names = Vec::new();
        for item in split_top_level(list, ',') {
            let mut c = Cursor::new(item);
            let name = loop {
                c.skip_ws();
                let Some(ident) = c.ident() else {
                    break None;
                };
                if is_deprecation_marker(ident) || is_attribute_macro(ident) {
                    if class_open && is_deprecation_marker(ident) {
                        self.state.deprecated = true;
                    }
                    c.skip_ws();
                    c.balanced('(', ')');
                    continue;
                }
                break Some(ident);
            };
            let Some(name) = name else {
                continue;
            };
            if class_open && self.state.deprecated {
                self.state.deprecated = false;
                tracing::debug!(protocol = name, "adoption suppressed by deprecation");
                continue;
            }
            names.push(name.to_string());
        }
        names
    }

    fn open_enum(&mut self, kind: EnumKind, underlying: &str, name: &str, body: Option<&str>) {
        let unified = self.config.enum_name(to_unified(name));
        let descriptor = EnumerationDescriptor::new(kind, TypeDescriptor::parse(underlying), unified.clone());
        self.corpus.enums.insert(unified.clone(), descriptor);
        self.state.enumeration = Some(unified);
        if let Some(body) = body {
            self.enum_body(body);
        }
    }

    fn enum_body(&mut self, text: &str) {
        let (members, closed) = match text.find('}') {
            Some(i) => (&text[..i], true),
            None => (text, false),
        };
        let members = members.trim_start().trim_start_matches('{');
        for item in split_top_level(members, ',') {
            self.enum_member(item);
        }
        if closed {
            self.state.enumeration = None;
        }
    }

    fn enum_member(&mut self, item: &str) {
        let item = item.trim();
        if item.is_empty() || item.starts_with('#') {
            return;
        }
        let (lhs, rhs) = match item.split_once('=') {
            Some((lhs, rhs)) => (lhs, Some(rhs)),
            None => (item, None),
        };
        let lhs = strip_attribute_macros(lhs, false);
        let Some(name) = leading_ident(&lhs) else {
            return;
        };
        let value = rhs
            .map(|v| strip_attribute_macros(v, true))
            .filter(|v| !v.is_empty())
            .map(|v| unify_identifiers(&v));

        let Some(enum_name) = &self.state.enumeration else {
            return;
        };
        if let Some(descriptor) = self.corpus.enums.get_mut(enum_name) {
            descriptor.push_member(to_unified(name), value);
        }
    }
}

// a directive or a new member never continues a buffered declaration or an
// enumeration body
fn starts_declaration(line: &str) -> bool {
    line.trim_start().starts_with(['@', '-', '+'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MethodPrefix, Nullability};

    fn scan(text: &str) -> Corpus {
        let mut corpus = Corpus::default();
        corpus.scan_source("test.h", text, &UnifyConfig::default());
        corpus
    }

    #[test]
    fn class_members_and_adoptions() {
        let corpus = scan(
            "@interface UIView : UIResponder <NSCoding, UIAppearance>\n\
             @property (nonatomic, readonly) CGRect bounds;\n\
             - (void)layoutSubviews;\n\
             + (Class)layerClass;\n\
             @end\n",
        );
        let view = corpus.class("UIView").unwrap();
        assert_eq!(view.superclass(), Some("UIResponder"));
        assert_eq!(view.protocols.iter().collect::<Vec<_>>(), vec!["NSCoding", "UIAppearance"]);
        assert!(view.properties["bounds"].read_only);
        assert!(!view.properties["bounds"].required);
        assert_eq!(view.methods["layerClass"].prefix, MethodPrefix::Type);
        assert!(!view.methods["layoutSubviews"].flags.required);
    }

    #[test]
    fn members_after_end_are_ignored() {
        let corpus = scan("@interface A : NSObject\n@end\n- (void)stray;\n");
        assert!(corpus.class("A").unwrap().methods.is_empty());
    }

    #[test]
    fn multi_line_declarations_are_joined() {
        let corpus = scan(
            "@interface A : NSObject\n\
             - (void)performWith:(id)a\n\
                       andWith:(id)b\n\
                     afterDelay:(double)d;\n\
             @property (nonatomic)\n    NSString *title;\n\
             @end\n",
        );
        let a = corpus.class("A").unwrap();
        assert!(a.methods.contains_key("performWith:andWith:afterDelay:"));
        assert!(a.properties.contains_key("title"));
    }

    #[test]
    fn unterminated_declaration_is_dropped_at_next_directive() {
        let corpus = scan("@interface A : NSObject\n- (void)broken:(id)x\n@end\n- (void)later;\n@interface B : NSObject\n- (void)b\n- (void)c;\n@end\n");
        let a = corpus.class("A").unwrap();
        assert!(a.methods.is_empty(), "{:?}", a.methods.keys().collect::<Vec<_>>());
        let b = corpus.class("B").unwrap();
        assert_eq!(b.methods.keys().collect::<Vec<_>>(), vec!["c"]);
    }

    #[test]
    fn later_declaration_overwrites() {
        let corpus = scan(
            "@interface A : NSObject\n- (int)count;\n- (NSUInteger)count;\n@end\n",
        );
        assert_eq!(corpus.class("A").unwrap().methods["count"].return_type.name, "NSUInteger");
    }

    #[test]
    fn protocol_sections_toggle_required() {
        let corpus = scan(
            "@protocol UIFooDelegate <NSObject>\n\
             - (void)a;\n\
             @optional\n\
             - (void)b;\n\
             @property (nonatomic) int c;\n\
             @required\n\
             - (void)d;\n\
             @end\n\
             @protocol UIBarDelegate\n\
             - (void)e;\n\
             @end\n",
        );
        let foo = corpus.protocol("UIFooDelegate").unwrap();
        assert!(foo.methods["a"].flags.required);
        assert!(!foo.methods["b"].flags.required);
        assert!(!foo.properties["c"].required);
        assert!(foo.methods["d"].flags.required);
        assert!(foo.adopts("NSObject"));
        assert!(corpus.protocol("UIBarDelegate").unwrap().methods["e"].flags.required);
    }

    #[test]
    fn categories_reopen_unless_protected() {
        let corpus = scan(
            "@interface UIView (UIViewRendering) <Extra>\n- (void)drawRect:(CGRect)rect;\n@end\n\
             @interface UIView (UIViewProtected)\n- (void)secret;\n@end\n\
             @interface UIView : UIResponder\n- (void)layoutSubviews;\n@end\n",
        );
        let view = corpus.class("UIView").unwrap();
        assert_eq!(view.superclass(), Some("UIResponder"));
        assert!(view.methods.contains_key("drawRect:"));
        assert!(view.methods.contains_key("layoutSubviews"));
        assert!(!view.methods.contains_key("secret"));
        assert!(view.adopts("Extra"));
    }

    #[test]
    fn deprecation_suppresses_exactly_one_adoption() {
        let corpus = scan(
            "NS_CLASS_DEPRECATED_IOS(2_0, 8_0)\n\
             @interface UIOld : NSObject <UIFirst, UISecond>\n@end\n\
             @interface UIInline : NSObject <UIA, NS_DEPRECATED_IOS(2_0, 3_0) UIB, UIC>\n@end\n",
        );
        let old = corpus.class("UIOld").unwrap();
        assert_eq!(old.protocols.iter().collect::<Vec<_>>(), vec!["UISecond"]);
        let inline = corpus.class("UIInline").unwrap();
        assert_eq!(inline.protocols.iter().collect::<Vec<_>>(), vec!["UIA", "UIC"]);
    }

    #[test]
    fn forward_declarations_do_not_open() {
        let corpus = scan("@protocol UIFoo;\n@class UIBar;\n- (void)x;\n");
        assert!(corpus.protocols.is_empty());
        assert!(corpus.classes.is_empty());
    }

    #[test]
    fn enumerations_capture_members_and_values() {
        let corpus = scan(
            "typedef NS_OPTIONS(NSUInteger, UIViewAutoresizing) {\n\
                 UIViewAutoresizingNone = 0,\n\
                 UIViewAutoresizingFlexibleWidth = 1 << 1,\n\
                 UIViewAutoresizingAll NS_ENUM_AVAILABLE_IOS(9_0) = UIViewAutoresizingFlexibleWidth | NSFooMask,\n\
                 UIViewAutoresizingLast\n\
             };\n\
             - (void)notMember;\n",
        );
        let e = &corpus.enums["MAIViewAutoresizing"];
        assert_eq!(e.kind, EnumKind::Options);
        assert_eq!(e.underlying.name, "NSUInteger");
        assert_eq!(
            e.member_names().collect::<Vec<_>>(),
            vec!["MAIViewAutoresizingNone", "MAIViewAutoresizingFlexibleWidth", "MAIViewAutoresizingAll", "MAIViewAutoresizingLast"]
        );
        assert_eq!(e.members[1].value.as_deref(), Some("1 << 1"));
        assert_eq!(e.members[2].value.as_deref(), Some("MAIViewAutoresizingFlexibleWidth | MAIFooMask"));
        assert_eq!(e.members[3].value, None);
    }

    #[test]
    fn unterminated_enumeration_closes_at_next_directive() {
        let corpus = scan(
            "typedef NS_ENUM(NSInteger, UIStatus) {\n\
                 UIStatusA,\n\
             @interface UIThing : NSObject\n\
             - (void)x;\n\
             @end\n\
             typedef NS_ENUM(NSInteger, UIMode) {\n\
                 UIModeA\n\
             typedef NS_ENUM(NSInteger, UIKind) { UIKindA };\n",
        );
        assert_eq!(corpus.enums["MAIStatus"].member_names().collect::<Vec<_>>(), vec!["MAIStatusA"]);
        assert!(corpus.class("UIThing").unwrap().methods.contains_key("x"));
        assert_eq!(corpus.enums["MAIMode"].member_names().collect::<Vec<_>>(), vec!["MAIModeA"]);
        assert_eq!(corpus.enums["MAIKind"].member_names().collect::<Vec<_>>(), vec!["MAIKindA"]);
    }

    #[test]
    fn single_line_enumeration_and_renames() {
        let corpus = scan("typedef NS_OPTIONS(NSUInteger, NSTextStorageEditedOptions) { NSTextStorageEditedAttributes = 1, NSTextStorageEditedCharacters = 2 };\n");
        let e = &corpus.enums["MAITextStorageEditActions"];
        assert_eq!(e.name, "MAITextStorageEditActions");
        assert_eq!(e.members.len(), 2);
    }

    #[test]
    fn property_attributes_flow_through() {
        let corpus = scan("@interface A : NSObject\n@property (nonatomic, null_resettable, copy) NSString *text;\n@end\n");
        assert_eq!(corpus.class("A").unwrap().properties["text"].nullability, Nullability::NullResettable);
    }

    #[test]
    fn comments_are_removed_before_scanning() {
        let corpus = scan("@interface A : NSObject // <Hidden>\n/* - (void)gone; */\n- (void)kept; // - (void)alsoGone;\n@end\n");
        let a = corpus.class("A").unwrap();
        assert!(a.protocols.is_empty());
        assert_eq!(a.methods.keys().collect::<Vec<_>>(), vec!["kept"]);
    }
}
