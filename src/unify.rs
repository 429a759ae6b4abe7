//! Cross-platform unification: the structurally shared subset of both corpora.
//!
//! Phases run strictly in order over closed tables:
//! 1. pair classes and protocols by name, prune and match enumerations
//! 2. rewrite both corpora against the resulting unified name sets
//! 3. per pair: flatten, reconcile accessors (classes only), keep what matches
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::config::UnifyConfig;
use crate::corpus::Corpus;
use crate::flatten::Flattened;
use crate::merge::merge_accessors;
use crate::model::{EnumerationDescriptor, InterfaceDescriptor, Structural};
use crate::namespace::{is_unified, to_desktop, to_unified, ROOT_CLASS};
use crate::rewrite::{NameSets, RewriteMap};

/// A unified class or protocol with the platform names it was built from.
#[derive(Clone, Debug, Serialize)]
pub struct UnifiedInterface {
    #[serde(flatten)]
    pub descriptor: InterfaceDescriptor,
    pub mobile_name: String,
    pub desktop_name: String,
}

/// The model handed to an emitter.
#[derive(Clone, Debug, Default, Serialize)]
pub struct UnifiedModel {
    pub classes: BTreeMap<String, UnifiedInterface>,
    pub protocols: BTreeMap<String, UnifiedInterface>,
    pub enums: BTreeMap<String, EnumerationDescriptor>,
    /// Protocols declared under the same name on both platforms (`NSCoding`).
    pub foundation_protocols: BTreeSet<String>,
}

impl UnifiedModel {
    /// Adopted names an emitter can reference: unified protocols and
    /// foundation protocols, minus the root `NSObject` protocol.
    pub fn importable_protocols<'a>(&self, interface: &'a InterfaceDescriptor) -> Vec<&'a str> {
        interface
            .protocols
            .iter()
            .map(String::as_str)
            .filter(|p| *p != ROOT_CLASS && (is_unified(p) || self.foundation_protocols.contains(*p)))
            .collect()
    }
}

/// Corresponding platform names keyed by unified name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pair {
    pub mobile: String,
    pub desktop: String,
}

/// Pair each platform-prefixed mobile interface with the desktop interface of
/// the same remainder. When two mobile spellings reach one unified name the
/// first in name order is kept.
pub fn pair_interfaces(
    mobile: &BTreeMap<String, InterfaceDescriptor>,
    desktop: &BTreeMap<String, InterfaceDescriptor>,
) -> BTreeMap<String, Pair> {
    let mut pairs = BTreeMap::new();
    for name in mobile.keys() {
        let Some(desktop_name) = to_desktop(name).filter(|d| desktop.contains_key(d)) else {
            continue;
        };
        pairs
            .entry(to_unified(name))
            .or_insert_with(|| Pair { mobile: name.clone(), desktop: desktop_name });
    }
    pairs
}

/// Prune each side of every shared enumeration to the members the other side
/// declares, then keep those that end up equivalent and nonempty.
pub fn unify_enumerations(
    mobile: &mut BTreeMap<String, EnumerationDescriptor>,
    desktop: &mut BTreeMap<String, EnumerationDescriptor>,
) -> BTreeMap<String, EnumerationDescriptor> {
    let mut unified = BTreeMap::new();
    for (name, mobile_enum) in mobile.iter_mut() {
        let Some(desktop_enum) = desktop.get_mut(name) else {
            continue;
        };
        mobile_enum.retain_shared(desktop_enum);
        desktop_enum.retain_shared(mobile_enum);
        if !mobile_enum.is_empty() && mobile_enum.equivalent(desktop_enum) {
            unified.insert(name.clone(), mobile_enum.clone());
        } else {
            tracing::debug!(enumeration = %name, "enumeration differs across platforms");
        }
    }
    unified
}

/// Unify two scanned corpora. Both are consumed: enumerations are pruned and
/// type references rewritten in place before matching.
pub fn unify(mut mobile: Corpus, mut desktop: Corpus, config: &UnifyConfig) -> UnifiedModel {
    let enums = unify_enumerations(&mut mobile.enums, &mut desktop.enums);
    let class_pairs = pair_interfaces(&mobile.classes, &desktop.classes);
    let protocol_pairs = pair_interfaces(&mobile.protocols, &desktop.protocols);

    let names = NameSets {
        classes: class_pairs.keys().cloned().collect(),
        protocols: protocol_pairs.keys().cloned().collect(),
        enums: enums.keys().cloned().collect(),
    };
    let rewrite = RewriteMap::new(&names, config);
    rewrite.rewrite_corpus(&mut mobile);
    rewrite.rewrite_corpus(&mut desktop);

    let foundation_protocols = mobile
        .protocols
        .keys()
        .filter(|name| desktop.protocols.contains_key(*name))
        .cloned()
        .collect();
    let mut model = UnifiedModel { enums, foundation_protocols, ..UnifiedModel::default() };

    for (unified_name, pair) in &class_pairs {
        let (Some(m), Some(d)) = (mobile.class(&pair.mobile), desktop.class(&pair.desktop)) else {
            continue;
        };
        let mut m_flat = mobile.flatten(m);
        let mut d_flat = desktop.flatten(d);
        merge_accessors(&mut d_flat.methods, &m_flat.properties, &mut d_flat.properties);
        merge_accessors(&mut m_flat.methods, &d_flat.properties, &mut m_flat.properties);

        let mut descriptor = InterfaceDescriptor::new_class(unified_name.as_str(), Some(mobile.root_class(m)));
        intersect(&mut descriptor, m_flat, &d_flat, m, d);
        model.classes.insert(unified_name.clone(), unified(descriptor, pair));
    }

    for (unified_name, pair) in &protocol_pairs {
        let (Some(m), Some(d)) = (mobile.protocol(&pair.mobile), desktop.protocol(&pair.desktop)) else {
            continue;
        };
        let mut descriptor = InterfaceDescriptor::new_protocol(unified_name.as_str());
        intersect(&mut descriptor, mobile.flatten(m), &desktop.flatten(d), m, d);
        model.protocols.insert(unified_name.clone(), unified(descriptor, pair));
    }

    tracing::info!(
        classes = model.classes.len(),
        protocols = model.protocols.len(),
        enums = model.enums.len(),
        "unified"
    );
    model
}

// Keep the members both flattened sides declare equivalently, OR-ing flags
// onto the mobile copy, and the protocols both sides adopt directly.
fn intersect(
    target: &mut InterfaceDescriptor,
    mobile: Flattened,
    desktop: &Flattened,
    mobile_interface: &InterfaceDescriptor,
    desktop_interface: &InterfaceDescriptor,
) {
    for (key, mut method) in mobile.methods {
        match desktop.methods.get(&key) {
            Some(other) if method.equivalent(other) => {
                method.flags.merge(&other.flags);
                target.add_method(method);
            }
            Some(other) => tracing::trace!(interface = %target.name, mobile = %method, desktop = %other, "method differs"),
            None => {}
        }
    }
    for (name, mut property) in mobile.properties {
        match desktop.properties.get(&name) {
            Some(other) if property.equivalent(other) => {
                property.merge_flags(other);
                target.add_property(property);
            }
            Some(other) => tracing::trace!(interface = %target.name, mobile = %property, desktop = %other, "property differs"),
            None => {}
        }
    }
    for protocol in &mobile_interface.protocols {
        if desktop_interface.adopts(protocol) {
            target.adopt(protocol.as_str());
        }
    }
    tracing::debug!(
        interface = %target.name,
        methods = target.methods.len(),
        properties = target.properties.len(),
        protocols = target.protocols.len(),
        "interface unified"
    );
}

fn unified(descriptor: InterfaceDescriptor, pair: &Pair) -> UnifiedInterface {
    UnifiedInterface {
        descriptor,
        mobile_name: pair.mobile.clone(),
        desktop_name: pair.desktop.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::SourceFile;

    fn corpus(files: &[(&str, &str)]) -> Corpus {
        Corpus::from_sources(
            files.iter().map(|(name, text)| SourceFile::new(*name, *text)),
            &UnifyConfig::default(),
        )
    }

    fn unify_texts(mobile: &str, desktop: &str) -> UnifiedModel {
        unify(corpus(&[("M.h", mobile)]), corpus(&[("D.h", desktop)]), &UnifyConfig::default())
    }

    #[test]
    fn identical_declarations_survive_exactly() {
        let text = "@interface {P}Thing : NSObject <NSCoding>\n\
                    - (void)doSomething:(NSInteger)count;\n\
                    @property (nonatomic, copy) NSString *title;\n\
                    @end\n";
        let model = unify_texts(&text.replace("{P}", "UI"), &text.replace("{P}", "NS"));

        let thing = &model.classes["MAIThing"];
        assert_eq!(thing.mobile_name, "UIThing");
        assert_eq!(thing.desktop_name, "NSThing");
        assert_eq!(thing.descriptor.superclass(), Some("NSObject"));
        assert_eq!(thing.descriptor.methods.keys().collect::<Vec<_>>(), vec!["doSomething:"]);
        assert_eq!(thing.descriptor.properties.keys().collect::<Vec<_>>(), vec!["title"]);
        assert_eq!(thing.descriptor.protocols.iter().collect::<Vec<_>>(), vec!["NSCoding"]);
    }

    #[test]
    fn differing_members_are_dropped() {
        let model = unify_texts(
            "@interface UIThing : NSObject\n- (int)count;\n- (void)mobileOnly;\n@property (readonly) int size;\n@end\n",
            "@interface NSThing : NSObject\n- (double)count;\n- (void)desktopOnly;\n@property int size;\n@end\n",
        );
        let thing = &model.classes["MAIThing"].descriptor;
        assert!(thing.methods.is_empty());
        assert!(thing.properties.is_empty());
    }

    // Mobile models `value` as a bare setter, desktop as a property with
    // accessors. Asymmetric modelling is not unified.
    #[test]
    fn asymmetric_property_modelling_is_not_unified() {
        let model = unify_texts(
            "@interface UIThing : UIBase\n- (void)setValue:(int)v;\n- (void)shared;\n@end\n",
            "@interface NSThing : NSBase\n\
             @property (assign) int value;\n\
             - (int)value;\n\
             - (void)setValue:(int)v;\n\
             - (void)shared;\n\
             @end\n",
        );
        let thing = &model.classes["MAIThing"].descriptor;
        assert!(!thing.properties.contains_key("value"));
        assert!(!thing.methods.contains_key("setValue:"));
        assert!(!thing.methods.contains_key("value"));
        assert!(thing.methods.contains_key("shared"));
        assert_eq!(thing.superclass(), Some("UIBase"));
    }

    #[test]
    fn accessor_pair_matches_property_on_the_other_side() {
        let model = unify_texts(
            "@interface UIThing : NSObject\n@property (assign) int value;\n@end\n",
            "@interface NSThing : NSObject\n\
             @property (assign) int value;\n\
             - (int)value;\n\
             - (void)setValue:(int)v;\n\
             @end\n",
        );
        let thing = &model.classes["MAIThing"].descriptor;
        assert!(thing.properties.contains_key("value"));
        assert!(thing.methods.is_empty());
    }

    #[test]
    fn enumerations_are_pruned_to_shared_members() {
        let model = unify_texts(
            "typedef NS_ENUM(NSInteger, UIStatus) {\n UIStatusA,\n UIStatusB,\n UIStatusC\n};\n",
            "typedef NS_ENUM(NSInteger, NSStatus) {\n NSStatusA,\n NSStatusB\n};\n",
        );
        let status = &model.enums["MAIStatus"];
        assert_eq!(status.member_names().collect::<Vec<_>>(), vec!["MAIStatusA", "MAIStatusB"]);
    }

    #[test]
    fn enumerations_need_matching_order_and_members() {
        let model = unify_texts(
            "typedef NS_ENUM(NSInteger, UIOrder) { UIOrderA, UIOrderB };\n\
             typedef NS_ENUM(NSInteger, UIOnly) { UIOnlyA };\n\
             typedef NS_ENUM(NSInteger, UIWidth) { UIWidthA };\n",
            "typedef NS_ENUM(NSInteger, NSOrder) { NSOrderB, NSOrderA };\n\
             typedef NS_ENUM(NSInteger, NSOnly) { NSOnlyB };\n\
             typedef NS_ENUM(NSUInteger, NSWidth) { NSWidthA };\n",
        );
        assert!(model.enums.is_empty(), "{:?}", model.enums.keys().collect::<Vec<_>>());
    }

    #[test]
    fn adoption_matching_is_not_transitive() {
        let model = unify_texts(
            "@interface UIThing : NSObject <UIDelegate, NSCopying>\n@end\n\
             @protocol UIDelegate\n- (void)ping;\n@end\n",
            "@interface NSBase : NSObject <NSDelegate>\n@end\n\
             @interface NSThing : NSBase <NSCopying>\n@end\n\
             @protocol NSDelegate\n- (void)ping;\n@end\n",
        );
        let thing = &model.classes["MAIThing"].descriptor;
        assert_eq!(thing.protocols.iter().collect::<Vec<_>>(), vec!["NSCopying"]);
        assert!(model.protocols["MAIDelegate"].descriptor.methods.contains_key("ping"));
    }

    #[test]
    fn type_references_point_at_unified_names() {
        let model = unify_texts(
            "@interface UIView : NSObject\n\
             - (void)drawRect:(CGRect)rect;\n\
             - (void)addSubview:(UIView *)view;\n\
             @property (nonatomic) UIStyle style;\n\
             @property (nonatomic, weak) id<UIViewDelegate> delegate;\n\
             @end\n\
             @protocol UIViewDelegate\n@end\n\
             typedef NS_ENUM(NSInteger, UIStyle) { UIStyleA };\n",
            "@interface NSView : NSObject\n\
             - (void)drawRect:(NSRect)rect;\n\
             - (void)addSubview:(NSView *)view;\n\
             @property (nonatomic) NSInteger style;\n\
             @property (nonatomic, weak) id<NSViewDelegate> delegate;\n\
             @end\n\
             @protocol NSViewDelegate\n@end\n\
             typedef NS_ENUM(NSInteger, NSStyle) { NSStyleA };\n",
        );
        let view = &model.classes["MAIView"].descriptor;
        assert_eq!(view.methods["drawRect:"].arguments[0].ty.name, "CGRect");
        assert_eq!(view.methods["addSubview:"].arguments[0].ty.name, "MAIView");
        // an integer on one side matches the unified enumeration on the other
        assert_eq!(view.properties["style"].ty.name, "MAIStyle");
        assert_eq!(view.properties["delegate"].ty.name, "id<MAIViewDelegate>");
    }

    #[test]
    fn generic_arguments_point_at_unified_names() {
        let model = unify_texts(
            "@interface UIView : NSObject\n\
             - (NSArray<UIView *> *)subviews;\n\
             @property (nonatomic, copy) NSArray<__kindof UIGestureRecognizer *> *gestureRecognizers;\n\
             - (void)add:(id)x;\n\
             @end\n\
             @interface UIGestureRecognizer : NSObject\n@end\n",
            "@interface NSView : NSObject\n\
             - (NSArray<NSView *> *)subviews;\n\
             @property (nonatomic, copy) NSArray<__kindof NSGestureRecognizer *> *gestureRecognizers;\n\
             - (void)add:(id)x;\n\
             @end\n\
             @interface NSGestureRecognizer : NSObject\n@end\n",
        );
        let view = &model.classes["MAIView"].descriptor;
        assert_eq!(view.methods["subviews"].return_type.name, "NSArray<MAIView*>");
        assert_eq!(view.methods.keys().collect::<Vec<_>>(), vec!["add:", "subviews"]);
        assert_eq!(
            view.properties["gestureRecognizers"].ty.name,
            "NSArray<__kindof MAIGestureRecognizer*>"
        );
    }

    #[test]
    fn foundation_protocols_are_shared_by_name() {
        let model = unify_texts(
            "@protocol NSCoding\n@end\n@protocol UIMobileOnly\n@end\n\
             @interface UIThing : NSObject <NSObject, NSCoding, UIMobileOnly>\n@end\n",
            "@protocol NSCoding\n@end\n\
             @interface NSThing : NSObject <NSObject, NSCoding, UIMobileOnly>\n@end\n",
        );
        assert_eq!(model.foundation_protocols.iter().collect::<Vec<_>>(), vec!["NSCoding"]);
        let thing = &model.classes["MAIThing"].descriptor;
        assert_eq!(thing.protocols.iter().collect::<Vec<_>>(), vec!["NSObject", "MAICoding", "UIMobileOnly"]);
        assert_eq!(model.importable_protocols(thing), vec!["MAICoding"]);
    }

    #[test]
    fn protocol_flags_are_combined() {
        let model = unify_texts(
            "@protocol UIDataSource\n@optional\n- (void)reload;\n@end\n",
            "@protocol NSDataSource\n- (void)reload;\n@end\n",
        );
        let source = &model.protocols["MAIDataSource"].descriptor;
        assert!(!source.is_class());
        assert!(source.methods["reload"].flags.required);
    }

    #[test]
    fn file_order_does_not_change_the_model() {
        let mobile = [
            ("A.h", "@interface UIThing : UIBase\n- (int)count;\n@end\n"),
            ("B.h", "@interface UIThing (Extras)\n- (NSInteger)count;\n- (void)extra;\n@end\n"),
            ("C.h", "@interface UIBase : NSObject <NSCoding>\n- (void)base;\n@end\n"),
        ];
        let desktop = [
            ("A.h", "@interface NSThing : NSBase\n- (NSInteger)count;\n- (void)extra;\n@end\n"),
            ("B.h", "@interface NSBase : NSObject\n- (void)base;\n@end\n"),
        ];
        let config = UnifyConfig::default();
        let forward = unify(corpus(&mobile), corpus(&desktop), &config);

        let mut mobile_rev = mobile;
        mobile_rev.reverse();
        let mut desktop_rev = desktop;
        desktop_rev.reverse();
        let backward = unify(corpus(&mobile_rev), corpus(&desktop_rev), &config);

        let a = serde_json::to_string(&forward).unwrap();
        let b = serde_json::to_string(&backward).unwrap();
        assert_eq!(a, b);
        assert_eq!(forward.classes["MAIThing"].descriptor.methods["count"].return_type.name, "NSInteger");
    }

    #[test]
    fn matching_is_symmetric() {
        let left = "@interface {P}Thing : NSObject\n- (void)a:(int)x;\n- (int)b;\n@property (readonly) BOOL c;\n@end\n";
        let right = "@interface {P}Thing : NSObject\n- (void)a:(int)y;\n- (long)b;\n@property (readonly) BOOL c;\n@end\n";
        let one = unify_texts(&left.replace("{P}", "UI"), &right.replace("{P}", "NS"));
        let other = unify_texts(&right.replace("{P}", "UI"), &left.replace("{P}", "NS"));
        let keys = |m: &UnifiedModel| {
            let d = &m.classes["MAIThing"].descriptor;
            (d.methods.keys().cloned().collect::<Vec<_>>(), d.properties.keys().cloned().collect::<Vec<_>>())
        };
        assert_eq!(keys(&one), keys(&other));
        assert_eq!(keys(&one).0, vec!["a:".to_string()]);
    }
}
