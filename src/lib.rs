//! Reconcile the mobile (`UI`) and desktop (`NS`) variants of an Objective-C
//! API surface into one platform-neutral (`MAI`) model holding only what is
//! structurally identical on both sides.
//!
//! The library never touches disk: callers hand in [`SourceFile`]s and get a
//! [`UnifiedModel`] back.
pub mod error;
pub mod config;
pub mod namespace;
pub mod syntax;
pub mod model;
pub mod corpus;
pub mod scanner;
pub mod flatten;
pub mod merge;
pub mod rewrite;
pub mod unify;

pub use config::UnifyConfig;
pub use corpus::{Corpus, SourceFile};
pub use error::{Error, Result};
pub use unify::{unify, UnifiedInterface, UnifiedModel};

/// Scan both corpora and unify them.
pub fn unify_sources<M, D>(mobile: M, desktop: D, config: &UnifyConfig) -> UnifiedModel
where
    M: IntoIterator<Item = SourceFile>,
    D: IntoIterator<Item = SourceFile>,
{
    let mobile = {
        let _span = tracing::info_span!("corpus", platform = "mobile").entered();
        Corpus::from_sources(mobile, config)
    };
    let desktop = {
        let _span = tracing::info_span!("corpus", platform = "desktop").entered();
        Corpus::from_sources(desktop, config)
    };
    unify(mobile, desktop, config)
}
