use std::path::PathBuf;

/// Failures surfaced by the fallible edges of the crate.
///
/// Scanning, flattening, merging and unification are total and never produce
/// one of these; malformed declarations are skipped instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("bad input pattern `{pattern}`: {message}")]
    Pattern { pattern: String, message: String },

    #[error("input pattern matched no files: {0}")]
    NoMatches(String),

    /// The parser recorded a selector whose colon components disagree with its
    /// argument list. This is a parser defect, not bad input.
    #[error("selector `{selector}` has {components} components but {arguments} arguments")]
    SelectorArity {
        selector: String,
        components: usize,
        arguments: usize,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
