//! One platform's declaration tables, owned explicitly and passed by reference.
use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::UnifyConfig;
use crate::model::{EnumerationDescriptor, InterfaceDescriptor};
use crate::scanner::Scanner;

/// A declaration file handed in by the caller; the core never touches disk.
#[derive(Clone, Debug)]
pub struct SourceFile {
    pub name: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self { name: name.into(), text: text.into() }
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct Corpus {
    pub classes: BTreeMap<String, InterfaceDescriptor>,
    pub protocols: BTreeMap<String, InterfaceDescriptor>,
    /// Keyed by unified-namespace name.
    pub enums: BTreeMap<String, EnumerationDescriptor>,
}

impl Corpus {
    /// Scan every file. Files are visited in name order so that duplicate
    /// declarations resolve the same way whatever order the caller supplies.
    pub fn from_sources<I>(sources: I, config: &UnifyConfig) -> Self
    where
        I: IntoIterator<Item = SourceFile>,
    {
        let mut sources: Vec<SourceFile> = sources.into_iter().collect();
        sources.sort_by(|a, b| a.name.cmp(&b.name));

        let mut corpus = Self::default();
        for source in &sources {
            corpus.scan_source(&source.name, &source.text, config);
        }
        tracing::info!(
            files = sources.len(),
            classes = corpus.classes.len(),
            protocols = corpus.protocols.len(),
            enums = corpus.enums.len(),
            "corpus scanned"
        );
        corpus
    }

    /// Scan one file; scanner state does not carry over between files.
    pub fn scan_source(&mut self, name: &str, text: &str, config: &UnifyConfig) {
        let _span = tracing::debug_span!("scan", file = name).entered();
        let mut scanner = Scanner::new(self, config);
        scanner.scan(text);
        scanner.finish();
    }

    pub fn class(&self, name: &str) -> Option<&InterfaceDescriptor> { self.classes.get(name) }

    pub fn protocol(&self, name: &str) -> Option<&InterfaceDescriptor> { self.protocols.get(name) }
}
