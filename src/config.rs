//! Tunable substitution tables, loadable from JSON.
use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UnifyConfig {
    /// Geometry base types replaced unconditionally (`NSRect` → `CGRect`).
    pub geometry: BTreeMap<String, String>,
    /// Unified enumeration names overridden at scan time.
    pub enum_renames: BTreeMap<String, String>,
    /// Case-insensitive substring marking a category as protected.
    pub protected_category_marker: String,
}

impl Default for UnifyConfig {
    fn default() -> Self {
        let pairs = |xs: &[(&str, &str)]| {
            xs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<BTreeMap<_, _>>()
        };
        Self {
            geometry: pairs(&[("NSRect", "CGRect"), ("NSPoint", "CGPoint"), ("NSSize", "CGSize")]),
            enum_renames: pairs(&[("MAITextStorageEditedOptions", "MAITextStorageEditActions")]),
            protected_category_marker: "protected".to_string(),
        }
    }
}

impl UnifyConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&source).map_err(|message| Error::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse and validate; errors carry the JSON path of the offending field.
    pub fn from_json(src: &str) -> Result<Self, String> {
        let de = &mut serde_json::Deserializer::from_str(src);
        let config: Self = serde_path_to_error::deserialize(de).map_err(|err| {
            let path = err.path().to_string();
            format!("at {path} → {}", err.into_inner())
        })?;
        config.validate()?;
        Ok(config)
    }

    // chained substitutions would make a second rewrite pass change names again
    fn validate(&self) -> Result<(), String> {
        for (table, map) in [("geometry", &self.geometry), ("enum_renames", &self.enum_renames)] {
            if let Some((from, to)) = map.iter().find(|(_, to)| map.contains_key(*to)) {
                return Err(format!("at .{table}.{from} → target `{to}` is itself substituted"));
            }
        }
        Ok(())
    }

    pub fn enum_name(&self, unified: String) -> String {
        self.enum_renames.get(&unified).cloned().unwrap_or(unified)
    }

    pub fn is_protected_category(&self, category: &str) -> bool {
        !self.protected_category_marker.is_empty()
            && category
                .to_ascii_lowercase()
                .contains(&self.protected_category_marker.to_ascii_lowercase())
    }
}
