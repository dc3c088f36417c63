//! User-defined exclusion rules for library scans.
//!
//! Platforms are filtered by folder name, ROMs by file extension. Both are
//! plain set-difference filters: everything not named is kept.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Directories under the library root that are never platforms
pub const RESERVED_FOLDERS: &[&str] = &["resources", "database"];

/// Exclusion configuration (`[exclude]` in the config file)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Exclusions {
    /// Folder names never treated as platforms
    pub folders: BTreeSet<String>,
    /// File extensions (without dot) never treated as ROMs
    #[serde(rename = "files", deserialize_with = "deserialize_extensions")]
    pub extensions: BTreeSet<String>,
}

fn deserialize_extensions<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|e| e.trim_start_matches('.').to_string())
        .collect())
}

impl Exclusions {
    pub fn new<F, E>(folders: F, extensions: E) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            folders: folders.into_iter().map(Into::into).collect(),
            extensions: extensions
                .into_iter()
                .map(|e| e.into().trim_start_matches('.').to_string())
                .collect(),
        }
    }

    /// Whether a directory name must not be listed as a platform.
    pub fn is_excluded_folder(&self, name: &str) -> bool {
        RESERVED_FOLDERS.contains(&name) || self.folders.contains(name)
    }

    /// Whether a file must not be listed as a ROM.
    ///
    /// Matching is exact and case-sensitive; files without an extension are kept.
    pub fn is_excluded_file(&self, filename: &str) -> bool {
        Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.contains(ext))
    }

    /// Drop reserved and user-excluded folder names, preserving order.
    pub fn filter_platforms(&self, names: Vec<String>) -> Vec<String> {
        names
            .into_iter()
            .filter(|n| !self.is_excluded_folder(n))
            .collect()
    }
}
