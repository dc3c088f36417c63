//! Resolution of raw file downloads.
//!
//! The HTTP layer streams ROMs and assets straight from disk given a path
//! relative to the library or assets root. Only plain relative paths that stay
//! inside the root and name an existing file are accepted.

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// A file ready to be streamed back to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    pub path: PathBuf,
    /// Download name (last path component)
    pub filename: String,
}

/// Resolve `relative` under `root`.
pub fn resolve_raw_path(root: &Path, relative: &str) -> Result<RawFile> {
    let relative_path = Path::new(relative);
    let plain = relative_path
        .components()
        .all(|c| matches!(c, Component::Normal(_)));

    if relative.is_empty() || !plain {
        return Err(Error::invalid_path(relative));
    }

    let path = root.join(relative_path);
    if !path.is_file() {
        return Err(Error::not_found(relative));
    }

    let filename = relative_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(relative)
        .to_string();

    Ok(RawFile { path, filename })
}
