//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`, while the
//! CLI uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level error enum for filesystem and ingestion operations
//! - [`EnrichmentError`](crate::enrichment::EnrichmentError) for provider calls
//! - Only credential failures and explicit not-found/conflict conditions
//!   cross the core boundary; upstream flakiness is absorbed where it happens
//!
//! # Example
//!
//! ```ignore
//! use rom_minder::error::{Error, Result};
//!
//! fn rename(store: &LibraryStore) -> Result<()> {
//!     store.rename_rom("snes", "a.sfc", "b.sfc")?; // Conflict if b.sfc exists
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata provider error (only fatal ones reach callers)
    #[error("Enrichment error: {0}")]
    Enrichment(#[from] crate::enrichment::EnrichmentError),

    /// Missing library root, platform directory or file
    #[error("Not found: {0}")]
    NotFound(String),

    /// Target of a mutation already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Path escapes its root or contains separators where a bare name is expected
    #[error("Invalid path: {0}")]
    InvalidPath(PathBuf),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Create an invalid path error.
    pub fn invalid_path(path: impl Into<PathBuf>) -> Self {
        Self::InvalidPath(path.into())
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }

    /// Whether the process cannot continue after this error.
    ///
    /// Only unusable provider credentials qualify.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Enrichment(e) => e.is_fatal(),
            Self::WithContext { source, .. } => source.is_fatal(),
            _ => false,
        }
    }

    /// Whether this is (or wraps) a not-found condition.
    #[cfg(test)]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::WithContext { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::EnrichmentError;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("Platforms not found");
        assert!(err.to_string().contains("Platforms not found"));
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::conflict("b.sfc already exists").context("while renaming a.sfc");
        let msg = err.to_string();
        assert!(msg.contains("while renaming a.sfc"));
        assert!(msg.contains("b.sfc"));
    }

    #[test]
    fn test_fatal_classification() {
        let auth: Error = EnrichmentError::AuthConfig("bad secret".into()).into();
        assert!(auth.is_fatal());
        assert!(auth.context("startup").is_fatal());

        let network: Error = EnrichmentError::Network("timeout".into()).into();
        assert!(!network.is_fatal());
        assert!(!Error::conflict("x").is_fatal());
    }

    #[test]
    fn test_config_errors_are_not_fatal() {
        assert!(!Error::config("read-only config dir").is_fatal());
        assert!(!Error::config("bad toml").context("saving config").is_fatal());
    }

    #[test]
    fn test_not_found_through_context() {
        let err = Error::not_found("snes").context("listing roms");
        assert!(err.is_not_found());
        assert!(!Error::conflict("x").is_not_found());
    }

    #[test]
    fn test_result_ext() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::other("disk full"));
        let with_ctx = result.with_context("writing cover");
        assert!(with_ctx.unwrap_err().to_string().contains("writing cover"));
    }
}
