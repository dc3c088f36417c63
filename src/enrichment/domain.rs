//! Internal domain models for game identification and enrichment.
//!
//! These types are OUR types - they don't change when the provider's API changes.
//! All provider responses get converted into these types via the adapter.

/// A platform as known to the metadata provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformMetadata {
    /// Provider platform ID, `None` when the slug could not be resolved
    pub external_id: Option<u64>,
    /// Display name (the slug itself when unresolved)
    pub name: String,
    /// Local directory slug
    pub slug: String,
}

impl PlatformMetadata {
    /// Degraded record for a platform the provider doesn't know.
    ///
    /// Unknown platforms must never block ingestion.
    pub fn unresolved(slug: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            external_id: None,
            name: slug.clone(),
            slug,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.external_id.is_some()
    }
}

/// One normalized search result from the metadata provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchCandidate {
    /// Provider game ID
    pub external_id: u64,
    /// Provider slug (empty if unknown)
    pub slug: String,
    /// Game title
    pub name: String,
    /// Free-text summary
    pub summary: String,
    /// Protocol-normalized cover URL, empty when the game has no cover
    pub cover_url: String,
    /// Original-resolution screenshot URLs, in provider order
    pub screenshot_urls: Vec<String>,
}

impl MatchCandidate {
    pub fn has_cover(&self) -> bool {
        !self.cover_url.is_empty()
    }
}

/// Errors that can occur while talking to the metadata provider
#[derive(Debug, Clone, thiserror::Error)]
pub enum EnrichmentError {
    /// Provider rejected or never issued a usable credential
    #[error("Invalid provider credentials: {0}")]
    AuthConfig(String),

    /// The token endpoint could not be reached or answered garbage
    #[error("Could not obtain provider token: {0}")]
    TokenUnavailable(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl EnrichmentError {
    /// Credential failures abort the process; everything else degrades to "no data".
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::AuthConfig(_) | Self::TokenUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_platform_uses_slug_as_name() {
        let platform = PlatformMetadata::unresolved("n64");
        assert_eq!(platform.external_id, None);
        assert_eq!(platform.name, "n64");
        assert_eq!(platform.slug, "n64");
        assert!(!platform.is_resolved());
    }

    #[test]
    fn test_only_credential_errors_are_fatal() {
        assert!(EnrichmentError::AuthConfig("x".into()).is_fatal());
        assert!(EnrichmentError::TokenUnavailable("x".into()).is_fatal());
        assert!(!EnrichmentError::Network("x".into()).is_fatal());
        assert!(
            !EnrichmentError::Http {
                status: 500,
                message: "boom".into()
            }
            .is_fatal()
        );
        assert!(!EnrichmentError::Parse("x".into()).is_fatal());
    }
}
