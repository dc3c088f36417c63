//! Cover art caching.
//!
//! Covers found by the enrichment service are downloaded once per size and
//! kept on disk next to the library, so listing views never hit the network.
//!
//! # Design Principles
//!
//! - **Idempotent**: an existing asset is reused unless overwrite is requested
//! - **Graceful degradation**: a failed download falls back to the placeholder
//! - **No partial files**: assets appear on disk complete or not at all

mod download;
mod store;

#[cfg(test)]
pub use download::mocks;
pub use download::{CoverDownloader, HttpCoverDownloader};
pub use store::{CoverStore, DEFAULT_COVER_NAME, DEFAULT_COVER_PLATFORM};

use crate::enrichment::igdb::ImageSize;

/// Cached cover variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverSize {
    Small,
    Large,
}

impl CoverSize {
    /// File name suffix (`_s` / `_l`)
    pub fn suffix(self) -> &'static str {
        match self {
            CoverSize::Small => "s",
            CoverSize::Large => "l",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CoverSize::Small => "small",
            CoverSize::Large => "big",
        }
    }

    /// Provider image size fetched for this variant
    pub fn image_size(self) -> ImageSize {
        match self {
            CoverSize::Small => ImageSize::CoverSmall,
            CoverSize::Large => ImageSize::CoverBig,
        }
    }
}

/// Where each cover size can be served from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverPaths {
    pub small: String,
    pub large: String,
    /// A real large cover is stored (not the placeholder)
    pub has_cover: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_size_mapping() {
        assert_eq!(CoverSize::Small.suffix(), "s");
        assert_eq!(CoverSize::Large.suffix(), "l");
        assert_eq!(CoverSize::Small.image_size(), ImageSize::CoverSmall);
        assert_eq!(CoverSize::Large.image_size(), ImageSize::CoverBig);
    }
}
