//! Adapter layer: Convert IGDB DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types,
//! and where IGDB's image URL conventions are known about.

use super::dto;
use crate::enrichment::domain::{MatchCandidate, PlatformMetadata};

/// IGDB image size tags, embedded in image URLs as a path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    Thumb,
    CoverSmall,
    CoverBig,
    Original,
}

impl ImageSize {
    pub fn tag(self) -> &'static str {
        match self {
            ImageSize::Thumb => "t_thumb",
            ImageSize::CoverSmall => "t_cover_small",
            ImageSize::CoverBig => "t_cover_big",
            ImageSize::Original => "t_original",
        }
    }
}

/// Rewrite schema-relative (or already https) URLs to explicit `https:`.
pub fn normalize_image_url(url: &str) -> String {
    format!("https:{}", url.replace("https:", ""))
}

/// Swap the thumbnail size tag of an image URL for another size.
///
/// URLs without a thumbnail tag are returned unchanged.
pub fn with_image_size(url: &str, size: ImageSize) -> String {
    url.replace(ImageSize::Thumb.tag(), size.tag())
}

/// Build a platform record, degrading to the slug when IGDB has no match.
pub fn to_platform(slug: &str, platform: Option<dto::Platform>) -> PlatformMetadata {
    match platform {
        Some(p) => PlatformMetadata {
            external_id: Some(p.id),
            name: p.name.unwrap_or_else(|| slug.to_string()),
            slug: slug.to_string(),
        },
        None => PlatformMetadata::unresolved(slug),
    }
}

/// First cover's URL, normalized; empty when there is none.
pub fn to_cover_url(covers: &[dto::Image]) -> String {
    covers
        .first()
        .and_then(|c| c.url.as_deref())
        .map(normalize_image_url)
        .unwrap_or_default()
}

/// Screenshot URLs at original resolution, skipping entries without a URL.
pub fn to_screenshot_urls(screenshots: &[dto::Image]) -> Vec<String> {
    screenshots
        .iter()
        .filter_map(|s| s.url.as_deref())
        .map(|url| with_image_size(&normalize_image_url(url), ImageSize::Original))
        .collect()
}

/// Convert a game plus its resolved images into a candidate.
pub fn to_candidate(
    game: dto::Game,
    cover_url: String,
    screenshot_urls: Vec<String>,
) -> MatchCandidate {
    MatchCandidate {
        external_id: game.id,
        slug: game.slug.unwrap_or_default(),
        name: game.name.unwrap_or_default(),
        summary: game.summary.unwrap_or_default(),
        cover_url,
        screenshot_urls,
    }
}
