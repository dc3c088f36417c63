//! Enrichment service - turns local filenames into normalized provider metadata
//!
//! This is the high-level API for identifying ROMs:
//! 1. Resolve the platform slug to a provider platform ID
//! 2. Search by the filename's cleaned-up title, trying the configured categories
//!    in order before an unrestricted search
//! 3. Resolve the winner's cover and screenshots
//!
//! Enrichment is best-effort. A network failure or non-2xx answer from a single
//! provider call is logged and treated as "no data" for that call. Only
//! credential failures (see [`EnrichmentError::is_fatal`]) are returned.

use super::domain::{EnrichmentError, MatchCandidate, PlatformMetadata};
use super::igdb::{ImageSize, adapter, dto};
use super::search_term::{fold_to_ascii, search_term_from_filename};
use super::traits::MetadataApi;

/// Provider category for main games. Opaque IGDB taxonomy ID.
pub const MAIN_GAME_CATEGORY: u32 = 0;
/// Provider category for remakes/remasters. Opaque IGDB taxonomy ID.
pub const REMAKE_CATEGORY: u32 = 10;
/// Screenshots fetched per candidate
pub const DEFAULT_SCREENSHOT_LIMIT: usize = 5;

/// Configuration for the enrichment service
#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    /// Category filters tried in order before the unrestricted search
    pub search_categories: Vec<u32>,
    /// Maximum screenshots per candidate
    pub screenshot_limit: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            search_categories: vec![MAIN_GAME_CATEGORY, REMAKE_CATEGORY],
            screenshot_limit: DEFAULT_SCREENSHOT_LIMIT,
        }
    }
}

/// Service for resolving ROM metadata from the provider
pub struct EnrichmentService<A> {
    api: A,
    config: EnrichmentConfig,
}

impl<A: MetadataApi> EnrichmentService<A> {
    /// Create a new enrichment service over a provider API
    pub fn new(api: A, config: EnrichmentConfig) -> Self {
        Self { api, config }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Resolve a platform slug, degrading to `{no id, name: slug}` when unknown.
    pub async fn resolve_platform(&self, slug: &str) -> Result<PlatformMetadata, EnrichmentError> {
        let platforms = absorb("platform lookup", self.api.platforms_by_slug(slug).await)?;
        let platform = adapter::to_platform(slug, platforms.into_iter().next());

        if !platform.is_resolved() {
            tracing::warn!("Platform {} not found on provider", slug);
        }
        Ok(platform)
    }

    /// Best match for a ROM filename, or `None` when nothing matches.
    ///
    /// Tries each configured category, then an unrestricted search; the first
    /// non-empty result wins and later searches are not issued.
    pub async fn search_by_filename(
        &self,
        filename: &str,
        platform_id: Option<u64>,
    ) -> Result<Option<MatchCandidate>, EnrichmentError> {
        let Some(platform_id) = platform_id else {
            tracing::debug!("Skipping search for {}: platform not resolved", filename);
            return Ok(None);
        };

        let term = search_term_from_filename(filename);
        let attempts = self
            .config
            .search_categories
            .iter()
            .map(|c| Some(*c))
            .chain(std::iter::once(None));

        for category in attempts {
            let games = absorb(
                "game search",
                self.api.search_games(&term, platform_id, category).await,
            )?;

            if let Some(game) = games.into_iter().next() {
                return self.candidate(game, ImageSize::Thumb).await.map(Some);
            }
        }

        tracing::info!("No match for {} (searched \"{}\")", filename, term);
        Ok(None)
    }

    /// Direct lookup of a known game.
    ///
    /// An unknown ID still yields a candidate carrying the ID, with empty text fields.
    pub async fn search_by_id(&self, game_id: u64) -> Result<MatchCandidate, EnrichmentError> {
        let games = absorb("game lookup", self.api.games_by_id(game_id).await)?;
        let game = games.into_iter().next().unwrap_or(dto::Game {
            id: game_id,
            slug: None,
            name: None,
            summary: None,
            screenshots: vec![],
        });

        self.candidate(game, ImageSize::Thumb).await
    }

    /// Every match for a term, with big-cover URLs for list views.
    pub async fn search_all_by_name(
        &self,
        term: &str,
        platform_id: u64,
    ) -> Result<Vec<MatchCandidate>, EnrichmentError> {
        let term = fold_to_ascii(term);
        let games = absorb(
            "game search",
            self.api.search_games(&term, platform_id, None).await,
        )?;

        let mut candidates = Vec::with_capacity(games.len());
        for game in games {
            candidates.push(self.candidate(game, ImageSize::CoverBig).await?);
        }
        Ok(candidates)
    }

    /// Every match for a ROM filename; empty when the platform is unresolved.
    pub async fn search_all_by_filename(
        &self,
        filename: &str,
        platform_id: Option<u64>,
    ) -> Result<Vec<MatchCandidate>, EnrichmentError> {
        match platform_id {
            Some(id) => {
                self.search_all_by_name(&search_term_from_filename(filename), id)
                    .await
            }
            None => Ok(Vec::new()),
        }
    }

    /// A known game as a one-element match list, with the big-cover URL.
    pub async fn match_by_id(&self, game_id: u64) -> Result<Vec<MatchCandidate>, EnrichmentError> {
        let mut candidate = self.search_by_id(game_id).await?;
        candidate.cover_url = adapter::with_image_size(&candidate.cover_url, ImageSize::CoverBig);
        Ok(vec![candidate])
    }

    /// Resolve a game's images and convert it.
    ///
    /// Cover and screenshots are independent calls and run concurrently.
    async fn candidate(
        &self,
        game: dto::Game,
        cover_size: ImageSize,
    ) -> Result<MatchCandidate, EnrichmentError> {
        let (cover_url, screenshot_urls) =
            tokio::try_join!(self.cover_url(game.id), self.screenshot_urls(game.id))?;

        let cover_url = adapter::with_image_size(&cover_url, cover_size);
        Ok(adapter::to_candidate(game, cover_url, screenshot_urls))
    }

    async fn cover_url(&self, game_id: u64) -> Result<String, EnrichmentError> {
        let covers = absorb("cover lookup", self.api.covers_for_game(game_id).await)?;
        Ok(adapter::to_cover_url(&covers))
    }

    async fn screenshot_urls(&self, game_id: u64) -> Result<Vec<String>, EnrichmentError> {
        let screenshots = absorb(
            "screenshot lookup",
            self.api
                .screenshots_for_game(game_id, self.config.screenshot_limit)
                .await,
        )?;
        Ok(adapter::to_screenshot_urls(&screenshots))
    }
}

/// Convert a non-fatal provider failure into an empty result set.
fn absorb<T>(
    what: &str,
    result: Result<Vec<T>, EnrichmentError>,
) -> Result<Vec<T>, EnrichmentError> {
    match result {
        Ok(items) => Ok(items),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            tracing::error!("IGDB {} failed: {}", what, e);
            Ok(Vec::new())
        }
    }
}
