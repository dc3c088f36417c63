//! Trait definitions for the metadata provider.
//!
//! These traits enable dependency injection and mocking for tests.
//! Production code uses [`IgdbClient`](super::igdb::IgdbClient), while tests
//! substitute [`mocks::MockMetadataApi`].
//!
//! # Example
//!
//! ```ignore
//! use rom_minder::enrichment::{EnrichmentService, traits::MetadataApi};
//!
//! // In production code:
//! let service = EnrichmentService::new(igdb_client, config);
//!
//! // In tests:
//! let service = EnrichmentService::new(MockMetadataApi::default(), config);
//! ```

use async_trait::async_trait;

use super::domain::EnrichmentError;
use super::igdb::dto;

/// Raw provider lookups. Errors are returned as-is; the service decides what to absorb.
#[async_trait]
pub trait MetadataApi: Send + Sync {
    /// Platforms whose slug matches.
    async fn platforms_by_slug(&self, slug: &str) -> Result<Vec<dto::Platform>, EnrichmentError>;

    /// Games matching `term` on a platform, optionally restricted to a category.
    async fn search_games(
        &self,
        term: &str,
        platform_id: u64,
        category: Option<u32>,
    ) -> Result<Vec<dto::Game>, EnrichmentError>;

    /// The game with this ID, if any.
    async fn games_by_id(&self, game_id: u64) -> Result<Vec<dto::Game>, EnrichmentError>;

    /// Covers for a game.
    async fn covers_for_game(&self, game_id: u64) -> Result<Vec<dto::Image>, EnrichmentError>;

    /// Up to `limit` screenshots for a game.
    async fn screenshots_for_game(
        &self,
        game_id: u64,
        limit: usize,
    ) -> Result<Vec<dto::Image>, EnrichmentError>;
}

#[async_trait]
impl MetadataApi for super::igdb::IgdbClient {
    async fn platforms_by_slug(&self, slug: &str) -> Result<Vec<dto::Platform>, EnrichmentError> {
        self.platforms_by_slug(slug).await
    }

    async fn search_games(
        &self,
        term: &str,
        platform_id: u64,
        category: Option<u32>,
    ) -> Result<Vec<dto::Game>, EnrichmentError> {
        self.search_games(term, platform_id, category).await
    }

    async fn games_by_id(&self, game_id: u64) -> Result<Vec<dto::Game>, EnrichmentError> {
        self.games_by_id(game_id).await
    }

    async fn covers_for_game(&self, game_id: u64) -> Result<Vec<dto::Image>, EnrichmentError> {
        self.covers_for_game(game_id).await
    }

    async fn screenshots_for_game(
        &self,
        game_id: u64,
        limit: usize,
    ) -> Result<Vec<dto::Image>, EnrichmentError> {
        self.screenshots_for_game(game_id, limit).await
    }
}
