//! ROM enrichment module - identifies games and fetches metadata from IGDB.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain models** (`domain.rs`) - Internal types that represent our business logic
//! - **API DTOs** (`igdb/dto.rs`) - Exact API response shapes
//! - **Adapter** (`igdb/adapter.rs`) - Converts DTOs to domain models, knows IGDB URL conventions
//! - **Client** (`igdb/client.rs`) - HTTP client for the provider
//! - **Token** (`token.rs`) - Cached, self-renewing bearer credential
//! - **Service** - High-level search with category fallbacks and failure absorption
//!
//! # Usage
//!
//! ```ignore
//! use rom_minder::enrichment::{EnrichmentService, EnrichmentConfig};
//!
//! let service = EnrichmentService::new(igdb_client, EnrichmentConfig::default());
//! let platform = service.resolve_platform("snes").await?;
//! let best = service.search_by_filename("Super Game (USA).sfc", platform.external_id).await?;
//! ```

pub mod domain;
pub mod igdb;
pub mod search_term;
pub mod service;
pub mod token;
pub mod traits;

pub use domain::{EnrichmentError, MatchCandidate, PlatformMetadata};
pub use igdb::IgdbClient;
pub use search_term::search_term_from_filename;
pub use service::{EnrichmentConfig, EnrichmentService};
pub use token::{MemoryTokenStore, TokenCache, TokenStore, TwitchTokenIssuer};
pub use traits::MetadataApi;
