//! IGDB API Data Transfer Objects
//!
//! These types match what the IGDB v4 API (and the Twitch token endpoint) return.
//! DO NOT use these types outside the igdb module - convert to domain types.
//!
//! API Reference: https://api-docs.igdb.com
//!
//! Every IGDB endpoint answers a POSTed Apicalypse query with a JSON array,
//! so each DTO here is one element of such an array. Fields are only present
//! when named in the query's `fields` clause, hence the liberal `Option`s.

use serde::{Deserialize, Serialize};

/// Twitch client-credentials token response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    /// Validity in seconds
    pub expires_in: Option<u64>,
    pub token_type: Option<String>,
}

/// Element of the /platforms endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Platform {
    pub id: u64,
    pub name: Option<String>,
    pub slug: Option<String>,
}

/// Element of the /games endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Game {
    pub id: u64,
    pub slug: Option<String>,
    pub name: Option<String>,
    pub summary: Option<String>,
    /// Screenshot IDs (not expanded)
    #[serde(default)]
    pub screenshots: Vec<u64>,
}

/// Element of the /covers and /screenshots endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Image {
    pub id: Option<u64>,
    /// Schema-relative thumbnail URL, e.g. `//images.igdb.com/.../t_thumb/abc.jpg`
    pub url: Option<String>,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// ============================================================================
