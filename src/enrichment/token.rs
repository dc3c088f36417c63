//! Provider bearer token caching.
//!
//! IGDB authenticates with a Twitch client-credentials token. Issuing one is
//! comparatively slow and rate limited, so a single credential is cached in a
//! [`TokenStore`] and reused until shortly before it expires.
//!
//! The store is injected and may be shared by several clients. Two
//! near-simultaneous cache misses may each issue a token; the last write wins
//! and both tokens stay valid.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::domain::EnrichmentError;
use super::igdb::dto;

/// Seconds shaved off the provider-reported lifetime.
pub const EXPIRY_SAFETY_MARGIN_SECS: u64 = 10;

/// Store key for the Twitch/IGDB credential.
pub const TWITCH_TOKEN_KEY: &str = "twitch_token";

/// Twitch client-credentials endpoint.
pub const TWITCH_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// An issued bearer token. Replaced wholesale, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Shared credential storage.
pub trait TokenStore: Send + Sync {
    /// Current credential for `key`, if present and unexpired.
    fn get(&self, key: &str) -> Option<Credential>;
    fn set(&self, key: &str, credential: Credential);
    fn expire(&self, key: &str);
}

/// Process-wide in-memory store.
#[derive(Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, Credential>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<Credential> {
        let now = Utc::now();
        self.entries
            .read()
            .get(key)
            .filter(|c| c.is_valid_at(now))
            .cloned()
    }

    fn set(&self, key: &str, credential: Credential) {
        self.entries.write().insert(key.to_string(), credential);
    }

    fn expire(&self, key: &str) {
        self.entries.write().remove(key);
    }
}

/// Something that can mint a fresh credential.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn issue(&self) -> Result<Credential, EnrichmentError>;
}

/// Validate a token response and compute the cached expiry.
///
/// An empty token or a zero lifetime means the client credentials are wrong,
/// which no amount of retrying will fix.
pub fn credential_from_response(
    response: dto::TokenResponse,
    now: DateTime<Utc>,
) -> Result<Credential, EnrichmentError> {
    let token = response.access_token.unwrap_or_default();
    let expires_in = response.expires_in.unwrap_or(0);

    if token.is_empty() || expires_in == 0 {
        return Err(EnrichmentError::AuthConfig(
            "could not get twitch auth token: check client_id and client_secret".to_string(),
        ));
    }

    let lifetime = expires_in.saturating_sub(EXPIRY_SAFETY_MARGIN_SECS);
    let lifetime = chrono::Duration::seconds(lifetime.min(u64::from(u32::MAX)) as i64);

    Ok(Credential {
        token,
        expires_at: now + lifetime,
    })
}

/// Issues tokens from the Twitch OAuth endpoint.
pub struct TwitchTokenIssuer {
    http_client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    timeout: Duration,
}

impl TwitchTokenIssuer {
    pub fn new(
        http_client: reqwest::Client,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            token_url: TWITCH_TOKEN_URL.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            timeout,
        }
    }

    /// Point the issuer at a different token endpoint.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }
}

#[async_trait]
impl TokenIssuer for TwitchTokenIssuer {
    async fn issue(&self) -> Result<Credential, EnrichmentError> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(EnrichmentError::AuthConfig(
                "client_id and client_secret must be configured".to_string(),
            ));
        }

        let response = self
            .http_client
            .post(&self.token_url)
            .query(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| EnrichmentError::TokenUnavailable(e.to_string()))?;

        // Twitch reports bad credentials with a 4xx and a JSON body lacking
        // access_token; parsing it lets the validation below classify it.
        let body = response
            .json::<dto::TokenResponse>()
            .await
            .map_err(|e| EnrichmentError::TokenUnavailable(e.to_string()))?;

        credential_from_response(body, Utc::now())
    }
}

/// Caches a single provider credential, issuing a new one on miss or expiry.
pub struct TokenCache {
    store: Arc<dyn TokenStore>,
    issuer: Arc<dyn TokenIssuer>,
    key: String,
}

impl TokenCache {
    pub fn new(store: Arc<dyn TokenStore>, issuer: Arc<dyn TokenIssuer>) -> Self {
        Self {
            store,
            issuer,
            key: TWITCH_TOKEN_KEY.to_string(),
        }
    }

    /// Cached token if still valid, otherwise a freshly issued one.
    pub async fn get_token(&self) -> Result<String, EnrichmentError> {
        if let Some(credential) = self.store.get(&self.key) {
            return Ok(credential.token);
        }

        tracing::warn!("Provider token missing or expired: fetching a new one...");
        self.issue().await
    }

    /// Issue a new token and cache it.
    pub async fn issue(&self) -> Result<String, EnrichmentError> {
        match self.issuer.issue().await {
            Ok(credential) => {
                let token = credential.token.clone();
                self.store.set(&self.key, credential);
                tracing::info!("Provider token fetched!");
                Ok(token)
            }
            Err(e) => {
                tracing::error!("Could not get provider token: {}", e);
                Err(e)
            }
        }
    }

    /// Drop the cached credential so the next call re-issues.
    pub fn invalidate(&self) {
        self.store.expire(&self.key);
    }
}
