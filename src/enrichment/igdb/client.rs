//! IGDB HTTP client
//!
//! Handles communication with the IGDB v4 API.
//! See: https://api-docs.igdb.com
//!
//! Every endpoint takes a POSTed Apicalypse query and answers with a JSON array.
//! Requests need a `Client-ID` header and a Twitch bearer token; the token is
//! re-read from the [`TokenCache`] immediately before each dispatch, so a renewed
//! token takes effect on the very next call.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;

use super::dto;
use crate::enrichment::domain::EnrichmentError;
use crate::enrichment::token::TokenCache;

pub const IGDB_API_URL: &str = "https://api.igdb.com/v4";

/// IGDB endpoints used by this client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Platforms,
    Games,
    Covers,
    Screenshots,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Endpoint::Platforms => "platforms",
            Endpoint::Games => "games",
            Endpoint::Covers => "covers",
            Endpoint::Screenshots => "screenshots",
        }
    }
}

/// IGDB API client
pub struct IgdbClient {
    http_client: reqwest::Client,
    base_url: String,
    client_id: String,
    tokens: Arc<TokenCache>,
    timeout: Duration,
}

impl IgdbClient {
    /// Create a new client
    pub fn new(
        http_client: reqwest::Client,
        client_id: impl Into<String>,
        tokens: Arc<TokenCache>,
        timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            base_url: IGDB_API_URL.to_string(),
            client_id: client_id.into(),
            tokens,
            timeout,
        }
    }

    /// Point the client at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Look up platforms by slug (IGDB slugs are lowercase)
    pub async fn platforms_by_slug(
        &self,
        slug: &str,
    ) -> Result<Vec<dto::Platform>, EnrichmentError> {
        let query = format!(
            r#"fields id, name; where slug="{}";"#,
            escape(&slug.to_lowercase())
        );
        self.query(Endpoint::Platforms, query).await
    }

    /// Full-text game search on one platform, optionally restricted to a category
    pub async fn search_games(
        &self,
        term: &str,
        platform_id: u64,
        category: Option<u32>,
    ) -> Result<Vec<dto::Game>, EnrichmentError> {
        self.query(Endpoint::Games, search_query(term, platform_id, category))
            .await
    }

    /// Games with the given ID (zero or one element)
    pub async fn games_by_id(&self, game_id: u64) -> Result<Vec<dto::Game>, EnrichmentError> {
        let query = format!("fields id, slug, name, summary; where id={};", game_id);
        self.query(Endpoint::Games, query).await
    }

    /// Covers attached to a game
    pub async fn covers_for_game(&self, game_id: u64) -> Result<Vec<dto::Image>, EnrichmentError> {
        let query = format!("fields url; where game={};", game_id);
        self.query(Endpoint::Covers, query).await
    }

    /// Up to `limit` screenshots attached to a game
    pub async fn screenshots_for_game(
        &self,
        game_id: u64,
        limit: usize,
    ) -> Result<Vec<dto::Image>, EnrichmentError> {
        let query = format!("fields url; where game={}; limit {};", game_id, limit);
        self.query(Endpoint::Screenshots, query).await
    }

    /// Send a query and parse the array response
    async fn query<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        body: String,
    ) -> Result<Vec<T>, EnrichmentError> {
        let token = self.tokens.get_token().await?;
        let url = format!("{}/{}/", self.base_url, endpoint.path());

        tracing::debug!("IGDB {}: {}", endpoint.path(), body);

        let response = self
            .http_client
            .post(&url)
            .header("Client-ID", &self.client_id)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.timeout)
            .body(body)
            .send()
            .await
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            // Token revoked or expired early; make the next call re-issue
            self.tokens.invalidate();
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EnrichmentError::Http {
                status: status.as_u16(),
                message: format!(
                    "{} - {}",
                    status.canonical_reason().unwrap_or("Unknown"),
                    body.chars().take(200).collect::<String>()
                ),
            });
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| EnrichmentError::Parse(e.to_string()))
    }
}

/// Escape a value for embedding in an Apicalypse string literal
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Build the game search query
fn search_query(term: &str, platform_id: u64, category: Option<u32>) -> String {
    let category_filter = category
        .map(|c| format!(" & category={}", c))
        .unwrap_or_default();

    format!(
        r#"search "{}"; fields id, slug, name, summary, screenshots; where platforms=[{}]{};"#,
        escape(term),
        platform_id,
        category_filter
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::token::mocks::{CountingIssuer, test_cache};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    const UNAUTHORIZED: &str =
        "HTTP/1.1 401 Unauthorized\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";
    const EMPTY_ARRAY: &str = "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
                               content-length: 2\r\nconnection: close\r\n\r\n[]";

    /// Answer one connection per canned response, returning the raw requests.
    async fn stub_server(
        responses: Vec<&'static str>,
    ) -> (String, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for response in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                requests.push(read_request(&mut socket).await);
                socket.write_all(response.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
            requests
        });

        (format!("http://{}", addr), handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = header(&text[..end], "content-length")
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn header<'a>(request: &'a str, name: &str) -> Option<&'a str> {
        request.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }

    fn stub_client(base_url: String) -> (IgdbClient, Arc<CountingIssuer>) {
        let (cache, issuer) = test_cache();
        let http_client = reqwest::Client::builder().no_proxy().build().unwrap();
        let client = IgdbClient::new(
            http_client,
            "client-id",
            Arc::new(cache),
            Duration::from_secs(5),
        )
        .with_base_url(base_url);
        (client, issuer)
    }

    #[test]
    fn test_client_creation() {
        let (cache, _) = test_cache();
        let client = IgdbClient::new(
            reqwest::Client::new(),
            "client-id",
            Arc::new(cache),
            Duration::from_secs(120),
        );
        assert_eq!(client.base_url, "https://api.igdb.com/v4");
        assert_eq!(client.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_client_with_custom_url() {
        let (cache, _) = test_cache();
        let client = IgdbClient::new(
            reqwest::Client::new(),
            "id",
            Arc::new(cache),
            Duration::from_secs(1),
        )
        .with_base_url("http://localhost:8080/");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_search_query_with_category() {
        assert_eq!(
            search_query("Super Game", 99, Some(0)),
            r#"search "Super Game"; fields id, slug, name, summary, screenshots; where platforms=[99] & category=0;"#
        );
    }

    #[test]
    fn test_search_query_unrestricted() {
        assert_eq!(
            search_query("Super Game", 99, None),
            r#"search "Super Game"; fields id, slug, name, summary, screenshots; where platforms=[99];"#
        );
    }

    #[test]
    fn test_search_query_escapes_quotes() {
        let query = search_query(r#"The "Best" Game"#, 1, None);
        assert!(query.starts_with(r#"search "The \"Best\" Game";"#));
    }

    #[tokio::test]
    async fn test_unauthorized_renews_token_on_next_call() {
        let (url, server) = stub_server(vec![UNAUTHORIZED, EMPTY_ARRAY]).await;
        let (client, issuer) = stub_client(url);

        let err = client.games_by_id(1).await.unwrap_err();
        assert!(matches!(err, EnrichmentError::Http { status: 401, .. }));

        let games = client.games_by_id(1).await.unwrap();
        assert!(games.is_empty());
        assert_eq!(issuer.calls(), 2);

        let requests = server.await.unwrap();
        assert_eq!(header(&requests[0], "authorization"), Some("Bearer token-1"));
        assert_eq!(header(&requests[1], "authorization"), Some("Bearer token-2"));
    }

    #[tokio::test]
    async fn test_query_reuses_token_and_posts_apicalypse() {
        let (url, server) = stub_server(vec![EMPTY_ARRAY, EMPTY_ARRAY]).await;
        let (client, issuer) = stub_client(url);

        client.platforms_by_slug("SNES").await.unwrap();
        client.covers_for_game(7).await.unwrap();
        assert_eq!(issuer.calls(), 1);

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("POST /platforms/ HTTP/1.1"));
        assert!(requests[0].ends_with(r#"fields id, name; where slug="snes";"#));
        assert_eq!(header(&requests[0], "client-id"), Some("client-id"));
        assert!(requests[1].starts_with("POST /covers/ HTTP/1.1"));
        assert_eq!(header(&requests[1], "authorization"), Some("Bearer token-1"));
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(Endpoint::Games.path(), "games");
        assert_eq!(Endpoint::Screenshots.path(), "screenshots");
    }
}
