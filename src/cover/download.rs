//! Cover image downloads.
//!
//! A download only succeeds on an explicit 2xx answer with a non-empty body;
//! the caller receives the complete body or nothing.

use std::time::Duration;

use async_trait::async_trait;

use crate::enrichment::EnrichmentError;

/// Fetches remote cover images.
#[async_trait]
pub trait CoverDownloader: Send + Sync {
    /// Download the full image body.
    async fn download(&self, url: &str) -> Result<Vec<u8>, EnrichmentError>;
}

/// Downloads covers over HTTP
pub struct HttpCoverDownloader {
    http_client: reqwest::Client,
    timeout: Duration,
}

impl HttpCoverDownloader {
    pub fn new(http_client: reqwest::Client, timeout: Duration) -> Self {
        Self {
            http_client,
            timeout,
        }
    }
}

#[async_trait]
impl CoverDownloader for HttpCoverDownloader {
    async fn download(&self, url: &str) -> Result<Vec<u8>, EnrichmentError> {
        let response = self
            .http_client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            return Err(EnrichmentError::Http {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| EnrichmentError::Network(e.to_string()))?
            .to_vec();

        if data.is_empty() {
            return Err(EnrichmentError::Parse(format!("empty image body from {}", url)));
        }

        Ok(data)
    }
}


#[cfg(test)]
mod tests {
    use super::mocks::MockDownloader;
    use super::*;

    #[tokio::test]
    async fn test_mock_downloader_records_requests() {
        let mock = MockDownloader::default();
        let data = mock.download("https://img/1.png").await.unwrap();
        assert_eq!(data, b"https://img/1.png");
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_downloader_failure() {
        let mock = MockDownloader::failing();
        assert!(mock.download("https://img/1.png").await.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let downloader =
            HttpCoverDownloader::new(reqwest::Client::new(), Duration::from_millis(500));
        let err = downloader.download("http://127.0.0.1:9/cover.png").await.unwrap_err();
        assert!(matches!(err, EnrichmentError::Network(_)));
    }
}
