//! Image Search Client
//!
//! Unsplash search behind the `ImageSearcher` seam. Lookups are best-effort;
//! the injector degrades to an empty slot when this fails.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::ImageConfig;
use crate::constants::collect::FETCH_TIMEOUT_SECS;
use crate::types::{LoomError, Result};

const API_BASE: &str = "https://api.unsplash.com";

/// One search hit; only the resolved URL matters downstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub url: String,
}

/// Image-search collaborator
#[async_trait]
pub trait ImageSearcher: Send + Sync {
    /// Return up to `count` landscape results for a keyword
    async fn search(&self, query: &str, count: usize) -> Result<Vec<ImageRef>>;
}

/// Unsplash photo search client
pub struct UnsplashClient {
    access_key: SecretString,
    client: reqwest::Client,
}

impl std::fmt::Debug for UnsplashClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnsplashClient")
            .field("access_key", &"[REDACTED]")
            .finish()
    }
}

impl UnsplashClient {
    pub fn new(config: &ImageConfig) -> Result<Self> {
        let access_key = config.access_key()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| LoomError::ImageLookup(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { access_key, client })
    }
}

#[async_trait]
impl ImageSearcher for UnsplashClient {
    async fn search(&self, query: &str, count: usize) -> Result<Vec<ImageRef>> {
        let url = format!("{}/search/photos", API_BASE);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("query", query),
                ("per_page", &count.to_string()),
                ("orientation", "landscape"),
                ("client_id", self.access_key.expose_secret()),
            ])
            .send()
            .await
            .map_err(|e| LoomError::ImageLookup(format!("unsplash request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(LoomError::ImageLookup(format!(
                "unsplash API error: {}",
                response.status()
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| LoomError::ImageLookup(format!("unsplash response parse failed: {}", e)))?;

        let refs: Vec<ImageRef> = body
            .results
            .into_iter()
            .map(|r| ImageRef {
                url: r.urls.regular,
            })
            .collect();
        debug!(query, count = refs.len(), "Image search results");
        Ok(refs)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    urls: SearchUrls,
}

#[derive(Debug, Deserialize)]
struct SearchUrls {
    regular: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_deserializes() {
        let raw = r#"{"results":[{"urls":{"regular":"https://img/1"}},{"urls":{"regular":"https://img/2"}}]}"#;
        let parsed: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.results.len(), 2);
        assert_eq!(parsed.results[0].urls.regular, "https://img/1");
    }

    #[test]
    fn test_empty_results_tolerated() {
        let parsed: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.results.is_empty());
    }
}
