//! Feed Client
//!
//! RSS/Atom fetching behind the `FeedFetcher` seam. The production client
//! uses a short fixed timeout and fails fast; a failing source is the
//! caller's problem to isolate, not to retry.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::debug;

use crate::constants::collect::FETCH_TIMEOUT_SECS;
use crate::types::{LoomError, Result};

/// One raw entry out of a feed, before filtering
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    pub summary: Option<String>,
}

/// Feed collaborator. Treated as unreliable; errors must not abort the run.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>>;
}

/// RSS/Atom client over reqwest + feed-rs
pub struct RssFetcher {
    client: reqwest::Client,
}

impl RssFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64)")
            .build()
            .map_err(|e| LoomError::fetch("feed client", e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedFetcher for RssFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LoomError::fetch(url, e.to_string()))?;

        if !response.status().is_success() {
            return Err(LoomError::fetch(
                url,
                format!("HTTP {}", response.status()),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LoomError::fetch(url, e.to_string()))?;

        let feed = feed_rs::parser::parse(bytes.as_ref())
            .map_err(|e| LoomError::fetch(url, format!("feed parse failed: {}", e)))?;

        let entries: Vec<FeedEntry> = feed
            .entries
            .into_iter()
            .filter_map(|entry| {
                let link = entry.links.first().map(|l| l.href.clone())?;
                let title = entry.title.map(|t| t.content).unwrap_or_default();
                if title.is_empty() {
                    return None;
                }
                Some(FeedEntry {
                    title,
                    link,
                    published_at: entry.published.or(entry.updated),
                    summary: entry.summary.map(|s| s.content),
                })
            })
            .collect();

        debug!(url, count = entries.len(), "Fetched feed entries");
        Ok(entries)
    }
}
