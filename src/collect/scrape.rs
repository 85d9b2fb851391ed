//! Article Scraper
//!
//! Optional body enrichment for candidates: fetch the article page and join
//! its paragraph text, bounded in length. Failure is always an acceptable
//! outcome; the caller falls back to the feed summary or title.

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;

use crate::constants::collect::{FETCH_TIMEOUT_SECS, SCRAPE_MAX_CHARS, SCRAPE_MIN_CHARS};
use crate::types::{LoomError, Result};

/// Scrape collaborator: best-effort article body extraction
#[async_trait]
pub trait ArticleScraper: Send + Sync {
    /// Fetch and extract the article body, or None when extraction fails
    /// or yields too little text to be useful.
    async fn fetch_body(&self, url: &str) -> Option<String>;
}

/// Paragraph-joining extractor over reqwest + scraper
pub struct HtmlScraper {
    client: reqwest::Client,
}

impl HtmlScraper {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64)")
            .build()
            .map_err(|e| LoomError::fetch("scrape client", e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ArticleScraper for HtmlScraper {
    async fn fetch_body(&self, url: &str) -> Option<String> {
        let response = match self.client.get(url).send().await {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                debug!(url, status = %r.status(), "Scrape skipped");
                return None;
            }
            Err(e) => {
                debug!(url, "Scrape failed: {}", e);
                return None;
            }
        };

        let html = response.text().await.ok()?;
        extract_paragraph_text(&html)
    }
}

/// Join `<p>` text; reject documents with too little prose to summarize.
fn extract_paragraph_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let paragraphs = Selector::parse("p").expect("static pattern");

    let text = document
        .select(&paragraphs)
        .map(|p| p.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ");

    if text.len() <= SCRAPE_MIN_CHARS {
        return None;
    }
    Some(truncate_chars(&text, SCRAPE_MAX_CHARS))
}

/// Truncate on a char boundary
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
