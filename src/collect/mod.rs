//! Candidate Collection
//!
//! Stage 2 of the pipeline: fetch raw entries per source, apply the recency
//! filter, drop anything already in the history window, cap the result, then
//! enrich the survivors with scraped article bodies.
//!
//! Per-source failure is isolated: a failing source contributes zero items
//! and never aborts collection from the others.

mod feed;
mod scrape;

pub use feed::{FeedEntry, FeedFetcher, RssFetcher};
pub use scrape::{ArticleScraper, HtmlScraper};

use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::constants::collect::SUMMARY_MAX_CHARS;
use crate::types::{CandidateItem, Category};

/// Collector over the feed and scrape collaborators
pub struct CandidateCollector<'a> {
    fetcher: &'a dyn FeedFetcher,
    scraper: &'a dyn ArticleScraper,
    lookback_days: i64,
    max_candidates: usize,
}

impl<'a> CandidateCollector<'a> {
    pub fn new(
        fetcher: &'a dyn FeedFetcher,
        scraper: &'a dyn ArticleScraper,
        lookback_days: i64,
        max_candidates: usize,
    ) -> Self {
        Self {
            fetcher,
            scraper,
            lookback_days,
            max_candidates,
        }
    }

    /// Collect deduplicated, recent candidates for one category.
    ///
    /// The cap is first-come across sources in configuration order, not a
    /// global ranking; ranking is the selector's job.
    pub async fn collect(
        &self,
        category: Category,
        sources: &[String],
        known_ids: &HashSet<&str>,
        now: DateTime<Utc>,
    ) -> Vec<CandidateItem> {
        let cutoff = now - Duration::days(self.lookback_days);
        let mut seen_this_run: HashSet<String> = HashSet::new();
        let mut kept: Vec<FeedEntry> = Vec::new();

        'sources: for source in sources {
            let entries = match self.fetcher.fetch(source).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(source, "Feed source skipped: {}", e);
                    continue;
                }
            };

            for entry in entries {
                // Entries without a timestamp are kept; only a known-old
                // timestamp drops an entry.
                if let Some(published) = entry.published_at
                    && published < cutoff
                {
                    continue;
                }
                if known_ids.contains(entry.link.as_str()) {
                    debug!(id = %entry.link, "Already published, skipping");
                    continue;
                }
                if !seen_this_run.insert(entry.link.clone()) {
                    continue;
                }

                kept.push(entry);
                if kept.len() >= self.max_candidates {
                    break 'sources;
                }
            }
        }

        let mut candidates = Vec::with_capacity(kept.len());
        for entry in kept {
            let body_excerpt = self.resolve_excerpt(&entry).await;
            candidates.push(CandidateItem {
                id: entry.link,
                title: entry.title,
                category,
                body_excerpt,
                published_at: entry.published_at,
            });
        }

        info!(
            category = %category,
            count = candidates.len(),
            "Collected candidates"
        );
        candidates
    }

    /// Scraped body, or bounded summary/title fallback
    async fn resolve_excerpt(&self, entry: &FeedEntry) -> String {
        if let Some(body) = self.scraper.fetch_body(&entry.link).await {
            return body;
        }
        let fallback = entry.summary.as_deref().unwrap_or(&entry.title);
        scrape::truncate_chars(fallback, SUMMARY_MAX_CHARS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LoomError, Result};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct StaticFeeds {
        feeds: HashMap<String, Vec<FeedEntry>>,
        failing: HashSet<String>,
    }

    #[async_trait]
    impl FeedFetcher for StaticFeeds {
        async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>> {
            if self.failing.contains(url) {
                return Err(LoomError::fetch(url, "unreachable"));
            }
            Ok(self.feeds.get(url).cloned().unwrap_or_default())
        }
    }

    struct NoScrape;

    #[async_trait]
    impl ArticleScraper for NoScrape {
        async fn fetch_body(&self, _url: &str) -> Option<String> {
            None
        }
    }

    static NO_SCRAPE: NoScrape = NoScrape;

    fn entry(link: &str, age_days: i64) -> FeedEntry {
        FeedEntry {
            title: format!("Title {}", link),
            link: link.to_string(),
            published_at: Some(Utc::now() - Duration::days(age_days)),
            summary: Some(format!("Summary {}", link)),
        }
    }

    fn collector_setup(entries: Vec<FeedEntry>) -> StaticFeeds {
        StaticFeeds {
            feeds: HashMap::from([("https://feed-a".to_string(), entries)]),
            failing: HashSet::new(),
        }
    }

    #[tokio::test]
    async fn test_recency_filter_drops_old_keeps_undated() {
        let mut entries = vec![entry("https://new", 1), entry("https://old", 10)];
        entries.push(FeedEntry {
            title: "Undated".to_string(),
            link: "https://undated".to_string(),
            published_at: None,
            summary: None,
        });
        let feeds = collector_setup(entries);
        let collector = CandidateCollector::new(&feeds, &NO_SCRAPE, 3, 15);

        let out = collector
            .collect(
                Category::Tech,
                &["https://feed-a".to_string()],
                &HashSet::new(),
                Utc::now(),
            )
            .await;

        let ids: Vec<&str> = out.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["https://new", "https://undated"]);
    }

    #[tokio::test]
    async fn test_history_dedup() {
        let feeds = collector_setup(vec![entry("https://a", 1), entry("https://b", 1)]);
        let collector = CandidateCollector::new(&feeds, &NO_SCRAPE, 3, 15);
        let known: HashSet<&str> = HashSet::from(["https://a"]);

        let out = collector
            .collect(
                Category::Bio,
                &["https://feed-a".to_string()],
                &known,
                Utc::now(),
            )
            .await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "https://b");
    }

    #[tokio::test]
    async fn test_cap_is_first_come() {
        let entries: Vec<FeedEntry> =
            (0..20).map(|i| entry(&format!("https://{}", i), 1)).collect();
        let feeds = collector_setup(entries);
        let collector = CandidateCollector::new(&feeds, &NO_SCRAPE, 3, 15);

        let out = collector
            .collect(
                Category::Tech,
                &["https://feed-a".to_string()],
                &HashSet::new(),
                Utc::now(),
            )
            .await;
        assert_eq!(out.len(), 15);
        assert_eq!(out[0].id, "https://0");
    }

    #[tokio::test]
    async fn test_failing_source_is_isolated() {
        let feeds = StaticFeeds {
            feeds: HashMap::from([("https://feed-b".to_string(), vec![entry("https://x", 1)])]),
            failing: HashSet::from(["https://feed-a".to_string()]),
        };
        let collector = CandidateCollector::new(&feeds, &NO_SCRAPE, 3, 15);

        let out = collector
            .collect(
                Category::Patent,
                &["https://feed-a".to_string(), "https://feed-b".to_string()],
                &HashSet::new(),
                Utc::now(),
            )
            .await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "https://x");
    }

    #[tokio::test]
    async fn test_excerpt_falls_back_to_summary() {
        let feeds = collector_setup(vec![entry("https://a", 1)]);
        let collector = CandidateCollector::new(&feeds, &NO_SCRAPE, 3, 15);

        let out = collector
            .collect(
                Category::Tech,
                &["https://feed-a".to_string()],
                &HashSet::new(),
                Utc::now(),
            )
            .await;
        assert_eq!(out[0].body_excerpt, "Summary https://a");
    }
}
