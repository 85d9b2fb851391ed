//! Pipeline Orchestration
//!
//! Runs the seven stages in order for each requested category: collect,
//! select, compose, inject, finish, deliver, commit. Categories are
//! independent failure domains; an aborted category is recorded and the run
//! moves on. History is committed per category and only after its delivery
//! succeeds, so a failed send leaves the items eligible for the next run.

use chrono::Utc;
use std::collections::HashSet;
use tracing::{error, info, warn};

use crate::ai::TextGenerator;
use crate::assets::{AssetInjector, ImageSearcher};
use crate::collect::{ArticleScraper, CandidateCollector, FeedFetcher};
use crate::compose::{DraftComposer, concatenated_subject};
use crate::config::Config;
use crate::deliver::{Dispatcher, MailSender};
use crate::finish::DocumentFinisher;
use crate::history::HistoryStore;
use crate::select::TopicSelector;
use crate::types::{CandidateItem, Category, HistoryEntry, Result};

/// One category's end state within a run
#[derive(Debug)]
pub enum CategoryStatus {
    /// Delivered and committed to history
    Published { topics: usize, subject: String },
    /// Not enough fresh candidates; nothing sent, nothing committed
    Skipped { found: usize, needed: usize },
    /// Dry run stopped after selection
    DryRun { titles: Vec<String> },
    /// Aborted mid-stage; nothing committed
    Failed { error: String },
}

#[derive(Debug)]
pub struct CategoryOutcome {
    pub category: Category,
    pub status: CategoryStatus,
}

/// Aggregate result of one run across its categories
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<CategoryOutcome>,
}

impl RunSummary {
    pub fn published(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, CategoryStatus::Published { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, CategoryStatus::Failed { .. }))
            .count()
    }
}

enum CategoryRun {
    Published {
        items: Vec<CandidateItem>,
        subject: String,
    },
    Skipped {
        found: usize,
    },
    DryRun {
        titles: Vec<String>,
    },
}

/// The pipeline over its five external collaborators
pub struct Pipeline<'a> {
    config: &'a Config,
    generator: &'a dyn TextGenerator,
    fetcher: &'a dyn FeedFetcher,
    scraper: &'a dyn ArticleScraper,
    searcher: &'a dyn ImageSearcher,
    sender: &'a dyn MailSender,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a Config,
        generator: &'a dyn TextGenerator,
        fetcher: &'a dyn FeedFetcher,
        scraper: &'a dyn ArticleScraper,
        searcher: &'a dyn ImageSearcher,
        sender: &'a dyn MailSender,
    ) -> Self {
        Self {
            config,
            generator,
            fetcher,
            scraper,
            searcher,
            sender,
        }
    }

    /// Run the pipeline for the given categories in order.
    ///
    /// Only history-commit failures propagate; everything else is contained
    /// in the per-category outcome.
    pub async fn run(&self, categories: &[Category], dry_run: bool) -> Result<RunSummary> {
        let store = HistoryStore::new(&self.config.history.path);
        let today = Utc::now().date_naive();
        let mut entries: Vec<HistoryEntry> = HistoryStore::prune(store.load(), today);
        info!(
            categories = categories.len(),
            history = entries.len(),
            dry_run,
            "Run starting"
        );

        let mut summary = RunSummary::default();
        for &category in categories {
            let result = {
                let known = HistoryStore::known_ids(&entries);
                self.run_category(category, &known, dry_run).await
            };

            let status = match result {
                Ok(CategoryRun::Published { items, subject }) => {
                    entries = store.commit(std::mem::take(&mut entries), &items, today)?;
                    info!(category = %category, subject, "Category published");
                    CategoryStatus::Published {
                        topics: items.len(),
                        subject,
                    }
                }
                Ok(CategoryRun::Skipped { found }) => {
                    warn!(
                        category = %category,
                        found,
                        needed = self.config.pipeline.topics_per_category,
                        "Not enough fresh candidates, skipping category"
                    );
                    CategoryStatus::Skipped {
                        found,
                        needed: self.config.pipeline.topics_per_category,
                    }
                }
                Ok(CategoryRun::DryRun { titles }) => {
                    info!(category = %category, ?titles, "Dry run stopped after selection");
                    CategoryStatus::DryRun { titles }
                }
                Err(e) => {
                    error!(category = %category, "Category aborted: {}", e);
                    CategoryStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };
            summary.outcomes.push(CategoryOutcome { category, status });
        }

        info!(
            published = summary.published(),
            failed = summary.failed(),
            "Run finished"
        );
        Ok(summary)
    }

    async fn run_category(
        &self,
        category: Category,
        known_ids: &HashSet<&str>,
        dry_run: bool,
    ) -> Result<CategoryRun> {
        let pipeline_cfg = &self.config.pipeline;
        let desired = pipeline_cfg.topics_per_category;

        let collector = CandidateCollector::new(
            self.fetcher,
            self.scraper,
            self.config.profile.lookback_days(),
            pipeline_cfg.max_candidates,
        );
        let candidates = collector
            .collect(
                category,
                self.config.feeds.for_category(category),
                known_ids,
                Utc::now(),
            )
            .await;

        let selector = TopicSelector::new(self.generator);
        let topics = selector.select(&candidates, desired, category.label()).await;
        if topics.len() < desired {
            return Ok(CategoryRun::Skipped {
                found: topics.len(),
            });
        }

        if dry_run {
            return Ok(CategoryRun::DryRun {
                titles: topics.iter().map(|t| t.title.clone()).collect(),
            });
        }

        let composer = DraftComposer::new(self.generator);
        let mut display_titles = Vec::with_capacity(topics.len());
        for topic in &topics {
            display_titles.push(composer.display_title(&topic.title).await);
        }

        let draft = composer
            .compose(&topics, &display_titles, category.label())
            .await?;

        let injector = AssetInjector::new(
            self.generator,
            self.searcher,
            self.config.images.per_query,
        );
        let illustrated = injector.inject(&draft, &topics, category).await;

        let finisher = DocumentFinisher::new(pipeline_cfg.toc, pipeline_cfg.tooltips);
        let document = finisher.finish(&illustrated);

        let subject = if pipeline_cfg.unified_subject {
            composer
                .unified_subject(category.label(), &display_titles)
                .await
        } else {
            concatenated_subject(category.label(), &display_titles)
        };

        Dispatcher::new(self.sender)
            .dispatch(&subject, &document)
            .await?;

        Ok(CategoryRun::Published {
            items: topics,
            subject,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ImageRef;
    use crate::collect::FeedEntry;
    use crate::types::LoomError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct OneFeed(Vec<FeedEntry>);

    #[async_trait]
    impl FeedFetcher for OneFeed {
        async fn fetch(&self, _url: &str) -> Result<Vec<FeedEntry>> {
            Ok(self.0.clone())
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

    struct OneImage;

    #[async_trait]
    impl ImageSearcher for OneImage {
        async fn search(&self, query: &str, _count: usize) -> Result<Vec<ImageRef>> {
            Ok(vec![ImageRef {
                url: format!("https://img/{}", query.replace(' ', "-")),
            }])
        }
    }

    static ONE_IMAGE: OneImage = OneImage;

    struct Scripted {
        responses: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(responses: Vec<&str>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().map(String::from).collect()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(LoomError::Generation("script exhausted".into()));
            }
            Ok(responses.remove(0))
        }
        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct Mail {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl Mail {
        fn new(fail: bool) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait]
    impl MailSender for Mail {
        async fn send(&self, subject: &str, html_body: &str) -> Result<()> {
            if self.fail {
                return Err(LoomError::Delivery("relay refused".into()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((subject.to_string(), html_body.to_string()));
            Ok(())
        }
    }

    fn entries(n: usize) -> Vec<FeedEntry> {
        (0..n)
            .map(|i| FeedEntry {
                title: format!("Fresh story {}", i),
                link: format!("https://news/{}", i),
                published_at: Some(Utc::now()),
                summary: Some(format!("Summary {}", i)),
            })
            .collect()
    }

    fn config(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.pipeline.topics_per_category = 1;
        config.pipeline.unified_subject = false;
        config.history.path = dir.path().join("history.json");
        config
    }

    /// Scripted responses for a one-topic published run with the unified
    /// subject disabled: title, outline, section, image keyword plan.
    fn happy_script() -> Scripted {
        Scripted::new(vec![
            "Polished Title",
            "outline",
            "<h1>[Tech Deep-Dive] Polished Title</h1>[IMAGE_PLACEHOLDER_1]<h2>1. The Context</h2>",
            r#"["circuit board"]"#,
        ])
    }

    #[tokio::test]
    async fn test_happy_path_publishes_and_commits() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let generator = happy_script();
        let fetcher = OneFeed(entries(1));
        let mail = Mail::new(false);
        let pipeline =
            Pipeline::new(&config, &generator, &fetcher, &NO_SCRAPE, &ONE_IMAGE, &mail);

        let summary = pipeline.run(&[Category::Tech], false).await.unwrap();
        assert_eq!(summary.published(), 1);
        assert_eq!(summary.failed(), 0);

        let sent = mail.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "[Tech Analysis] Polished Title");
        assert!(sent[0].1.contains("https://img/circuit-board"));
        assert!(!sent[0].1.contains("[IMAGE_PLACEHOLDER_"));

        let committed = HistoryStore::new(config.history.path.clone()).load();
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].id, "https://news/0");
    }

    #[tokio::test]
    async fn test_delivery_failure_blocks_history_commit() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let generator = happy_script();
        let fetcher = OneFeed(entries(1));
        let mail = Mail::new(true);
        let pipeline =
            Pipeline::new(&config, &generator, &fetcher, &NO_SCRAPE, &ONE_IMAGE, &mail);

        let summary = pipeline.run(&[Category::Tech], false).await.unwrap();
        assert_eq!(summary.failed(), 1);
        assert!(!config.history.path.exists());
    }

    #[tokio::test]
    async fn test_short_selection_skips_category() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        config.pipeline.topics_per_category = 3;
        let generator = Scripted::new(vec![]);
        let fetcher = OneFeed(entries(1));
        let mail = Mail::new(false);
        let pipeline =
            Pipeline::new(&config, &generator, &fetcher, &NO_SCRAPE, &ONE_IMAGE, &mail);

        let summary = pipeline.run(&[Category::Bio], false).await.unwrap();
        assert!(matches!(
            summary.outcomes[0].status,
            CategoryStatus::Skipped { found: 1, needed: 3 }
        ));
        assert!(mail.sent.lock().unwrap().is_empty());
        assert!(!config.history.path.exists());
    }

    #[tokio::test]
    async fn test_dry_run_stops_after_selection() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        // No generate calls expected at all: one candidate, desired one
        let generator = Scripted::new(vec![]);
        let fetcher = OneFeed(entries(1));
        let mail = Mail::new(false);
        let pipeline =
            Pipeline::new(&config, &generator, &fetcher, &NO_SCRAPE, &ONE_IMAGE, &mail);

        let summary = pipeline.run(&[Category::Tech], true).await.unwrap();
        match &summary.outcomes[0].status {
            CategoryStatus::DryRun { titles } => assert_eq!(titles, &["Fresh story 0"]),
            other => panic!("unexpected status: {:?}", other),
        }
        assert!(mail.sent.lock().unwrap().is_empty());
        assert!(!config.history.path.exists());
    }

    #[tokio::test]
    async fn test_category_failure_is_contained() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        // Bio's title call succeeds, then the script runs out: Bio's outline
        // call and every Patent call fail. Both failures are contained.
        let generator = Scripted::new(vec!["Title A"]);
        let fetcher = OneFeed(entries(1));
        let mail = Mail::new(false);
        let pipeline =
            Pipeline::new(&config, &generator, &fetcher, &NO_SCRAPE, &ONE_IMAGE, &mail);

        let summary = pipeline
            .run(&[Category::Bio, Category::Patent], false)
            .await
            .unwrap();
        assert_eq!(summary.outcomes.len(), 2);
        assert_eq!(summary.failed(), 2);
        assert!(!config.history.path.exists());
    }

    struct ScriptedImages {
        responses: Mutex<Vec<Result<Vec<ImageRef>>>>,
    }

    #[async_trait]
    impl ImageSearcher for ScriptedImages {
        async fn search(&self, _query: &str, _count: usize) -> Result<Vec<ImageRef>> {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Ok(Vec::new());
            }
            responses.remove(0)
        }
    }

    #[tokio::test]
    async fn test_full_two_topic_run() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        config.pipeline.topics_per_category = 2;

        // Three feed items, one too old for the 3-day daily window
        let mut feed = entries(2);
        feed.push(FeedEntry {
            title: "Stale story".into(),
            link: "https://news/stale".into(),
            published_at: Some(Utc::now() - chrono::Duration::days(10)),
            summary: None,
        });
        let fetcher = OneFeed(feed);

        // Two survivors equal the desired count, so no ranking call is made:
        // two titles, the outline, two sections, then the keyword plan.
        let generator = Scripted::new(vec![
            "Title One",
            "Title Two",
            "outline",
            "<h1>[Tech Deep-Dive] Title One</h1>[IMAGE_PLACEHOLDER_1]\
             <h2>1. The Context</h2>[IMAGE_PLACEHOLDER_2]<br>[IMAGE_PLACEHOLDER_3]",
            "<h1>[Tech Deep-Dive] Title Two</h1>[IMAGE_PLACEHOLDER_4]\
             <h2>1. The Context</h2>[IMAGE_PLACEHOLDER_5]<br>[IMAGE_PLACEHOLDER_6]\
             <h2>Glossary</h2><ul><li>HBM: stacked memory</li></ul>",
            r#"["a", "b", "c", "d", "e", "f"]"#,
        ]);

        // The fourth search comes back empty; that slot resolves to nothing
        let searcher = ScriptedImages {
            responses: Mutex::new(vec![
                Ok(vec![ImageRef { url: "https://img/1".into() }]),
                Ok(vec![ImageRef { url: "https://img/2".into() }]),
                Ok(vec![ImageRef { url: "https://img/3".into() }]),
                Ok(Vec::new()),
                Ok(vec![ImageRef { url: "https://img/5".into() }]),
                Ok(vec![ImageRef { url: "https://img/6".into() }]),
            ]),
        };

        let mail = Mail::new(false);
        let pipeline =
            Pipeline::new(&config, &generator, &fetcher, &NO_SCRAPE, &searcher, &mail);

        let summary = pipeline.run(&[Category::Tech], false).await.unwrap();
        assert_eq!(summary.published(), 1);

        let sent = mail.sent.lock().unwrap();
        let body = &sent[0].1;
        // Both topic headings render in the preview; the source block holds
        // only the escaped form.
        assert_eq!(body.matches("<h1").count(), 2);
        assert_eq!(body.matches("&lt;h1").count(), 2);
        assert!(!body.contains("[IMAGE_PLACEHOLDER_"));
        assert!(body.contains("https://img/1"));
        assert!(body.contains("https://img/6"));
        assert!(body.contains("loom-toc"));
        assert!(body.contains("stacked memory"));

        let committed = HistoryStore::new(config.history.path.clone()).load();
        assert_eq!(committed.len(), 2);
        assert!(committed.iter().all(|e| e.id != "https://news/stale"));
    }

    #[tokio::test]
    async fn test_history_dedup_across_runs() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let fetcher = OneFeed(entries(1));
        let mail = Mail::new(false);

        let generator = happy_script();
        let pipeline =
            Pipeline::new(&config, &generator, &fetcher, &NO_SCRAPE, &ONE_IMAGE, &mail);
        pipeline.run(&[Category::Tech], false).await.unwrap();

        // Second run sees the same single feed item, now in history
        let generator = Scripted::new(vec![]);
        let pipeline =
            Pipeline::new(&config, &generator, &fetcher, &NO_SCRAPE, &ONE_IMAGE, &mail);
        let summary = pipeline.run(&[Category::Tech], false).await.unwrap();
        assert!(matches!(
            summary.outcomes[0].status,
            CategoryStatus::Skipped { found: 0, .. }
        ));
        assert_eq!(mail.sent.lock().unwrap().len(), 1);
    }
}
