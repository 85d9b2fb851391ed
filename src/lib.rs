//! NewsLoom - Scheduled News Analysis and Delivery
//!
//! A pipeline that turns category news feeds into illustrated deep-dive
//! HTML articles and delivers them by mail on a weekday schedule.
//!
//! ## Pipeline Stages
//!
//! - **History**: rolling 30-day record of published items for dedup
//! - **Collect**: RSS fetch, recency filter, article body scraping
//! - **Select**: generative topic ranking with a deterministic fallback
//! - **Compose**: sequential multi-stage HTML drafting with image slots
//! - **Assets**: image search and slot injection with in-document dedup
//! - **Finish**: table of contents and glossary tooltip linking
//! - **Deliver**: SMTP delivery; history commits only after a send
//!
//! ## Quick Start
//!
//! ```ignore
//! use newsloom::{ConfigLoader, Pipeline};
//! use newsloom::types::Category;
//!
//! let config = ConfigLoader::load(None)?;
//! let pipeline = Pipeline::new(&config, &generator, &fetcher, &scraper, &searcher, &sender);
//! let summary = pipeline.run(&[Category::Tech], false).await?;
//! ```

pub mod ai;
pub mod assets;
pub mod collect;
pub mod compose;
pub mod config;
pub mod constants;
pub mod deliver;
pub mod finish;
pub mod history;
pub mod pipeline;
pub mod select;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, Profile};

// Error types
pub use types::{LoomError, Result};

// Pipeline
pub use pipeline::{CategoryStatus, Pipeline, RunSummary};
