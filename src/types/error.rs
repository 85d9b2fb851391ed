//! Unified Error Type System
//!
//! Centralized error types for the entire pipeline.
//!
//! ## Error Policy (one taxonomy, two blast radii)
//!
//! - **Isolated**: absorbed with a deterministic fallback at the call site
//!   (per-source feed failures, image lookups, malformed LLM JSON)
//! - **Category-fatal**: aborts publication of the current category but never
//!   the process (generation failures at or above the drafting stage,
//!   delivery failures)
//! - **Startup-fatal**: only missing required configuration terminates a run
//!   before it starts
//!
//! No panic/unwrap in pipeline code - all errors are routed through here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoomError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Collaborator Errors
    // -------------------------------------------------------------------------
    /// Per-source feed or scrape failure. Isolated: the source contributes
    /// zero items and collection continues.
    #[error("fetch failed for {origin}: {message}")]
    Fetch { origin: String, message: String },

    /// Generative service failure. Aborts the current category's publication
    /// without corrupting history.
    #[error("generation failed: {0}")]
    Generation(String),

    /// Image search failure. Degrades to an empty slot, non-fatal.
    #[error("image lookup failed: {0}")]
    ImageLookup(String),

    /// Mail delivery failure. Skips the category's history commit, non-fatal
    /// to the process.
    #[error("mail delivery failed: {0}")]
    Delivery(String),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("config error: {0}")]
    Config(String),

    #[error("history store error: {0}")]
    History(String),
}

pub type Result<T> = std::result::Result<T, LoomError>;

impl LoomError {
    /// Create a fetch error carrying the failing feed or page URL
    pub fn fetch(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Errors at or above the drafting stage abort the affected category
    /// (but not the run).
    pub fn aborts_category(&self) -> bool {
        matches!(self, Self::Generation(_) | Self::Delivery(_))
    }

    /// Errors below the drafting stage are absorbed with deterministic
    /// fallbacks at the call site.
    pub fn is_isolated(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::ImageLookup(_))
    }

    /// Delivery failures additionally veto the history commit for the
    /// category: an item is only "published" once it was actually sent.
    pub fn blocks_history_commit(&self) -> bool {
        matches!(self, Self::Delivery(_))
    }
}
