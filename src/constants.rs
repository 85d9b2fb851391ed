//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// History store constants
pub mod history {
    /// Entries older than this many days are dropped at run start
    pub const WINDOW_DAYS: i64 = 30;
}

/// Candidate collection constants
pub mod collect {
    /// Default recency lookback for the daily profile (days)
    pub const DAILY_LOOKBACK_DAYS: i64 = 3;

    /// Recency lookback for the weekly profile (days)
    pub const WEEKLY_LOOKBACK_DAYS: i64 = 7;

    /// Hard cap on candidates handed to downstream stages
    pub const MAX_CANDIDATES: usize = 15;

    /// Timeout for feed and article fetches (seconds)
    pub const FETCH_TIMEOUT_SECS: u64 = 5;

    /// Scraped article bodies are truncated to this many characters
    pub const SCRAPE_MAX_CHARS: usize = 3000;

    /// Scraped bodies shorter than this are treated as extraction failures
    pub const SCRAPE_MIN_CHARS: usize = 100;

    /// Feed summaries used as a scrape fallback are truncated to this length
    pub const SUMMARY_MAX_CHARS: usize = 2000;
}

/// Topic selection constants
pub mod select {
    /// At most this many candidates are enumerated in the ranking prompt
    pub const RANKING_POOL: usize = 15;
}

/// Draft composition constants
pub mod compose {
    /// Image placeholders embedded per topic section
    pub const PLACEHOLDERS_PER_TOPIC: usize = 3;

    /// Placeholder token prefix; the full token is `[IMAGE_PLACEHOLDER_<n>]`
    pub const PLACEHOLDER_PREFIX: &str = "[IMAGE_PLACEHOLDER_";

    /// Marker phrase identifying the in-document glossary heading
    pub const GLOSSARY_MARKER: &str = "Glossary";
}

/// Asset injection constants
pub mod assets {
    /// Results requested per image search, giving URL dedup a pool to pick from
    pub const IMAGE_POOL_SIZE: usize = 5;
}

/// Generative service pacing constants
pub mod pacing {
    /// Default minimum interval between consecutive generate calls (seconds)
    pub const DEFAULT_INTERVAL_SECS: u64 = 5;
}
