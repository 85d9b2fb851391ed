//! Core Domain Types
//!
//! News categories, fetched candidates, and the persisted history entry.

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

// =============================================================================
// Category
// =============================================================================

/// Content category, each with its own feed list and publication cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tech,
    Bio,
    Patent,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Tech, Category::Bio, Category::Patent];

    /// Human-facing label used in prompts, headings, and subjects
    pub fn label(&self) -> &'static str {
        match self {
            Self::Tech => "Tech",
            Self::Bio => "Bio",
            Self::Patent => "Patent",
        }
    }

    /// Default feed sources, overridable via configuration
    pub fn default_feeds(&self) -> Vec<String> {
        let urls: &[&str] = match self {
            Self::Tech => &[
                "https://www.theverge.com/rss/index.xml",
                "https://techcrunch.com/feed/",
            ],
            Self::Bio => &[
                "https://news.google.com/rss/search?q=Biotech+OR+%22FDA+approval%22+OR+%22Clinical+Trial%22&hl=en-US&gl=US&ceid=US:en",
            ],
            Self::Patent => &[
                "https://news.google.com/rss/search?q=Patent+OR+%22Technology+Innovation%22+OR+%22Future+Tech%22&hl=en-US&gl=US&ceid=US:en",
            ],
        };
        urls.iter().map(|u| u.to_string()).collect()
    }

    /// Static image keyword fallback, used when keyword extraction fails
    pub fn fallback_keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Tech => &[
                "digital technology",
                "software code",
                "future tech",
                "network data",
                "cyber security",
                "ai interface",
            ],
            Self::Bio => &[
                "biology laboratory",
                "medical research",
                "healthcare technology",
                "medicine",
                "dna structure",
                "biotech",
            ],
            Self::Patent => &[
                "blueprint architecture",
                "patent document",
                "technology invention",
                "business innovation",
                "future prototype",
                "design patent",
            ],
        }
    }

    /// Publication schedule: Tech runs on Mondays, Bio and Patent on the
    /// remaining days.
    pub fn scheduled_for(weekday: Weekday) -> Vec<Category> {
        match weekday {
            Weekday::Mon => vec![Category::Tech],
            _ => vec![Category::Bio, Category::Patent],
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tech" => Ok(Category::Tech),
            "bio" => Ok(Category::Bio),
            "patent" => Ok(Category::Patent),
            _ => Err(format!(
                "Unknown category: {}. Valid values: tech, bio, patent",
                s
            )),
        }
    }
}

// =============================================================================
// Candidate Item
// =============================================================================

/// A freshly fetched news item, immutable once collected.
///
/// `id` is the canonical article URL and serves as the dedup key against the
/// rolling history window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateItem {
    pub id: String,
    pub title: String,
    pub category: Category,
    /// Bounded article text: scraped body, or feed summary/title fallback
    pub body_excerpt: String,
    pub published_at: Option<DateTime<Utc>>,
}

// =============================================================================
// History Entry
// =============================================================================

/// One previously published item in the rolling 30-day dedup record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
}
