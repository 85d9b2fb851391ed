//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Credentials resolve from config values first, then conventional
//! environment variables; absence of a required credential is startup-fatal.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::constants;
use crate::types::{Category, LoomError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Deployment profile (controls the recency lookback window)
    pub profile: Profile,

    /// Pipeline stage settings and feature flags
    pub pipeline: PipelineConfig,

    /// Generative text service settings
    pub llm: LlmConfig,

    /// Image search settings
    pub images: ImageConfig,

    /// Mail delivery settings
    pub mail: MailConfig,

    /// History store settings
    pub history: HistoryConfig,

    /// Feed source lists per category
    pub feeds: FeedsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            profile: Profile::default(),
            pipeline: PipelineConfig::default(),
            llm: LlmConfig::default(),
            images: ImageConfig::default(),
            mail: MailConfig::default(),
            history: HistoryConfig::default(),
            feeds: FeedsConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values and required credentials.
    /// Returns `LoomError::Config` on the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.topics_per_category == 0 {
            return Err(LoomError::Config(
                "pipeline.topics_per_category must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.max_candidates == 0 {
            return Err(LoomError::Config(
                "pipeline.max_candidates must be greater than 0".to_string(),
            ));
        }

        if self.llm.timeout_secs == 0 {
            return Err(LoomError::Config(
                "llm.timeout_secs must be greater than 0".to_string(),
            ));
        }

        for (category, urls) in self.feeds.all() {
            for url in urls {
                url::Url::parse(url).map_err(|e| {
                    LoomError::Config(format!("invalid {} feed url '{}': {}", category, url, e))
                })?;
            }
        }

        // Required credentials: fail at startup, not mid-pipeline
        self.llm.api_key()?;
        self.images.access_key()?;
        self.mail.credentials()?;

        Ok(())
    }
}

// =============================================================================
// Profile
// =============================================================================

/// Deployment profile. Daily runs look back 3 days, weekly runs 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Daily,
    Weekly,
}

impl Profile {
    /// Recency lookback window in days
    pub fn lookback_days(&self) -> i64 {
        match self {
            Self::Daily => constants::collect::DAILY_LOOKBACK_DAYS,
            Self::Weekly => constants::collect::WEEKLY_LOOKBACK_DAYS,
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
        }
    }
}

// =============================================================================
// Pipeline Configuration
// =============================================================================

/// Stage inclusion flags and sizing knobs.
///
/// The flags collapse what used to be parallel richer/simpler pipeline
/// variants into one configurable pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Topics drafted per category per run
    pub topics_per_category: usize,

    /// Cap on candidates surviving collection
    pub max_candidates: usize,

    /// Prepend a table of contents with per-heading anchors
    pub toc: bool,

    /// Rewrite glossary-marked terms into tooltip spans
    pub tooltips: bool,

    /// Synthesize a unified delivery subject with a dedicated generate call
    /// (otherwise per-topic titles are concatenated)
    pub unified_subject: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            topics_per_category: 2,
            max_candidates: constants::collect::MAX_CANDIDATES,
            toc: true,
            tooltips: true,
            unified_subject: true,
        }
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model name passed to the Generative Language API
    pub model: String,

    /// API key; falls back to the GEMINI_API_KEY environment variable.
    /// Never serialized to output.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    pub api_base: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Minimum interval between consecutive generate calls (seconds)
    pub pacing_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-3-flash-preview".to_string(),
            api_key: None,
            api_base: None,
            timeout_secs: 120,
            pacing_secs: constants::pacing::DEFAULT_INTERVAL_SECS,
        }
    }
}

impl LlmConfig {
    /// Resolve the API key from config or environment
    pub fn api_key(&self) -> Result<SecretString> {
        resolve_secret(self.api_key.as_deref(), "GEMINI_API_KEY", "llm.api_key")
    }
}

// =============================================================================
// Image Search Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Unsplash access key; falls back to UNSPLASH_ACCESS_KEY.
    /// Never serialized to output.
    #[serde(skip_serializing)]
    pub access_key: Option<String>,

    /// Results requested per search query
    pub per_query: usize,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            access_key: None,
            per_query: constants::assets::IMAGE_POOL_SIZE,
        }
    }
}

impl ImageConfig {
    /// Resolve the access key from config or environment
    pub fn access_key(&self) -> Result<SecretString> {
        resolve_secret(
            self.access_key.as_deref(),
            "UNSPLASH_ACCESS_KEY",
            "images.access_key",
        )
    }
}

// =============================================================================
// Mail Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// SMTP relay host
    pub smtp_host: String,

    /// Account address; falls back to GMAIL_USER
    pub username: Option<String>,

    /// App password; falls back to GMAIL_APP_PASSWORD.
    /// Never serialized to output.
    #[serde(skip_serializing)]
    pub app_password: Option<String>,

    /// Recipient address; defaults to the account address
    pub recipient: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            username: None,
            app_password: None,
            recipient: None,
        }
    }
}

impl MailConfig {
    /// Resolve account address and password from config or environment
    pub fn credentials(&self) -> Result<(String, SecretString)> {
        let username = self
            .username
            .clone()
            .or_else(|| env::var("GMAIL_USER").ok())
            .ok_or_else(|| {
                LoomError::Config(
                    "mail account not found: set mail.username or GMAIL_USER".to_string(),
                )
            })?;
        let password = resolve_secret(
            self.app_password.as_deref(),
            "GMAIL_APP_PASSWORD",
            "mail.app_password",
        )?;
        Ok((username, password))
    }

    /// Delivery target, defaulting to the sending account
    pub fn recipient(&self, username: &str) -> String {
        self.recipient
            .clone()
            .unwrap_or_else(|| username.to_string())
    }
}

// =============================================================================
// History Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Path to the JSON-encoded history file
    pub path: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("history.json"),
        }
    }
}

// =============================================================================
// Feed Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedsConfig {
    pub tech: Vec<String>,
    pub bio: Vec<String>,
    pub patent: Vec<String>,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            tech: Category::Tech.default_feeds(),
            bio: Category::Bio.default_feeds(),
            patent: Category::Patent.default_feeds(),
        }
    }
}

impl FeedsConfig {
    /// Feed sources for one category
    pub fn for_category(&self, category: Category) -> &[String] {
        match category {
            Category::Tech => &self.tech,
            Category::Bio => &self.bio,
            Category::Patent => &self.patent,
        }
    }

    fn all(&self) -> impl Iterator<Item = (Category, &Vec<String>)> {
        [
            (Category::Tech, &self.tech),
            (Category::Bio, &self.bio),
            (Category::Patent, &self.patent),
        ]
        .into_iter()
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn resolve_secret(configured: Option<&str>, env_var: &str, field: &str) -> Result<SecretString> {
    configured
        .map(str::to_string)
        .or_else(|| env::var(env_var).ok())
        .filter(|s| !s.is_empty())
        .map(SecretString::from)
        .ok_or_else(|| {
            LoomError::Config(format!(
                "credential not found: set {} or the {} env var",
                field, env_var
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_lookback() {
        assert_eq!(Profile::Daily.lookback_days(), 3);
        assert_eq!(Profile::Weekly.lookback_days(), 7);
    }

    #[test]
    fn test_validate_rejects_zero_topics() {
        let mut config = Config::default();
        config.pipeline.topics_per_category = 0;
        assert!(matches!(
            config.validate(),
            Err(LoomError::Config(msg)) if msg.contains("topics_per_category")
        ));
    }

    #[test]
    fn test_validate_rejects_bad_feed_url() {
        let mut config = Config::default();
        config.feeds.tech = vec!["not a url".to_string()];
        assert!(matches!(
            config.validate(),
            Err(LoomError::Config(msg)) if msg.contains("feed url")
        ));
    }

    #[test]
    fn test_missing_credential_is_config_error() {
        let llm = LlmConfig {
            api_key: None,
            ..Default::default()
        };
        // Only meaningful when the env var is absent in the test environment
        if env::var("GEMINI_API_KEY").is_err() {
            assert!(matches!(llm.api_key(), Err(LoomError::Config(_))));
        }
    }

    #[test]
    fn test_secrets_not_serialized() {
        let config = Config {
            llm: LlmConfig {
                api_key: Some("super-secret".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let out = toml::to_string(&config).unwrap();
        assert!(!out.contains("super-secret"));
    }

    #[test]
    fn test_recipient_defaults_to_account() {
        let mail = MailConfig::default();
        assert_eq!(mail.recipient("me@example.com"), "me@example.com");
    }
}
