//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Config file (newsloom.toml, or an explicit --config path)
//! 3. Environment variables (NEWSLOOM_* prefix)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::Config;
use crate::types::{LoomError, Result};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults -> file -> env vars. Validation runs after merging.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        let file = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);
        if file.exists() {
            debug!("Loading config from: {}", file.display());
            figment = figment.merge(Toml::file(&file));
        } else if path.is_some() {
            return Err(LoomError::Config(format!(
                "config file not found: {}",
                file.display()
            )));
        }

        // e.g. NEWSLOOM_LLM_MODEL -> llm.model
        figment = figment.merge(Env::prefixed("NEWSLOOM_").split('_').lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| LoomError::Config(format!("configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load and merge without validating credentials; used by `config show`
    /// so an unconfigured machine can still inspect the effective values.
    pub fn load_unvalidated(path: Option<&Path>) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        let file = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);
        if file.exists() {
            figment = figment.merge(Toml::file(&file));
        }
        figment = figment.merge(Env::prefixed("NEWSLOOM_").split('_').lowercase(true));

        figment
            .extract()
            .map_err(|e| LoomError::Config(format!("configuration error: {}", e)))
    }

    /// Default config file path (working directory)
    pub fn default_config_path() -> PathBuf {
        PathBuf::from("newsloom.toml")
    }

    /// Show current effective configuration (secrets are never serialized)
    pub fn show_config(path: Option<&Path>, as_json: bool) -> Result<()> {
        let config = Self::load_unvalidated(path)?;

        if as_json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(&config).map_err(|e| LoomError::Config(e.to_string()))?
            );
        }

        Ok(())
    }

    /// Write a starter config file
    pub fn init(path: Option<&Path>, force: bool) -> Result<PathBuf> {
        let file = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        if file.exists() && !force {
            return Err(LoomError::Config(format!(
                "config file exists: {} (use --force to overwrite)",
                file.display()
            )));
        }

        fs::write(&file, Self::default_config_template())?;
        Ok(file)
    }

    /// Generate default config content (TOML)
    fn default_config_template() -> String {
        r#"# Newsloom Configuration
# Credentials may also come from GEMINI_API_KEY, UNSPLASH_ACCESS_KEY,
# GMAIL_USER, and GMAIL_APP_PASSWORD environment variables.

version = "1.0"

# "daily" looks back 3 days, "weekly" 7
profile = "daily"

[pipeline]
topics_per_category = 2
toc = true
tooltips = true
unified_subject = true

[llm]
model = "gemini-3-flash-preview"
timeout_secs = 120
pacing_secs = 5

[mail]
smtp_host = "smtp.gmail.com"

[history]
path = "history.json"
"#
        .to_string()
    }
}
