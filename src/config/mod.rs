//! Configuration
//!
//! Declarative configuration with defaults, file, and environment merging.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    Config, FeedsConfig, HistoryConfig, ImageConfig, LlmConfig, MailConfig, PipelineConfig,
    Profile,
};
