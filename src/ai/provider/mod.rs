//! Generative Text Provider Abstraction
//!
//! Defines the `TextGenerator` trait the pipeline drafts against, plus the
//! pacing decorator that enforces a minimum interval between consecutive
//! calls. Drafting stages are textually dependent on one another, so callers
//! always await one generation before issuing the next; there is no retry
//! loop at this layer.

mod gemini;

pub use gemini::GeminiProvider;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::types::Result;

/// Shared generator handle passed into each pipeline stage
pub type SharedGenerator = Arc<dyn TextGenerator>;

/// Generative text service the authoring protocol runs against.
///
/// A failed call surfaces as `LoomError::Generation`; whether that aborts the
/// category or degrades to a fallback is the caller's decision.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate free-form text for a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

// =============================================================================
// Pacing Decorator
// =============================================================================

/// Enforces a minimum interval between consecutive generate calls.
///
/// Rate limiting toward the service is a fixed inter-call delay, not
/// token-bucket or backoff. The first call goes through immediately.
pub struct PacedGenerator {
    inner: SharedGenerator,
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl PacedGenerator {
    pub fn new(inner: SharedGenerator, min_interval: Duration) -> Self {
        Self {
            inner,
            min_interval,
            last_call: Mutex::new(None),
        }
    }
}

#[async_trait]
impl TextGenerator for PacedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        {
            let mut last = self.last_call.lock().await;
            if let Some(previous) = *last {
                let elapsed = previous.elapsed();
                if elapsed < self.min_interval {
                    let wait = self.min_interval - elapsed;
                    debug!("Pacing generate call: waiting {:?}", wait);
                    tokio::time::sleep(wait).await;
                }
            }
            *last = Some(Instant::now());
        }

        self.inner.generate(prompt).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
