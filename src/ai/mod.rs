//! Generative Service Layer
//!
//! Provider abstraction, call pacing, and output scrubbing.

pub mod provider;
pub mod validation;

pub use provider::{GeminiProvider, PacedGenerator, SharedGenerator, TextGenerator};
pub use validation::{extract_json, strip_code_fences};
