//! Shared Types
//!
//! Domain types and the unified error taxonomy used across the pipeline.

pub mod error;
pub mod item;

pub use error::{LoomError, Result};
pub use item::{CandidateItem, Category, HistoryEntry};
