//! Error types for fieldscore-core.
//!
//! Scoring itself cannot fail. Errors only arise while turning raw text into a
//! [`Value`](crate::Value) tree.

use thiserror::Error;

/// Errors that can occur while preparing inputs for scoring.
#[derive(Error, Debug)]
pub enum ScoreError {
    /// The input string was not valid JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Convenience alias used throughout fieldscore-core.
pub type Result<T> = std::result::Result<T, ScoreError>;
