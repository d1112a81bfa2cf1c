//! Core error types for `RepoPulse`.

use thiserror::Error;

/// Core error type for `RepoPulse` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid asset name filter pattern.
    #[error("invalid asset filter pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
