//! Influx error types.

use thiserror::Error;

/// Error type for InfluxDB operations.
#[derive(Debug, Error)]
pub enum InfluxError {
    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The database answered with a non-success status.
    #[error("unexpected status {status} from InfluxDB")]
    Status {
        /// Response status code.
        status: u16,
    },

    /// All write attempts for a batch failed.
    #[error("batch write failed after {attempts} attempt(s)")]
    WriteFailed {
        /// Number of attempts made.
        attempts: u32,
    },

    /// Client construction failed.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}
