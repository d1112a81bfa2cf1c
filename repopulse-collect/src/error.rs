//! Pipeline and sink error types.

use repopulse_core::CoreError;
use repopulse_fetch::FetchError;
use repopulse_influx::InfluxError;
use thiserror::Error;

/// Error type for sink execution.
///
/// Any sink error is fatal for the run; the orchestrator reacts by
/// cancelling the pollers.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Rendering a metric failed.
    #[error("render error: {0}")]
    Render(#[from] CoreError),

    /// Time-series destination error.
    #[error(transparent)]
    Influx(#[from] InfluxError),

    /// The connectivity watchdog reported a lost connection.
    #[error("time-series connection lost")]
    ConnectionLost,

    /// Influx output was selected without destination settings.
    #[error("no time-series destination configured")]
    MissingDestination,
}

/// Error type for a collector run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// HTTP client construction failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The sink failed; the run was aborted.
    #[error("sink failed: {0}")]
    Sink(#[from] SinkError),

    /// The sink task panicked.
    #[error("sink task panicked")]
    SinkPanicked,
}
