// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `RepoPulse` Collect
//!
//! The collection pipeline: two independently ticking pollers feed typed
//! [`repopulse_core::Metric`] events through a single-slot channel into a
//! print or time-series sink, under a cooperative shutdown protocol owned by
//! the [`Pipeline`] orchestrator.
//!
//! The channel holds a single event: a producer blocks until the sink has
//! consumed the previous one, so the sink's processing latency directly
//! throttles the pollers.

pub mod config;
pub mod error;
mod poller;
pub mod pipeline;
mod sink;

pub use config::{CollectorConfig, OutputFormat};
pub use error::{PipelineError, SinkError};
pub use pipeline::Pipeline;
