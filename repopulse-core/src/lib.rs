// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `RepoPulse` Core
//!
//! Core models and pure transformations for the `RepoPulse` collector.
//!
//! This crate provides the foundational types used across all other
//! `RepoPulse` crates:
//!
//! - Domain models ([`RepoStats`], [`RawRelease`], [`ReleaseReport`])
//! - The [`Metric`] event that flows from the pollers to the sink, with its
//!   three render capabilities (JSON, delimited text, time-series points)
//! - The time-series [`Point`] type and its InfluxDB line protocol encoding
//! - The pure release [`aggregate`] transformation (filter, truncate,
//!   group, merge)
//! - Error types

pub mod aggregate;
pub mod error;
pub mod metric;
pub mod models;
pub mod point;

pub use aggregate::{aggregate, truncate_components, ReleaseFilter};
pub use error::CoreError;
pub use metric::{Metric, RenderContext};
pub use models::{RawRelease, ReleaseAsset, ReleaseReport, RepoStats};
pub use point::{FieldValue, Point};
