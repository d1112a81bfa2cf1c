// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `RepoPulse` Influx
//!
//! InfluxDB v1 client used by the time-series sink: a `ping` connectivity
//! check, batched line-protocol writes over HTTP with a bounded attempt
//! count, and a background connectivity watchdog that reports loss over a
//! channel.

pub mod client;
pub mod error;

pub use client::{InfluxClient, InfluxConfig};
pub use error::InfluxError;
