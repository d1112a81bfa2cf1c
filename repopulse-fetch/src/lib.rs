// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `RepoPulse` Fetch
//!
//! HTTP JSON fetching for the `RepoPulse` pollers.
//!
//! [`HttpClient::get_json`] performs a GET with optional basic auth, decodes
//! the JSON body into a caller-supplied type, and extracts the next-page URL
//! from the `Link` response header, returning both as a [`Page`].

pub mod client;
pub mod error;
mod link;

pub use client::{Credentials, HttpClient, Page};
pub use error::FetchError;
