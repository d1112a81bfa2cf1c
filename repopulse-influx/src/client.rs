//! InfluxDB v1 HTTP client.

use std::time::Duration;

use repopulse_core::Point;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::InfluxError;

/// Connection settings for an InfluxDB v1 destination.
#[derive(Debug, Clone)]
pub struct InfluxConfig {
    /// Endpoint, e.g. `http://localhost:8086`.
    pub url: String,
    /// Database name.
    pub database: String,
    /// Optional user name for basic auth.
    pub username: Option<String>,
    /// Optional password for basic auth.
    pub password: Option<String>,
}

/// Client for ping and batched line-protocol writes.
#[derive(Debug, Clone)]
pub struct InfluxClient {
    http: reqwest::Client,
    config: InfluxConfig,
}

impl InfluxClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns [`InfluxError::Build`] when the underlying HTTP client cannot
    /// be constructed.
    pub fn new(config: InfluxConfig) -> Result<Self, InfluxError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("repopulse/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(InfluxError::Build)?;

        Ok(Self { http, config })
    }

    /// Checks connectivity via the `/ping` endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`InfluxError::Http`] on transport failure or
    /// [`InfluxError::Status`] on a non-success response.
    pub async fn ping(&self) -> Result<(), InfluxError> {
        let url = format!("{}/ping", self.config.url.trim_end_matches('/'));
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(InfluxError::Status {
                status: status.as_u16(),
            })
        }
    }

    /// Writes a batch of points, trying up to `attempts` times without
    /// backoff.
    ///
    /// # Errors
    ///
    /// Returns [`InfluxError::WriteFailed`] once every attempt has failed.
    pub async fn write_batch(&self, points: &[Point], attempts: u32) -> Result<(), InfluxError> {
        let url = format!("{}/write", self.config.url.trim_end_matches('/'));
        let body = batch_body(points);

        for attempt in 1..=attempts.max(1) {
            debug!(attempt, count = points.len(), "writing batch");

            let mut request = self
                .http
                .post(&url)
                .query(&[("db", self.config.database.as_str())])
                .body(body.clone());
            if let Some(user) = &self.config.username {
                request = request.basic_auth(user, self.config.password.as_deref());
            }

            match request.send().await {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => {
                    warn!(status = %response.status(), attempt, "batch write rejected");
                }
                Err(error) => {
                    warn!(error = %error, attempt, "batch write failed");
                }
            }
        }

        Err(InfluxError::WriteFailed {
            attempts: attempts.max(1),
        })
    }

    /// Spawns a connectivity watchdog pinging at `interval`.
    ///
    /// The returned channel yields exactly one message when the connection is
    /// lost; the watchdog exits once it has reported, or as soon as the
    /// receiver is dropped.
    pub fn watch_connectivity(&self, interval: Duration) -> mpsc::Receiver<()> {
        let (tx, rx) = mpsc::channel(1);
        let client = self.clone();

        let _ = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // interval yields immediately; the first real check comes one
            // period after startup.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(error) = client.ping().await {
                            warn!(error = %error, "connectivity check failed");
                            let _ = tx.send(()).await;
                            return;
                        }
                        debug!("connectivity check passed");
                    }
                    () = tx.closed() => return,
                }
            }
        });

        rx
    }
}

/// Joins points into one newline-separated line protocol body.
fn batch_body(points: &[Point]) -> String {
    points
        .iter()
        .map(Point::to_line_protocol)
        .collect::<Vec<_>>()
        .join("\n")
}
