//! Sinks: the print loop and the batched time-series sender.
//!
//! The sink is the single consumer of the shared metric channel. Print mode
//! drains until end-of-input, rendering each event through exactly one of
//! the metric's render capabilities. Influx mode buffers points and flushes
//! on a wall-clock ticker, on reaching the batch size, and once at
//! end-of-input; any write failure or a lost connection stops the sender,
//! which the orchestrator observes as an abort.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use repopulse_core::{Metric, Point, RenderContext};
use repopulse_influx::{InfluxClient, InfluxError};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::config::{CollectorConfig, OutputFormat};
use crate::error::SinkError;

/// How often the connectivity watchdog re-checks the destination.
const CONNECTIVITY_INTERVAL: Duration = Duration::from_secs(3600);

/// Write attempts per batch. There is no retry policy beyond this; the next
/// scheduled poll is the only retry.
const WRITE_ATTEMPTS: u32 = 1;

// ============================================================================
// Dispatch
// ============================================================================

/// Runs the sink selected by the configuration until end-of-input or
/// failure.
pub(crate) async fn run_sink(
    config: Arc<CollectorConfig>,
    rx: mpsc::Receiver<Metric>,
) -> Result<(), SinkError> {
    match config.output {
        OutputFormat::Json | OutputFormat::Csv => print_loop(&config, rx).await,
        OutputFormat::Influx if config.preview => print_loop(&config, rx).await,
        OutputFormat::Influx => {
            let destination = config.influx.clone().ok_or(SinkError::MissingDestination)?;
            let client = InfluxClient::new(destination)?;
            client.ping().await?;
            info!("connected to time-series destination");

            let lost = client.watch_connectivity(CONNECTIVITY_INTERVAL);
            send_loop(
                rx,
                client,
                lost,
                config.flush_interval,
                config.batch_size,
            )
            .await
        }
    }
}

// ============================================================================
// Print sink
// ============================================================================

async fn print_loop(
    config: &CollectorConfig,
    mut rx: mpsc::Receiver<Metric>,
) -> Result<(), SinkError> {
    let ctx = RenderContext::new(config.csv_separator.clone());

    while let Some(metric) = rx.recv().await {
        match config.output {
            OutputFormat::Json => println!("{}", metric.render_json()?),
            OutputFormat::Csv => println!("{}", metric.render_delimited(&ctx)),
            OutputFormat::Influx => {
                for point in metric.to_points() {
                    println!("{}", point.to_line_protocol());
                }
            }
        }
    }

    debug!("input drained, print sink finished");
    Ok(())
}

// ============================================================================
// Time-series sender
// ============================================================================

/// Batch write seam, mockable in tests.
#[async_trait]
pub(crate) trait BatchWriter: Send + Sync {
    async fn write(&self, points: &[Point]) -> Result<(), InfluxError>;
}

#[async_trait]
impl BatchWriter for InfluxClient {
    async fn write(&self, points: &[Point]) -> Result<(), InfluxError> {
        self.write_batch(points, WRITE_ATTEMPTS).await
    }
}

/// Drains the metric channel into batched point writes.
///
/// Wakes on three sources: the connectivity watchdog (fatal), the flush
/// ticker (write a non-empty buffer), and metric arrival (buffer, write when
/// the batch size is reached, final flush at end-of-input).
pub(crate) async fn send_loop<W: BatchWriter>(
    mut rx: mpsc::Receiver<Metric>,
    writer: W,
    mut lost: mpsc::Receiver<()>,
    flush_interval: Duration,
    batch_size: usize,
) -> Result<(), SinkError> {
    let mut buffer: Vec<Point> = Vec::new();
    let mut ticker = tokio::time::interval(flush_interval);
    ticker.tick().await; // the first tick completes immediately

    loop {
        tokio::select! {
            Some(()) = lost.recv() => {
                error!(buffered = buffer.len(), "connection lost, discarding buffered points");
                return Err(SinkError::ConnectionLost);
            }
            _ = ticker.tick() => {
                if !buffer.is_empty() {
                    debug!(count = buffer.len(), "flush tick");
                    writer.write(&buffer).await?;
                    buffer.clear();
                }
            }
            metric = rx.recv() => match metric {
                Some(metric) => {
                    buffer.extend(metric.to_points());
                    if buffer.len() >= batch_size {
                        debug!(count = buffer.len(), "batch full");
                        writer.write(&buffer).await?;
                        buffer.clear();
                    }
                }
                None => {
                    if !buffer.is_empty() {
                        debug!(count = buffer.len(), "final flush");
                        writer.write(&buffer).await?;
                    }
                    debug!("input drained, sender finished");
                    return Ok(());
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
