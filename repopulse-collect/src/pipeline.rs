//! Pipeline orchestration and the shutdown protocol.
//!
//! The [`Pipeline`] wires the two pollers and the sink together around a
//! single-slot metric channel and reacts to three shutdown triggers:
//!
//! - both pollers finished naturally: the channel closes, the sink drains
//!   to end-of-input, normal completion;
//! - the sink failed first: stop signals fan out to the pollers and the
//!   run aborts without waiting for them;
//! - an external interrupt: stop signals fan out, but the sink still
//!   drains whatever is in flight.
//!
//! Stop channels are allocated before the pollers start and the registry is
//! never touched afterwards except by the shutdown fan-out.

use std::future::Future;
use std::sync::Arc;

use repopulse_core::Metric;
use repopulse_fetch::HttpClient;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::CollectorConfig;
use crate::error::{PipelineError, SinkError};
use crate::poller::{ReleasePoller, RepoPoller};
use crate::sink;

/// Capacity of the shared metric channel. A single slot makes every producer
/// block until the sink has consumed the previous event.
const CHANNEL_CAPACITY: usize = 1;

/// The collection pipeline.
pub struct Pipeline {
    config: Arc<CollectorConfig>,
    readers: Vec<watch::Sender<bool>>,
}

impl Pipeline {
    /// Creates a pipeline for the given configuration.
    pub fn new(config: CollectorConfig) -> Self {
        Self {
            config: Arc::new(config),
            readers: Vec::new(),
        }
    }

    /// Runs the pipeline to completion.
    ///
    /// `interrupt` resolves on external interruption (Ctrl-C in the CLI);
    /// the pipeline then cancels the pollers and lets the sink drain.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Sink`] when the sink failed (the run is
    /// aborted) and [`PipelineError::Fetch`] when the HTTP client cannot be
    /// built.
    pub async fn run(mut self, interrupt: impl Future<Output = ()>) -> Result<(), PipelineError> {
        let (tx, rx) = mpsc::channel::<Metric>(CHANNEL_CAPACITY);
        let client = Arc::new(HttpClient::new(self.config.insecure)?);

        let repo_stop = self.register_reader();
        let release_stop = self.register_reader();

        let repo = RepoPoller::new(
            Arc::clone(&client),
            Arc::clone(&self.config),
            tx.clone(),
        );
        let release = ReleasePoller::new(client, Arc::clone(&self.config), tx);

        let repo_handle = tokio::spawn(repo.run(repo_stop));
        let release_handle = tokio::spawn(release.run(release_stop));
        let sink_handle = tokio::spawn(sink::run_sink(Arc::clone(&self.config), rx));

        // Once both poller tasks (and any fire-and-forget polls they
        // spawned) have dropped their channel senders, the sink observes
        // end-of-input.
        let producers = async move {
            let _ = repo_handle.await;
            let _ = release_handle.await;
        };

        self.supervise(producers, sink_handle, interrupt).await
    }

    /// Allocates a stop channel for a long-running producer and records its
    /// sender for the shutdown fan-out.
    fn register_reader(&mut self) -> watch::Receiver<bool> {
        let (tx, rx) = watch::channel(false);
        self.readers.push(tx);
        rx
    }

    /// Signals every registered stop channel and clears the registry.
    ///
    /// Sends are best-effort: a producer that already exited has dropped its
    /// receiver and is skipped.
    fn close_readers(&mut self) {
        for reader in self.readers.drain(..) {
            let _ = reader.send(true);
        }
    }

    /// The shutdown state machine.
    async fn supervise(
        mut self,
        producers: impl Future<Output = ()>,
        sink: JoinHandle<Result<(), SinkError>>,
        interrupt: impl Future<Output = ()>,
    ) -> Result<(), PipelineError> {
        tokio::pin!(producers);
        tokio::pin!(interrupt);
        let mut sink = sink;

        tokio::select! {
            () = &mut producers => {
                debug!("all pollers finished, draining sink");
                self.close_readers();
                finish_sink(sink).await
            }
            result = &mut sink => {
                self.close_readers();
                match sink_result(result) {
                    // The sink can only finish cleanly once the channel
                    // closed, i.e. the pollers beat us to completion.
                    Ok(()) => Ok(()),
                    Err(e) => {
                        error!(error = %e, "sink failed, aborting");
                        Err(e)
                    }
                }
            }
            () = &mut interrupt => {
                info!("interrupt received, shutting down");
                self.close_readers();
                finish_sink(sink).await
            }
        }
    }
}

/// Waits for the sink to drain and maps its outcome.
async fn finish_sink(sink: JoinHandle<Result<(), SinkError>>) -> Result<(), PipelineError> {
    sink_result(sink.await)
}

fn sink_result(
    result: Result<Result<(), SinkError>, tokio::task::JoinError>,
) -> Result<(), PipelineError> {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(PipelineError::Sink(e)),
        Err(_) => Err(PipelineError::SinkPanicked),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use repopulse_core::RepoStats;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::timeout;

    fn pipeline() -> Pipeline {
        Pipeline::new(CollectorConfig::new("acme", "widget"))
    }

    fn metric() -> Metric {
        Metric::Repo(RepoStats::default())
    }

    /// A producer that sends `count` metrics and exits, dropping its sender.
    fn producer(tx: mpsc::Sender<Metric>, count: usize) -> JoinHandle<()> {
        tokio::spawn(async move {
            for _ in 0..count {
                if tx.send(metric()).await.is_err() {
                    return;
                }
            }
        })
    }

    /// A sink that counts received metrics and end-of-input observations.
    fn counting_sink(
        mut rx: mpsc::Receiver<Metric>,
        received: Arc<AtomicUsize>,
        ends: Arc<AtomicUsize>,
    ) -> JoinHandle<Result<(), SinkError>> {
        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                let _ = received.fetch_add(1, Ordering::SeqCst);
            }
            let _ = ends.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[tokio::test]
    async fn test_normal_completion_closes_channel_and_drains_sink() {
        let mut pipeline = pipeline();
        let _stop_a = pipeline.register_reader();
        let _stop_b = pipeline.register_reader();

        let (tx, rx) = mpsc::channel::<Metric>(1);
        let received = Arc::new(AtomicUsize::new(0));
        let ends = Arc::new(AtomicUsize::new(0));

        let a = producer(tx.clone(), 3);
        let b = producer(tx, 2);
        let producers = async move {
            let _ = a.await;
            let _ = b.await;
        };

        let sink = counting_sink(rx, Arc::clone(&received), Arc::clone(&ends));

        let result = timeout(
            Duration::from_secs(5),
            pipeline.supervise(producers, sink, std::future::pending()),
        )
        .await
        .expect("supervise should finish");

        assert!(result.is_ok());
        assert_eq!(received.load(Ordering::SeqCst), 5);
        assert_eq!(ends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sink_failure_aborts_and_cancels_producers() {
        let mut pipeline = pipeline();
        let mut stop = pipeline.register_reader();

        // A producer that only exits when its stop channel fires.
        let stopped = Arc::new(AtomicUsize::new(0));
        let observed = Arc::clone(&stopped);
        let producer = tokio::spawn(async move {
            let _ = stop.changed().await;
            let _ = observed.fetch_add(1, Ordering::SeqCst);
        });

        let producers = std::future::pending();
        let sink: JoinHandle<Result<(), SinkError>> =
            tokio::spawn(async { Err(SinkError::ConnectionLost) });

        let result = timeout(
            Duration::from_secs(5),
            pipeline.supervise(producers, sink, std::future::pending()),
        )
        .await
        .expect("abort must not wait for producers");

        assert!(matches!(
            result,
            Err(PipelineError::Sink(SinkError::ConnectionLost))
        ));

        timeout(Duration::from_secs(5), producer)
            .await
            .expect("producer should observe the stop signal")
            .unwrap();
        assert_eq!(stopped.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_clean_sink_exit_is_not_an_abort() {
        let pipeline = pipeline();

        // Sink finishing cleanly can race the producers-done branch; the
        // outcome must still be success.
        let producers = std::future::pending();
        let sink: JoinHandle<Result<(), SinkError>> = tokio::spawn(async { Ok(()) });

        let result = timeout(
            Duration::from_secs(5),
            pipeline.supervise(producers, sink, std::future::pending()),
        )
        .await
        .expect("supervise should finish");

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_interrupt_cancels_producers_and_drains_sink() {
        let mut pipeline = pipeline();
        let mut stop = pipeline.register_reader();

        let (tx, rx) = mpsc::channel::<Metric>(1);
        let received = Arc::new(AtomicUsize::new(0));
        let ends = Arc::new(AtomicUsize::new(0));

        // Sends until stopped, then drops the sender so the sink can drain.
        let producer = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = stop.changed() => return,
                    sent = tx.send(metric()) => {
                        if sent.is_err() {
                            return;
                        }
                    }
                }
            }
        });

        let sink = counting_sink(rx, Arc::clone(&received), Arc::clone(&ends));

        let producers = async move {
            let _ = producer.await;
        };

        let result = timeout(
            Duration::from_secs(5),
            pipeline.supervise(producers, sink, std::future::ready(())),
        )
        .await
        .expect("interrupt path should finish");

        assert!(result.is_ok());
        assert_eq!(ends.load(Ordering::SeqCst), 1, "sink drained to end-of-input");
    }

    #[tokio::test]
    async fn test_close_readers_signals_every_registered_channel() {
        let mut pipeline = pipeline();
        let stop_a = pipeline.register_reader();
        let stop_b = pipeline.register_reader();

        pipeline.close_readers();

        assert!(*stop_a.borrow());
        assert!(*stop_b.borrow());
        assert!(pipeline.readers.is_empty());
    }

    #[tokio::test]
    async fn test_close_readers_skips_exited_producers() {
        let mut pipeline = pipeline();
        let stop_a = pipeline.register_reader();
        let stop_b = pipeline.register_reader();
        drop(stop_b); // producer already exited

        pipeline.close_readers();
        assert!(*stop_a.borrow());
    }
}
