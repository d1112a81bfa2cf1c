//! Repository and release pollers.
//!
//! Both pollers poll once immediately, then (unless single-shot mode is on)
//! repeat on a fixed-interval ticker until their stop channel fires. Each
//! tick spawns the poll as a fire-and-forget task so a slow fetch never
//! delays the next tick. Fetch errors are logged and emit nothing; the loop
//! carries on.

use std::future::Future;
use std::sync::Arc;

use repopulse_core::{aggregate, Metric, RawRelease, RepoStats};
use repopulse_fetch::{FetchError, HttpClient, Page};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use crate::config::CollectorConfig;

// ============================================================================
// Repo poller
// ============================================================================

/// Emits one repository snapshot per poll tick.
#[derive(Clone)]
pub(crate) struct RepoPoller {
    client: Arc<HttpClient>,
    config: Arc<CollectorConfig>,
    tx: mpsc::Sender<Metric>,
}

impl RepoPoller {
    pub(crate) fn new(
        client: Arc<HttpClient>,
        config: Arc<CollectorConfig>,
        tx: mpsc::Sender<Metric>,
    ) -> Self {
        Self { client, config, tx }
    }

    /// Polls once, then on the configured interval until `stop` fires.
    pub(crate) async fn run(self, mut stop: watch::Receiver<bool>) {
        self.poll().await;

        if self.config.once {
            return;
        }

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.tick().await; // the first tick completes immediately

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    debug!("tick: polling repository");
                    let poller = self.clone();
                    let _ = tokio::spawn(async move { poller.poll().await });
                }
                _ = stop.changed() => return,
            }
        }
    }

    async fn poll(&self) {
        let url = format!(
            "{}/{}/{}",
            self.config.api_url, self.config.org, self.config.repo
        );
        info!(url = %url, "fetching repository data");

        match self
            .client
            .get_json::<RepoStats>(&url, self.config.credentials.as_ref())
            .await
        {
            Ok(page) => {
                let stats = page.body.tagged(&self.config.org, &self.config.repo);
                let _ = self.tx.send(Metric::Repo(stats)).await;
            }
            Err(error) => error!(error = %error, url = %url, "repository fetch failed"),
        }
    }
}

// ============================================================================
// Release poller
// ============================================================================

/// Follows release pagination, aggregates, and emits one event per merged
/// release.
#[derive(Clone)]
pub(crate) struct ReleasePoller {
    client: Arc<HttpClient>,
    config: Arc<CollectorConfig>,
    tx: mpsc::Sender<Metric>,
}

impl ReleasePoller {
    pub(crate) fn new(
        client: Arc<HttpClient>,
        config: Arc<CollectorConfig>,
        tx: mpsc::Sender<Metric>,
    ) -> Self {
        Self { client, config, tx }
    }

    /// Polls once, then on the configured interval until `stop` fires.
    ///
    /// Spawned per-tick polls receive a clone of the same stop receiver, so
    /// an in-flight pagination walk observes shutdown without any new
    /// registration.
    pub(crate) async fn run(self, mut stop: watch::Receiver<bool>) {
        self.poll(stop.clone()).await;

        if self.config.once {
            return;
        }

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    debug!("tick: polling releases");
                    let poller = self.clone();
                    let poll_stop = stop.clone();
                    let _ = tokio::spawn(async move { poller.poll(poll_stop).await });
                }
                _ = stop.changed() => return,
            }
        }
    }

    async fn poll(&self, stop: watch::Receiver<bool>) {
        let first = format!(
            "{}/{}/{}/releases",
            self.config.api_url, self.config.org, self.config.repo
        );
        info!(url = %first, "fetching release data");

        let fetched = follow_pages(first, &stop, |url| async move {
            self.client
                .get_json::<Vec<RawRelease>>(&url, self.config.credentials.as_ref())
                .await
        })
        .await;

        let Some(raw) = fetched else {
            return;
        };

        let reports = aggregate(raw, &self.config.filter, &self.config.org, &self.config.repo);
        debug!(count = reports.len(), "aggregated releases");

        for report in reports {
            if self.tx.send(Metric::Release(report)).await.is_err() {
                return;
            }
        }
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// Follows pagination from `start`, accumulating releases in page order.
///
/// The stop signal is checked before every fetch, so a stop that fires while
/// a next-page URL is queued aborts without fetching it. Returns `None` when
/// the walk was cancelled; partial data is abandoned, not aggregated. A
/// fetch error ends pagination early; the pages accumulated so far are still
/// returned.
async fn follow_pages<F, Fut>(
    start: String,
    stop: &watch::Receiver<bool>,
    mut fetch: F,
) -> Option<Vec<RawRelease>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Page<Vec<RawRelease>>, FetchError>>,
{
    let mut queue = Some(start);
    let mut accumulated = Vec::new();

    while let Some(url) = queue.take() {
        if *stop.borrow() {
            debug!("release poll cancelled mid-pagination");
            return None;
        }

        match fetch(url).await {
            Ok(page) => {
                accumulated.extend(page.body);
                queue = page.next;
            }
            Err(error) => {
                error!(error = %error, "release page fetch failed");
            }
        }
    }

    if *stop.borrow() {
        return None;
    }
    Some(accumulated)
}

// ============================================================================
// Tests
// ============================================================================
