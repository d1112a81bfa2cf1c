//! Collector configuration.

use std::time::Duration;

use repopulse_core::ReleaseFilter;
use repopulse_fetch::Credentials;
use repopulse_influx::InfluxConfig;

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com/repos";

fn default_interval() -> Duration {
    Duration::from_secs(300)
}

fn default_flush_interval() -> Duration {
    Duration::from_secs(10)
}

/// Which sink consumes the metric stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One JSON document per metric.
    #[default]
    Json,
    /// Delimited text, one line per record.
    Csv,
    /// InfluxDB line protocol, batched to the configured destination.
    Influx,
}

/// Configuration for one collector run.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Owning organization.
    pub org: String,
    /// Repository name.
    pub repo: String,
    /// API base URL, without a trailing slash.
    pub api_url: String,
    /// Optional basic-auth credentials passed through to the API.
    pub credentials: Option<Credentials>,
    /// Disable TLS certificate verification.
    pub insecure: bool,
    /// Poll interval.
    pub interval: Duration,
    /// Run a single poll pass and exit.
    pub once: bool,
    /// Selected sink.
    pub output: OutputFormat,
    /// Separator for delimited output.
    pub csv_separator: String,
    /// Force the print sink even when a time-series destination is
    /// configured.
    pub preview: bool,
    /// Release filtering and grouping options.
    pub filter: ReleaseFilter,
    /// Time-series destination, required when `output` is
    /// [`OutputFormat::Influx`] and `preview` is off.
    pub influx: Option<InfluxConfig>,
    /// Wall-clock flush interval for the time-series sender.
    pub flush_interval: Duration,
    /// Point count that triggers an immediate batch write.
    pub batch_size: usize,
}

impl CollectorConfig {
    /// Creates a configuration with defaults for everything but the
    /// repository identity.
    pub fn new(org: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            repo: repo.into(),
            api_url: DEFAULT_API_URL.to_string(),
            credentials: None,
            insecure: false,
            interval: default_interval(),
            once: false,
            output: OutputFormat::default(),
            csv_separator: ";".to_string(),
            preview: false,
            filter: ReleaseFilter::default(),
            influx: None,
            flush_interval: default_flush_interval(),
            batch_size: 20,
        }
    }
}
