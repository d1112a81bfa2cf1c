// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! RepoPulse CLI - periodic repository metrics collection.
//!
//! # Examples
//!
//! ```bash
//! # One JSON pass over a repository
//! repopulse --org acme --repo widget --once
//!
//! # CSV output, collapsing hotfix tags into their minor version
//! repopulse --org acme --repo widget --output csv --minor --once
//!
//! # Continuous collection into InfluxDB
//! repopulse --org acme --repo widget --output influx \
//!     --influx-url http://localhost:8086 --influx-database metrics
//!
//! # Preview the line protocol without writing
//! repopulse --org acme --repo widget --output influx --preview --once
//! ```

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use repopulse_collect::{config::DEFAULT_API_URL, CollectorConfig, OutputFormat, Pipeline};
use repopulse_core::ReleaseFilter;
use repopulse_fetch::Credentials;
use repopulse_influx::InfluxConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// RepoPulse - periodic repository metrics collection.
#[derive(Parser)]
#[command(name = "repopulse")]
#[command(about = "Collects repository and release metrics into JSON, CSV, or InfluxDB")]
#[command(version)]
#[command(author = "RepoPulse Contributors")]
struct Cli {
    /// Organization that owns the repository.
    #[arg(long, short = 'o')]
    org: String,

    /// Repository name.
    #[arg(long, short = 'r')]
    repo: String,

    /// API base URL.
    #[arg(long, default_value = DEFAULT_API_URL)]
    url: String,

    /// API user for basic auth.
    #[arg(long)]
    user: Option<String>,

    /// API token for basic auth.
    #[arg(long, requires = "user")]
    token: Option<String>,

    /// Skip TLS certificate verification.
    #[arg(long)]
    insecure: bool,

    /// Poll interval in seconds.
    #[arg(long, default_value_t = 300)]
    interval: u64,

    /// Run a single poll pass and exit.
    #[arg(long)]
    once: bool,

    /// Output format.
    #[arg(long, short = 'f', value_enum, default_value_t = Output::Json)]
    output: Output,

    /// Separator for CSV output.
    #[arg(long, default_value = ";")]
    csv_separator: String,

    /// Include prereleases.
    #[arg(long)]
    prerelease: bool,

    /// Collapse release names to major.minor.patch before grouping.
    #[arg(long)]
    patch: bool,

    /// Collapse release names to major.minor before grouping.
    #[arg(long)]
    minor: bool,

    /// Keep only assets whose name matches this pattern.
    #[arg(long = "match", value_name = "REGEX")]
    match_pattern: Option<String>,

    /// InfluxDB endpoint, e.g. http://localhost:8086.
    #[arg(long)]
    influx_url: Option<String>,

    /// InfluxDB database name.
    #[arg(long)]
    influx_database: Option<String>,

    /// InfluxDB user.
    #[arg(long)]
    influx_user: Option<String>,

    /// InfluxDB password.
    #[arg(long)]
    influx_password: Option<String>,

    /// Flush interval for the InfluxDB sender, in seconds.
    #[arg(long, default_value_t = 10)]
    flush: u64,

    /// Point count that triggers an immediate batch write.
    #[arg(long, default_value_t = 20)]
    batch: usize,

    /// Print instead of writing to the time-series destination.
    #[arg(long)]
    preview: bool,

    /// Verbose output (show debug info).
    #[arg(long, short)]
    verbose: bool,

    /// Quiet mode (no logging).
    #[arg(long, short)]
    quiet: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
enum Output {
    /// One JSON document per metric.
    #[default]
    Json,
    /// Delimited text, one line per record.
    Csv,
    /// InfluxDB line protocol to the configured destination.
    Influx,
}

impl From<Output> for OutputFormat {
    fn from(output: Output) -> Self {
        match output {
            Output::Json => Self::Json,
            Output::Csv => Self::Csv,
            Output::Influx => Self::Influx,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("repopulse_collect=debug,repopulse_fetch=debug,repopulse_influx=debug,info")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Config assembly
// ============================================================================

fn build_config(cli: &Cli) -> Result<CollectorConfig> {
    let mut filter = ReleaseFilter {
        include_prerelease: cli.prerelease,
        truncate_patch: cli.patch,
        truncate_minor: cli.minor,
        asset_match: None,
    };
    if let Some(pattern) = &cli.match_pattern {
        filter = filter
            .with_asset_pattern(pattern)
            .with_context(|| format!("invalid --match pattern '{pattern}'"))?;
    }

    let influx = match (&cli.influx_url, &cli.influx_database) {
        (Some(url), Some(database)) => Some(InfluxConfig {
            url: url.clone(),
            database: database.clone(),
            username: cli.influx_user.clone(),
            password: cli.influx_password.clone(),
        }),
        _ => None,
    };

    if cli.output == Output::Influx && !cli.preview && influx.is_none() {
        bail!("--output influx requires --influx-url and --influx-database (or --preview)");
    }

    let mut config = CollectorConfig::new(cli.org.clone(), cli.repo.clone());
    config.api_url = cli.url.trim_end_matches('/').to_string();
    config.credentials = cli.user.clone().map(|user| Credentials {
        user,
        token: cli.token.clone().unwrap_or_default(),
    });
    config.insecure = cli.insecure;
    config.interval = Duration::from_secs(cli.interval.max(1));
    config.once = cli.once;
    config.output = cli.output.into();
    config.csv_separator = cli.csv_separator.clone();
    config.preview = cli.preview;
    config.filter = filter;
    config.influx = influx;
    config.flush_interval = Duration::from_secs(cli.flush.max(1));
    config.batch_size = cli.batch.max(1);

    Ok(config)
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let pipeline = Pipeline::new(config);

    let interrupt = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    if let Err(e) = pipeline.run(interrupt).await {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(1);
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut full = vec!["repopulse", "--org", "acme", "--repo", "widget"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).expect("args should parse")
    }

    #[test]
    fn test_minimal_args() {
        let config = build_config(&parse(&[])).unwrap();
        assert_eq!(config.org, "acme");
        assert_eq!(config.repo, "widget");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.output, OutputFormat::Json);
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_trailing_slash_trimmed_from_url() {
        let config = build_config(&parse(&["--url", "https://api.example.com/repos/"])).unwrap();
        assert_eq!(config.api_url, "https://api.example.com/repos");
    }

    #[test]
    fn test_influx_output_requires_destination() {
        let result = build_config(&parse(&["--output", "influx"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_influx_preview_needs_no_destination() {
        let config = build_config(&parse(&["--output", "influx", "--preview"])).unwrap();
        assert_eq!(config.output, OutputFormat::Influx);
        assert!(config.preview);
    }

    #[test]
    fn test_influx_destination_assembled() {
        let config = build_config(&parse(&[
            "--output",
            "influx",
            "--influx-url",
            "http://localhost:8086",
            "--influx-database",
            "metrics",
            "--influx-user",
            "admin",
        ]))
        .unwrap();

        let influx = config.influx.unwrap();
        assert_eq!(influx.url, "http://localhost:8086");
        assert_eq!(influx.database, "metrics");
        assert_eq!(influx.username.as_deref(), Some("admin"));
        assert!(influx.password.is_none());
    }

    #[test]
    fn test_invalid_match_pattern_is_rejected() {
        let result = build_config(&parse(&["--match", "("]));
        assert!(result.is_err());
    }

    #[test]
    fn test_filter_flags() {
        let config = build_config(&parse(&[
            "--prerelease",
            "--patch",
            "--minor",
            "--match",
            r"\.tar\.gz$",
        ]))
        .unwrap();

        assert!(config.filter.include_prerelease);
        assert!(config.filter.truncate_patch);
        assert!(config.filter.truncate_minor);
        assert!(config.filter.asset_match.is_some());
    }

    #[test]
    fn test_credentials_from_user_and_token() {
        let config =
            build_config(&parse(&["--user", "bot", "--token", "secret"])).unwrap();
        let creds = config.credentials.unwrap();
        assert_eq!(creds.user, "bot");
        assert_eq!(creds.token, "secret");
    }

    #[test]
    fn test_token_requires_user() {
        let mut full = vec!["repopulse", "--org", "acme", "--repo", "widget"];
        full.extend_from_slice(&["--token", "secret"]);
        assert!(Cli::try_parse_from(full).is_err());
    }
}
