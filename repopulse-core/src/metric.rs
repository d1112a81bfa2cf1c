//! The metric event flowing from the pollers to the sink.
//!
//! [`Metric`] is a tagged union over the two record kinds the collector
//! produces. Each variant implements the three render capabilities the sinks
//! dispatch on: JSON, delimited text, and time-series points. Delimited
//! rendering takes an explicit [`RenderContext`] instead of relying on any
//! process-wide formatting state.

use crate::error::CoreError;
use crate::models::{ReleaseReport, RepoStats};
use crate::point::Point;

// ============================================================================
// Render context
// ============================================================================

/// Context threaded into delimited-text rendering.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Field separator for delimited output.
    pub separator: String,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            separator: ";".to_string(),
        }
    }
}

impl RenderContext {
    /// Creates a context with the given separator.
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

// ============================================================================
// Metric
// ============================================================================

/// One unit flowing through the shared channel: a repository snapshot or a
/// merged release record.
#[derive(Debug, Clone)]
pub enum Metric {
    /// Repository-level counters.
    Repo(RepoStats),
    /// Merged release record.
    Release(ReleaseReport),
}

impl Metric {
    /// Renders the metric as a single JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Serialization`] when encoding fails.
    pub fn render_json(&self) -> Result<String, CoreError> {
        let json = match self {
            Self::Repo(stats) => serde_json::to_string(stats)?,
            Self::Release(report) => serde_json::to_string(report)?,
        };
        Ok(json)
    }

    /// Renders the metric as delimited text, one line per record. Releases
    /// produce one line per asset.
    pub fn render_delimited(&self, ctx: &RenderContext) -> String {
        let sep = ctx.separator.as_str();
        match self {
            Self::Repo(stats) => format!(
                "{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}",
                stats.org, stats.repo, stats.stars, stats.forks, stats.watchers, stats.open_issues
            ),
            Self::Release(report) => report
                .assets
                .iter()
                .map(|asset| {
                    format!(
                        "{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}",
                        report.org,
                        report.repo,
                        report.release,
                        asset.name,
                        asset.downloads,
                        asset.size
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Converts the metric into time-series points: one point for a
    /// repository snapshot, one point per asset for a release.
    pub fn to_points(&self) -> Vec<Point> {
        match self {
            Self::Repo(stats) => vec![
                Point::new("repository")
                    .tag("org", &stats.org)
                    .tag("repo", &stats.repo)
                    .field("stars", stats.stars)
                    .field("forks", stats.forks)
                    .field("watchers", stats.watchers)
                    .field("open_issues", stats.open_issues),
            ],
            Self::Release(report) => report
                .assets
                .iter()
                .map(|asset| {
                    Point::new("release")
                        .tag("org", &report.org)
                        .tag("repo", &report.repo)
                        .tag("release", &report.release)
                        .tag("asset", &asset.name)
                        .field("downloads", asset.downloads)
                        .field("size", asset.size)
                })
                .collect(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
