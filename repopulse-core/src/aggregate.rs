//! Release filtering and aggregation.
//!
//! [`aggregate`] is a pure transformation from the raw, paginated release
//! list into one [`ReleaseReport`] per effective release name: prereleases
//! are dropped unless requested, names are collapsed to the configured
//! version granularity, assets are filtered by name, and releases sharing a
//! collapsed name are merged.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use regex::Regex;

use crate::error::CoreError;
use crate::models::{RawRelease, ReleaseAsset, ReleaseReport};

// ============================================================================
// Filter configuration
// ============================================================================

/// Filtering and grouping options applied during aggregation.
#[derive(Debug, Clone, Default)]
pub struct ReleaseFilter {
    /// Keep prereleases instead of dropping them.
    pub include_prerelease: bool,
    /// Collapse release names to major.minor.patch before grouping.
    pub truncate_patch: bool,
    /// Collapse release names to major.minor before grouping. Applied after
    /// patch truncation when both are set.
    pub truncate_minor: bool,
    /// Keep only assets whose name matches this pattern.
    pub asset_match: Option<Regex>,
}

impl ReleaseFilter {
    /// Sets the asset name pattern.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPattern`] when the pattern does not
    /// compile.
    pub fn with_asset_pattern(mut self, pattern: &str) -> Result<Self, CoreError> {
        self.asset_match = Some(Regex::new(pattern)?);
        Ok(self)
    }

    fn keep_asset(&self, asset: &ReleaseAsset) -> bool {
        self.asset_match
            .as_ref()
            .is_none_or(|re| re.is_match(&asset.name))
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// Aggregates raw releases into merged per-name reports.
///
/// Group iteration order is not significant; releases whose asset set is
/// empty after filtering are dropped at emission.
pub fn aggregate(
    raw: Vec<RawRelease>,
    filter: &ReleaseFilter,
    org: &str,
    repo: &str,
) -> Vec<ReleaseReport> {
    let mut groups: HashMap<String, ReleaseReport> = HashMap::new();

    for release in raw {
        if release.prerelease && !filter.include_prerelease {
            continue;
        }

        let mut name = release.name;
        if filter.truncate_patch {
            name = truncate_components(&name, 3);
        }
        if filter.truncate_minor {
            name = truncate_components(&name, 2);
        }

        let assets: Vec<ReleaseAsset> = release
            .assets
            .into_iter()
            .filter(|a| filter.keep_asset(a))
            .collect();

        match groups.entry(name) {
            Entry::Occupied(mut entry) => entry.get_mut().merge_assets(assets),
            Entry::Vacant(entry) => {
                let name = entry.key().clone();
                let _ = entry.insert(ReleaseReport::new(org, repo, name, assets));
            }
        }
    }

    groups
        .into_values()
        .filter(|report| !report.assets.is_empty())
        .collect()
}

/// Keeps at most `components` leading dot-separated version components.
///
/// Names with fewer components are returned unchanged.
pub fn truncate_components(name: &str, components: usize) -> String {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() <= components {
        name.to_string()
    } else {
        parts[..components].join(".")
    }
}

// ============================================================================
// Tests
// ============================================================================
