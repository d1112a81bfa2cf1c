//! Release and asset models.

use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Raw API shapes
// ============================================================================

/// One downloadable artifact attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    /// Asset file name.
    pub name: String,
    /// Cumulative download count.
    #[serde(default, rename(deserialize = "download_count"))]
    pub downloads: u64,
    /// Asset size in bytes.
    #[serde(default)]
    pub size: u64,
}

/// A release exactly as the API returned it, pre-aggregation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRelease {
    /// Release name. The API reports `null` for unnamed releases.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// Whether the release is marked as a prerelease.
    #[serde(default)]
    pub prerelease: bool,
    /// Assets attached to the release, in API order.
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Merged report
// ============================================================================

/// A merged release record, one per effective release name.
///
/// Holds the union (by asset name) of the assets of all raw releases that
/// collapse to the same name, with download counts summed across duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseReport {
    /// Owning organization.
    pub org: String,
    /// Repository name.
    pub repo: String,
    /// Effective (possibly truncated) release name.
    pub release: String,
    /// Merged asset collection.
    pub assets: Vec<ReleaseAsset>,
}

impl ReleaseReport {
    /// Creates a report for `release` with an initial asset set.
    pub fn new(org: &str, repo: &str, release: String, assets: Vec<ReleaseAsset>) -> Self {
        Self {
            org: org.to_string(),
            repo: repo.to_string(),
            release,
            assets,
        }
    }

    /// Merges another asset set into this report.
    ///
    /// Assets are matched by name; duplicates have their download counts
    /// summed and keep the first-seen size.
    pub fn merge_assets(&mut self, incoming: impl IntoIterator<Item = ReleaseAsset>) {
        for asset in incoming {
            match self.assets.iter_mut().find(|a| a.name == asset.name) {
                Some(existing) => existing.downloads += asset.downloads,
                None => self.assets.push(asset),
            }
        }
    }

    /// Total downloads across all merged assets.
    pub fn total_downloads(&self) -> u64 {
        self.assets.iter().map(|a| a.downloads).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str, downloads: u64) -> ReleaseAsset {
        ReleaseAsset {
            name: name.to_string(),
            downloads,
            size: 1024,
        }
    }

    #[test]
    fn test_decodes_null_release_name() {
        let body = r#"{"name": null, "prerelease": false, "assets": []}"#;
        let release: RawRelease = serde_json::from_str(body).unwrap();
        assert!(release.name.is_empty());
    }

    #[test]
    fn test_decodes_asset_download_count() {
        let body = r#"{"name": "tool.tar.gz", "download_count": 42, "size": 9000}"#;
        let parsed: ReleaseAsset = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.downloads, 42);
        assert_eq!(parsed.size, 9000);
    }

    #[test]
    fn test_merge_sums_duplicate_downloads() {
        let mut report = ReleaseReport::new("acme", "widget", "v1.0".into(), vec![asset("a", 5)]);
        report.merge_assets(vec![asset("a", 7), asset("b", 2)]);

        assert_eq!(report.assets.len(), 2);
        assert_eq!(report.assets[0].downloads, 12);
        assert_eq!(report.assets[1].downloads, 2);
        assert_eq!(report.total_downloads(), 14);
    }

    #[test]
    fn test_merge_keeps_first_seen_size() {
        let mut report = ReleaseReport::new("acme", "widget", "v1.0".into(), vec![asset("a", 5)]);
        report.merge_assets(vec![ReleaseAsset {
            name: "a".to_string(),
            downloads: 1,
            size: 2048,
        }]);

        assert_eq!(report.assets[0].size, 1024);
    }
}
