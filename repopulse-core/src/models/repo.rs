//! Repository-level metrics.

use serde::{Deserialize, Serialize};

/// Repository counters as returned by the repository endpoint.
///
/// The organization is not part of the API payload and is stamped on by the
/// poller after a successful fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoStats {
    /// Owning organization.
    #[serde(skip_deserializing)]
    pub org: String,
    /// Repository name.
    #[serde(default, rename(deserialize = "name"))]
    pub repo: String,
    /// Star count.
    #[serde(default, rename(deserialize = "stargazers_count"))]
    pub stars: u64,
    /// Fork count.
    #[serde(default, rename(deserialize = "forks_count"))]
    pub forks: u64,
    /// Subscriber (watcher) count.
    #[serde(default, rename(deserialize = "subscribers_count"))]
    pub watchers: u64,
    /// Open issue count.
    #[serde(default, rename(deserialize = "open_issues_count"))]
    pub open_issues: u64,
}

impl RepoStats {
    /// Stamps the owning organization onto the record, filling in the
    /// repository name when the payload omitted it.
    pub fn tagged(mut self, org: &str, repo: &str) -> Self {
        self.org = org.to_string();
        if self.repo.is_empty() {
            self.repo = repo.to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_api_field_names() {
        let body = r#"{
            "name": "widget",
            "stargazers_count": 120,
            "forks_count": 7,
            "subscribers_count": 15,
            "open_issues_count": 3,
            "organization": {"login": "acme"}
        }"#;

        let stats: RepoStats = serde_json::from_str(body).unwrap();
        assert_eq!(stats.repo, "widget");
        assert_eq!(stats.stars, 120);
        assert_eq!(stats.forks, 7);
        assert_eq!(stats.watchers, 15);
        assert_eq!(stats.open_issues, 3);
        assert!(stats.org.is_empty());
    }

    #[test]
    fn test_tagged_fills_identity() {
        let stats: RepoStats = serde_json::from_str("{}").unwrap();
        let stats = stats.tagged("acme", "widget");
        assert_eq!(stats.org, "acme");
        assert_eq!(stats.repo, "widget");
    }

    #[test]
    fn test_tagged_keeps_payload_name() {
        let stats: RepoStats = serde_json::from_str(r#"{"name":"widget"}"#).unwrap();
        let stats = stats.tagged("acme", "renamed");
        assert_eq!(stats.repo, "widget");
    }
}
