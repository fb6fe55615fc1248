use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A repository identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repo {
    pub owner: String,
    pub name: String,
}

impl Repo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parses an `owner/name` pair.
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s.split('/').collect::<Vec<_>>().as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => Ok(Self::new(*owner, *name)),
            _ => anyhow::bail!("Repository must be in format 'owner/repo', got: '{}'", s),
        }
    }
}

impl std::fmt::Display for Repo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Pull request states understood by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Open,
    Closed,
}

impl ItemState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemState::Open => "open",
            ItemState::Closed => "closed",
        }
    }
}

/// Policy governing which partition of a stage's output feeds the next
/// stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassThrough {
    /// Only the white list survives.
    #[default]
    Default,
    /// Only the black list survives.
    Black,
    /// White then black, each half keeping its relative order.
    All,
}

impl PassThrough {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassThrough::Default => "default",
            PassThrough::Black => "black",
            PassThrough::All => "all",
        }
    }
}

/// Whether a run dispatches actions or only partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Partition only; actions are never invoked.
    Get,
    /// Partition and run the configured actions on each half.
    Process,
}

/// Read-only evaluation context handed to every filter and action
/// constructor. Built fresh per (process item, repository) pair.
#[derive(Debug, Clone)]
pub struct Metadata {
    pub org_repo: String,
    pub organization: String,
    pub repository: String,
    pub context: String,
    pub config_base_path: PathBuf,
    pub dry_run: bool,
}

impl Metadata {
    pub fn new(
        organization: &str,
        repository: &str,
        context: &str,
        config_base_path: &Path,
        dry_run: bool,
    ) -> Self {
        Self {
            org_repo: format!("{organization}/{repository}"),
            organization: organization.to_string(),
            repository: repository.to_string(),
            context: context.to_string(),
            config_base_path: config_base_path.to_path_buf(),
            dry_run,
        }
    }
}

/// A pull request as reported by the hosting provider.
///
/// The pipeline reads `number`, `head_sha` and `base_branch` for output
/// and hands the whole record to filters and actions; it never mutates
/// one.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequest {
    pub repo: Repo,
    pub number: u64,
    pub title: String,
    pub author_login: String,
    pub url: String,
    pub head_sha: String,
    pub base_branch: String,
    pub state: ItemState,
    /// Combined status rollup, lowercased ("success", "failure",
    /// "pending"); empty when the provider reports no checks.
    pub status: String,
    pub labels: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl PullRequest {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Tests if the author matches, accepting both the plain login and
    /// the `name[bot]` form GitHub uses for app accounts.
    pub fn matches_author(&self, author: &str) -> bool {
        self.author_login == author
            || (self.author_login.starts_with(&format!("{author}["))
                && self.author_login.ends_with(']'))
    }

    /// The one-line output form: `number:head-sha:base-branch`.
    pub fn summary(&self) -> String {
        format!("{}:{}:{}", self.number, self.head_sha, self.base_branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_owner_repo_pairs() {
        let repo = Repo::parse("acme/widgets").unwrap();
        assert_eq!(repo.owner, "acme");
        assert_eq!(repo.name, "widgets");
        assert_eq!(repo.to_string(), "acme/widgets");
    }

    #[test]
    fn rejects_malformed_repo_strings() {
        assert!(Repo::parse("acme").is_err());
        assert!(Repo::parse("acme/").is_err());
        assert!(Repo::parse("/widgets").is_err());
        assert!(Repo::parse("a/b/c").is_err());
    }

    #[test]
    fn pass_through_deserializes_lowercase() {
        let pt: PassThrough = serde_json::from_str("\"black\"").unwrap();
        assert_eq!(pt, PassThrough::Black);
        let pt: PassThrough = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(pt, PassThrough::All);
        let pt: PassThrough = serde_json::from_str("\"default\"").unwrap();
        assert_eq!(pt, PassThrough::Default);
    }

    #[test]
    fn author_matching_accepts_bot_suffix() {
        let mut pr = test_pr(1);
        pr.author_login = "renovate[bot]".to_string();
        assert!(pr.matches_author("renovate"));
        assert!(pr.matches_author("renovate[bot]"));
        assert!(!pr.matches_author("dependabot"));
    }

    fn test_pr(number: u64) -> PullRequest {
        PullRequest {
            repo: Repo::new("acme", "widgets"),
            number,
            title: "title".to_string(),
            author_login: "alice".to_string(),
            url: format!("https://github.com/acme/widgets/pull/{number}"),
            head_sha: format!("sha{number}"),
            base_branch: "main".to_string(),
            state: ItemState::Open,
            status: "success".to_string(),
            labels: vec![],
            created_at: Utc::now(),
        }
    }
}
