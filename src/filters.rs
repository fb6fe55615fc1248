//! Built-in filter kinds.
//!
//! Every constructor takes `(metadata, effective config)` where the
//! effective config is the per-stage clone assembled by the chain
//! builder, including the overlaid `pass_through` key.

use anyhow::Result;
use serde_json::Value;

use crate::{
    config::ParamMap,
    error::Error,
    registry::Filter,
    types::{Metadata, PassThrough, PullRequest},
};

fn pass_through_from(config: &ParamMap, filter: &'static str) -> Result<PassThrough> {
    match config.get("pass_through") {
        None => Ok(PassThrough::Default),
        Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
            Error::invalid_config("filter", filter, format!("bad pass_through: {e}")).into()
        }),
    }
}

fn required_str(config: &ParamMap, key: &str, filter: &'static str) -> Result<String> {
    match config.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(Error::invalid_config(
            "filter",
            filter,
            format!("'{key}' must be a string, got {other}"),
        )
        .into()),
        None => Err(Error::invalid_config("filter", filter, format!("missing '{key}'")).into()),
    }
}

fn partition_by<F>(items: Vec<PullRequest>, predicate: F) -> (Vec<PullRequest>, Vec<PullRequest>)
where
    F: Fn(&PullRequest) -> bool,
{
    items.into_iter().partition(predicate)
}

/// Passes everything through unchanged: all input white, nothing black.
/// Also substituted for skippable stages when the skip override is
/// active.
#[derive(Debug)]
pub struct IdentityFilter {
    pass_through: PassThrough,
}

impl IdentityFilter {
    pub fn from_config(_meta: &Metadata, config: &ParamMap) -> Result<Box<dyn Filter>> {
        Ok(Box::new(Self {
            pass_through: pass_through_from(config, "Identity")?,
        }))
    }
}

impl Filter for IdentityFilter {
    fn apply(&self, items: Vec<PullRequest>) -> (Vec<PullRequest>, Vec<PullRequest>) {
        (items, Vec::new())
    }

    fn pass_through(&self) -> PassThrough {
        self.pass_through
    }
}

/// Matches the provider-reported status string (case-insensitive). The
/// configured `status` option may be overlaid by the run-time mode
/// override.
#[derive(Debug)]
pub struct StatusFilter {
    status: String,
    pass_through: PassThrough,
}

impl StatusFilter {
    pub fn from_config(_meta: &Metadata, config: &ParamMap) -> Result<Box<dyn Filter>> {
        Ok(Box::new(Self {
            status: required_str(config, "status", "Status")?,
            pass_through: pass_through_from(config, "Status")?,
        }))
    }
}

impl Filter for StatusFilter {
    fn apply(&self, items: Vec<PullRequest>) -> (Vec<PullRequest>, Vec<PullRequest>) {
        partition_by(items, |pr| pr.status.eq_ignore_ascii_case(&self.status))
    }

    fn pass_through(&self) -> PassThrough {
        self.pass_through
    }
}

/// Requires every configured label; a `-` prefix negates, requiring the
/// label to be absent.
#[derive(Debug)]
pub struct LabelFilter {
    labels: Vec<String>,
    pass_through: PassThrough,
}

impl LabelFilter {
    pub fn from_config(_meta: &Metadata, config: &ParamMap) -> Result<Box<dyn Filter>> {
        let labels = match config.get("labels") {
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                Error::invalid_config("filter", "Label", format!("bad labels: {e}"))
            })?,
            None => {
                return Err(Error::invalid_config("filter", "Label", "missing 'labels'").into());
            }
        };
        Ok(Box::new(Self {
            labels,
            pass_through: pass_through_from(config, "Label")?,
        }))
    }

    fn matches(&self, pr: &PullRequest) -> bool {
        self.labels.iter().all(|label| {
            if let Some(negated) = label.strip_prefix('-') {
                !pr.has_label(negated)
            } else {
                pr.has_label(label)
            }
        })
    }
}

impl Filter for LabelFilter {
    fn apply(&self, items: Vec<PullRequest>) -> (Vec<PullRequest>, Vec<PullRequest>) {
        partition_by(items, |pr| self.matches(pr))
    }

    fn pass_through(&self) -> PassThrough {
        self.pass_through
    }
}

/// Matches the pull request author, including the `name[bot]` form.
#[derive(Debug)]
pub struct AuthorFilter {
    author: String,
    pass_through: PassThrough,
}

impl AuthorFilter {
    pub fn from_config(_meta: &Metadata, config: &ParamMap) -> Result<Box<dyn Filter>> {
        Ok(Box::new(Self {
            author: required_str(config, "author", "Author")?,
            pass_through: pass_through_from(config, "Author")?,
        }))
    }
}

impl Filter for AuthorFilter {
    fn apply(&self, items: Vec<PullRequest>) -> (Vec<PullRequest>, Vec<PullRequest>) {
        partition_by(items, |pr| pr.matches_author(&self.author))
    }

    fn pass_through(&self) -> PassThrough {
        self.pass_through
    }
}

/// Matches pull requests targeting the configured base branch.
#[derive(Debug)]
pub struct BaseBranchFilter {
    branch: String,
    pass_through: PassThrough,
}

impl BaseBranchFilter {
    pub fn from_config(_meta: &Metadata, config: &ParamMap) -> Result<Box<dyn Filter>> {
        Ok(Box::new(Self {
            branch: required_str(config, "branch", "BaseBranch")?,
            pass_through: pass_through_from(config, "BaseBranch")?,
        }))
    }
}

impl Filter for BaseBranchFilter {
    fn apply(&self, items: Vec<PullRequest>) -> (Vec<PullRequest>, Vec<PullRequest>) {
        partition_by(items, |pr| pr.base_branch == self.branch)
    }

    fn pass_through(&self) -> PassThrough {
        self.pass_through
    }
}

/// Matches exactly one pull request number. Prepended as a synthetic
/// stage when the only-pr override is active.
#[derive(Debug)]
pub struct ThisPullRequestFilter {
    number: u64,
    pass_through: PassThrough,
}

impl ThisPullRequestFilter {
    pub fn new(number: u64) -> Self {
        Self {
            number,
            pass_through: PassThrough::Default,
        }
    }

    pub fn from_config(_meta: &Metadata, config: &ParamMap) -> Result<Box<dyn Filter>> {
        let number = match config.get("number") {
            Some(Value::Number(n)) if n.as_u64().is_some() => n.as_u64().unwrap(),
            Some(other) => {
                return Err(Error::invalid_config(
                    "filter",
                    "ThisPullRequest",
                    format!("'number' must be a non-negative integer, got {other}"),
                )
                .into());
            }
            None => {
                return Err(
                    Error::invalid_config("filter", "ThisPullRequest", "missing 'number'").into(),
                );
            }
        };
        Ok(Box::new(Self {
            number,
            pass_through: pass_through_from(config, "ThisPullRequest")?,
        }))
    }
}

impl Filter for ThisPullRequestFilter {
    fn apply(&self, items: Vec<PullRequest>) -> (Vec<PullRequest>, Vec<PullRequest>) {
        partition_by(items, |pr| pr.number == self.number)
    }

    fn pass_through(&self) -> PassThrough {
        self.pass_through
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use chrono::Utc;

    use super::*;
    use crate::types::{ItemState, Repo};

    fn meta() -> Metadata {
        Metadata::new("acme", "widgets", "ci/policy", Path::new("."), false)
    }

    fn pr(number: u64, status: &str, labels: &[&str]) -> PullRequest {
        PullRequest {
            repo: Repo::new("acme", "widgets"),
            number,
            title: format!("PR {number}"),
            author_login: "alice".to_string(),
            url: format!("https://github.com/acme/widgets/pull/{number}"),
            head_sha: format!("sha{number}"),
            base_branch: "main".to_string(),
            state: ItemState::Open,
            status: status.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            created_at: Utc::now(),
        }
    }

    fn config(entries: serde_json::Value) -> ParamMap {
        serde_json::from_value(entries).unwrap()
    }

    fn numbers(items: &[PullRequest]) -> Vec<u64> {
        items.iter().map(|pr| pr.number).collect()
    }

    #[test]
    fn identity_keeps_everything_white() {
        let filter = IdentityFilter::from_config(&meta(), &ParamMap::new()).unwrap();
        let (white, black) = filter.apply(vec![pr(1, "success", &[]), pr(2, "failure", &[])]);
        assert_eq!(numbers(&white), vec![1, 2]);
        assert!(black.is_empty());
    }

    #[test]
    fn status_partitions_case_insensitively() {
        let filter =
            StatusFilter::from_config(&meta(), &config(serde_json::json!({"status": "Success"})))
                .unwrap();
        let (white, black) = filter.apply(vec![
            pr(1, "success", &[]),
            pr(2, "failure", &[]),
            pr(3, "success", &[]),
        ]);
        assert_eq!(numbers(&white), vec![1, 3]);
        assert_eq!(numbers(&black), vec![2]);
    }

    #[test]
    fn status_requires_a_string_option() {
        let err = StatusFilter::from_config(&meta(), &config(serde_json::json!({"status": 7})))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidCapabilityConfig { .. })
        ));
    }

    #[test]
    fn label_filter_honours_negation() {
        let filter = LabelFilter::from_config(
            &meta(),
            &config(serde_json::json!({"labels": ["lgtm", "-do-not-merge/hold"]})),
        )
        .unwrap();
        let (white, black) = filter.apply(vec![
            pr(1, "success", &["lgtm"]),
            pr(2, "success", &["lgtm", "do-not-merge/hold"]),
            pr(3, "success", &[]),
        ]);
        assert_eq!(numbers(&white), vec![1]);
        assert_eq!(numbers(&black), vec![2, 3]);
    }

    #[test]
    fn base_branch_filter_matches_target() {
        let filter =
            BaseBranchFilter::from_config(&meta(), &config(serde_json::json!({"branch": "main"})))
                .unwrap();
        let mut release = pr(2, "success", &[]);
        release.base_branch = "release-1.2".to_string();
        let (white, black) = filter.apply(vec![pr(1, "success", &[]), release]);
        assert_eq!(numbers(&white), vec![1]);
        assert_eq!(numbers(&black), vec![2]);
    }

    #[test]
    fn this_pull_request_keeps_only_the_given_number() {
        let filter = ThisPullRequestFilter::new(42);
        let (white, black) = filter.apply(vec![
            pr(7, "success", &[]),
            pr(42, "success", &[]),
            pr(99, "success", &[]),
        ]);
        assert_eq!(numbers(&white), vec![42]);
        assert_eq!(numbers(&black), vec![7, 99]);
    }

    #[test]
    fn pass_through_is_read_from_the_effective_config() {
        let filter = StatusFilter::from_config(
            &meta(),
            &config(serde_json::json!({"status": "open", "pass_through": "all"})),
        )
        .unwrap();
        assert_eq!(filter.pass_through(), PassThrough::All);
    }
}
