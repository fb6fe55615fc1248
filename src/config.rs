//! Processing configuration: an ordered list of process items, each
//! naming an organization, a repository selection and a filter chain
//! template.
//!
//! The file is read once at run start and never mutated. Per-stage
//! overrides are applied by the chain builder onto clones of these
//! values, so a single configuration can be reused across repositories
//! without aliasing.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::types::PassThrough;

/// Parameter mapping for a filter or action, as declared in the
/// configuration file.
pub type ParamMap = Map<String, Value>;

/// Root of the configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub pr_processing: Vec<ProcessItem>,
}

/// One configured unit of work: an organization, a repository
/// selection and a filter chain template.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessItem {
    pub config: ProcessConfig,
    #[serde(default)]
    pub filter: Vec<FilterSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessConfig {
    pub organization: String,
    #[serde(default)]
    pub context: String,
    /// Explicit repository names; takes precedence over
    /// `repository_filter` when non-empty.
    #[serde(default)]
    pub repositories: Vec<String>,
    /// Regex patterns matched against the organization's repository
    /// names when `repositories` is empty.
    #[serde(default)]
    pub repository_filter: Vec<String>,
}

/// Declares which registered filter implementation to build for one
/// stage, plus the actions attached to each output partition.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub config: ParamMap,
    /// Stages marked skippable degrade to an identity filter under the
    /// global skip override.
    #[serde(default)]
    pub skippable: bool,
    #[serde(default)]
    pub pass_through: PassThrough,
    #[serde(default)]
    pub whitelist_actions: Vec<ActionSpec>,
    #[serde(default)]
    pub blacklist_actions: Vec<ActionSpec>,
}

/// Declares which registered action implementation to build.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub parameters: ParamMap,
}

/// Run-time overrides supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Log actions instead of executing them.
    pub dry_run: bool,
    /// Replaces the `status` option of every `Status` filter.
    pub status_mode: Option<String>,
    /// Substitutes an identity filter for stages marked skippable.
    pub skip: bool,
    /// Print intermediate filter chain state.
    pub trace: bool,
    /// Restrict the run to one `org/repo`.
    pub only_repo: Option<String>,
    /// Restrict the run to one pull request number.
    pub only_pr: Option<u64>,
}

pub fn load_config(path: &Path) -> Result<RunConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

/// Parent directory of the config file, recorded in per-repository
/// metadata so capabilities can resolve relative paths.
pub fn config_base_path(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::types::PassThrough;

    #[test]
    fn filter_spec_defaults() {
        let spec: FilterSpec = serde_json::from_value(serde_json::json!({
            "type": "Status",
            "config": {"status": "open"},
        }))
        .unwrap();

        assert_eq!(spec.kind, "Status");
        assert!(!spec.skippable);
        assert_eq!(spec.pass_through, PassThrough::Default);
        assert!(spec.whitelist_actions.is_empty());
        assert!(spec.blacklist_actions.is_empty());
    }

    #[test]
    fn full_process_item_parses() {
        let config: RunConfig = serde_json::from_value(serde_json::json!({
            "pr_processing": [{
                "config": {
                    "organization": "acme",
                    "context": "ci/policy",
                    "repository_filter": ["^widget-"],
                },
                "filter": [{
                    "type": "Status",
                    "config": {"status": "success"},
                    "skippable": true,
                    "pass_through": "all",
                    "whitelist_actions": [
                        {"type": "Comment", "parameters": {"body": "looks good"}}
                    ],
                    "blacklist_actions": [
                        {"type": "Retest"}
                    ],
                }],
            }],
        }))
        .unwrap();

        let item = &config.pr_processing[0];
        assert_eq!(item.config.organization, "acme");
        assert!(item.config.repositories.is_empty());
        assert_eq!(item.config.repository_filter, vec!["^widget-"]);

        let spec = &item.filter[0];
        assert!(spec.skippable);
        assert_eq!(spec.pass_through, PassThrough::All);
        assert_eq!(spec.whitelist_actions[0].kind, "Comment");
        assert_eq!(spec.blacklist_actions[0].kind, "Retest");
        assert!(spec.blacklist_actions[0].parameters.is_empty());
    }

    #[test]
    fn missing_pr_processing_yields_empty_list() {
        let config: RunConfig = serde_json::from_str("{}").unwrap();
        assert!(config.pr_processing.is_empty());
    }

    #[test]
    fn loads_config_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"pr_processing": [{{"config": {{"organization": "acme", "repositories": ["widgets"]}}}}]}}"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.pr_processing.len(), 1);
        assert_eq!(config.pr_processing[0].config.repositories, vec!["widgets"]);
        assert_eq!(config_base_path(file.path()), file.path().parent().unwrap());
    }

    #[test]
    fn rejects_unreadable_config() {
        let err = load_config(Path::new("/nonexistent/prsieve.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
