use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser};

use crate::{
    config::Overrides,
    types::{Repo, RunMode},
};

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

#[derive(Args, Debug, Clone, Default)]
struct OverrideArgs {
    /// Log actions instead of executing them
    #[arg(long = "dry-run", help_heading = "Overrides")]
    pub dry_run: bool,

    /// Replace the status option of every Status filter
    #[arg(long, value_name = "STATUS", help_heading = "Overrides")]
    pub mode: Option<String>,

    /// Substitute an identity filter for stages marked skippable
    #[arg(long, help_heading = "Overrides")]
    pub skip: bool,

    /// Print intermediate filter chain state
    #[arg(long = "trace-chain", help_heading = "Overrides")]
    pub trace_chain: bool,

    /// Restrict the run to one repository
    #[arg(long = "only-repo", value_name = "ORG/REPO", help_heading = "Overrides")]
    pub only_repo: Option<String>,

    /// Restrict the run to one pull request number
    #[arg(long = "only-pr", value_name = "NUMBER", help_heading = "Overrides")]
    pub only_pr: Option<u64>,
}

#[derive(Parser, Debug)]
#[command(
    about = "Evaluate pull requests against configured filter chains and dispatch policy actions"
)]
#[command(long_version = BUILD_INFO_HUMAN)]
struct CliArgs {
    /// Path to the JSON processing configuration
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: PathBuf,

    /// Run configured actions against the filtered sets (default: list only)
    #[arg(long)]
    pub trigger: bool,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

impl CliArgs {
    fn validate(&self) -> Result<()> {
        if let Some(only_repo) = &self.overrides.only_repo {
            Repo::parse(only_repo)?;
        }
        Ok(())
    }
}

/// A parsed, validated command line.
#[derive(Debug)]
pub struct Invocation {
    pub config_path: PathBuf,
    pub mode: RunMode,
    pub overrides: Overrides,
}

fn build_invocation(cli: CliArgs) -> Result<Invocation> {
    cli.validate()?;

    let mode = if cli.trigger {
        RunMode::Process
    } else {
        RunMode::Get
    };

    Ok(Invocation {
        config_path: cli.config,
        mode,
        overrides: Overrides {
            dry_run: cli.overrides.dry_run,
            status_mode: cli.overrides.mode,
            skip: cli.overrides.skip,
            trace: cli.overrides.trace_chain,
            only_repo: cli.overrides.only_repo,
            only_pr: cli.overrides.only_pr,
        },
    })
}

/// Parses command-line arguments into a validated invocation.
pub fn parse_args<I, T>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = CliArgs::try_parse_from(args)?;
    build_invocation(cli)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_get_mode() {
        let invocation = parse_args(["prsieve", "--config", "policy.json"]).unwrap();
        assert_eq!(invocation.mode, RunMode::Get);
        assert_eq!(invocation.config_path, PathBuf::from("policy.json"));
        assert!(!invocation.overrides.dry_run);
        assert!(invocation.overrides.status_mode.is_none());
    }

    #[test]
    fn trigger_selects_process_mode() {
        let invocation = parse_args(["prsieve", "--config", "policy.json", "--trigger"]).unwrap();
        assert_eq!(invocation.mode, RunMode::Process);
    }

    #[test]
    fn overrides_map_onto_the_run() {
        let invocation = parse_args([
            "prsieve",
            "--config",
            "policy.json",
            "--dry-run",
            "--mode",
            "closed",
            "--skip",
            "--trace-chain",
            "--only-repo",
            "acme/widgets",
            "--only-pr",
            "42",
        ])
        .unwrap();

        let overrides = invocation.overrides;
        assert!(overrides.dry_run);
        assert_eq!(overrides.status_mode.as_deref(), Some("closed"));
        assert!(overrides.skip);
        assert!(overrides.trace);
        assert_eq!(overrides.only_repo.as_deref(), Some("acme/widgets"));
        assert_eq!(overrides.only_pr, Some(42));
    }

    #[test]
    fn rejects_malformed_only_repo() {
        let err = parse_args([
            "prsieve",
            "--config",
            "policy.json",
            "--only-repo",
            "not-a-repo",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("owner/repo"));
    }

    #[test]
    fn config_is_required() {
        assert!(parse_args(["prsieve"]).is_err());
    }
}
