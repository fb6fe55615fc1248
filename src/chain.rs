//! Filter chain construction and execution.
//!
//! A chain is an ordered sequence of stages, each pairing one filter
//! with the actions attached to its white and black output partitions.
//! Chains are built fresh per (process item, repository) pair and
//! discarded after one run; stage internals are immutable once built.

use anyhow::Result;
use serde_json::Value;

use crate::{
    config::{ActionSpec, FilterSpec, Overrides, ParamMap, ProcessItem},
    error::Error,
    filters::{IdentityFilter, ThisPullRequestFilter},
    registry::{Action, Filter, Registry},
    trace::Tracer,
    types::{Metadata, PassThrough, PullRequest, RunMode},
};

/// One filter plus the actions dispatched against its output
/// partitions.
#[derive(Debug)]
pub struct Stage {
    pub filter: Box<dyn Filter>,
    pub whitelist_actions: Vec<Box<dyn Action>>,
    pub blacklist_actions: Vec<Box<dyn Action>>,
}

impl Stage {
    pub fn bare(filter: Box<dyn Filter>) -> Self {
        Self {
            filter,
            whitelist_actions: Vec::new(),
            blacklist_actions: Vec::new(),
        }
    }
}

pub type Chain = Vec<Stage>;

/// Per-stage clone of the declared filter config with the run-time
/// overlays applied. Cloning keeps stages and repositories from
/// aliasing one configuration value.
fn effective_config(spec: &FilterSpec, overrides: &Overrides) -> ParamMap {
    let mut config = spec.config.clone();

    if spec.kind == "Status" {
        if let Some(mode) = overrides.status_mode.as_deref().filter(|m| !m.is_empty()) {
            config.insert("status".to_string(), Value::String(mode.to_string()));
        }
    }

    config.insert(
        "pass_through".to_string(),
        Value::String(spec.pass_through.as_str().to_string()),
    );

    config
}

fn build_actions(
    registry: &Registry,
    meta: &Metadata,
    specs: &[ActionSpec],
) -> Result<Vec<Box<dyn Action>>> {
    specs
        .iter()
        .map(|spec| registry.build_action(&spec.kind, meta, &spec.parameters))
        .collect()
}

/// Builds the chain for one (process item, repository) pair.
///
/// The only-pr override prepends a synthetic stage that keeps only the
/// matching pull request. Stages marked skippable degrade to an
/// identity filter under the skip override without being removed from
/// the configuration.
pub fn build_chain(
    registry: &Registry,
    meta: &Metadata,
    item: &ProcessItem,
    overrides: &Overrides,
) -> Result<Chain> {
    let mut chain = Chain::new();

    if let Some(number) = overrides.only_pr {
        chain.push(Stage::bare(Box::new(ThisPullRequestFilter::new(number))));
    }

    for spec in &item.filter {
        let config = effective_config(spec, overrides);

        let filter = if spec.skippable && overrides.skip {
            IdentityFilter::from_config(meta, &config)?
        } else {
            registry.build_filter(&spec.kind, meta, &config)?
        };

        chain.push(Stage {
            filter,
            whitelist_actions: build_actions(registry, meta, &spec.whitelist_actions)?,
            blacklist_actions: build_actions(registry, meta, &spec.blacklist_actions)?,
        });
    }

    Ok(chain)
}

fn sorted_numbers<'a>(items: impl Iterator<Item = &'a PullRequest>) -> Vec<u64> {
    let mut numbers: Vec<u64> = items.map(|pr| pr.number).collect();
    numbers.sort_unstable();
    numbers
}

/// Every input item must land in exactly one output half. Checked per
/// stage so a misbehaving filter fails the run instead of silently
/// dropping or duplicating items.
fn verify_partition(
    filter: &dyn Filter,
    input: &[u64],
    white: &[PullRequest],
    black: &[PullRequest],
) -> Result<()> {
    let output = sorted_numbers(white.iter().chain(black.iter()));
    if output != input {
        return Err(Error::PartitionViolation {
            filter: format!("{filter:?}"),
            detail: format!("input numbers {input:?}, white+black numbers {output:?}"),
        }
        .into());
    }
    Ok(())
}

/// Sequential fold of the item set over the chain.
///
/// Each stage partitions its input; in process mode the blacklist
/// actions run before the whitelist actions; the stage's pass-through
/// policy then decides which half feeds the next stage. An empty chain
/// returns the initial set unchanged.
pub fn run_chain(
    chain: &Chain,
    mode: RunMode,
    initial: Vec<PullRequest>,
    tracer: &Tracer,
) -> Result<Vec<PullRequest>> {
    let mut current = initial;

    for stage in chain {
        let input_numbers = sorted_numbers(current.iter());
        let (mut white, mut black) = stage.filter.apply(current);
        verify_partition(&*stage.filter, &input_numbers, &white, &black)?;

        tracer.section("F ", "Filtering with:");
        tracer.filter(&*stage.filter);

        if mode == RunMode::Process {
            for action in &stage.blacklist_actions {
                action.run(&black)?;
            }
            for action in &stage.whitelist_actions {
                action.run(&white)?;
            }
        }

        tracer.section("- ", "Blacklist actions:");
        tracer.actions(&stage.blacklist_actions);
        tracer.items(&black);
        tracer.section("+ ", "Whitelist actions:");
        tracer.actions(&stage.whitelist_actions);
        tracer.items(&white);

        current = match stage.filter.pass_through() {
            PassThrough::Default => white,
            PassThrough::Black => black,
            PassThrough::All => {
                white.append(&mut black);
                white
            }
        };
    }

    Ok(current)
}
