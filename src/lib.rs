//! Prsieve: configuration-driven pull request filter chains.
//!
//! Evaluates pull requests fetched from GitHub against an ordered
//! pipeline of filter stages and dispatches configured actions against
//! the filtered subsets. Each stage splits its input into a white list
//! (survivors) and a black list (rejects); a per-stage pass-through
//! policy decides which half feeds the next stage. Filter and action
//! implementations are resolved by name from a capability registry, so
//! review policy lives entirely in configuration.

pub mod actions;
pub mod chain;
pub mod cli;
pub mod config;
pub mod error;
pub mod filters;
pub mod github;
pub mod graphql;
pub mod registry;
pub mod resolve;
pub mod runner;
pub mod trace;
pub mod types;

pub use chain::{Chain, Stage, build_chain, run_chain};
pub use cli::{Invocation, parse_args};
pub use config::{
    ActionSpec, FilterSpec, Overrides, ParamMap, ProcessItem, RunConfig, config_base_path,
    load_config,
};
pub use error::Error;
pub use github::{GitHub, Provider};
pub use registry::{Action, Filter, Registry};
pub use resolve::resolve_repositories;
pub use runner::Worker;
pub use trace::Tracer;
pub use types::{ItemState, Metadata, PassThrough, PullRequest, Repo, RunMode};
