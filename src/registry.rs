//! Capability registry: maps filter/action type names from the
//! configuration file to constructors. Populated with the built-in
//! kinds at process start; new kinds are added by registering them, not
//! by subclassing existing ones.

use std::collections::HashMap;

use anyhow::Result;

use crate::{
    actions, filters,
    config::ParamMap,
    error::Error,
    types::{Metadata, PassThrough, PullRequest},
};

/// Splits an item set into survivors (white) and rejects (black).
///
/// Implementations must return a true partition of their input: every
/// item lands in exactly one half, relative order preserved. The chain
/// engine verifies this and fails the run on a violation.
pub trait Filter: std::fmt::Debug + Send + Sync {
    fn apply(&self, items: Vec<PullRequest>) -> (Vec<PullRequest>, Vec<PullRequest>);

    /// Which partition feeds the next stage.
    fn pass_through(&self) -> PassThrough {
        PassThrough::Default
    }
}

/// Side-effecting operation dispatched against one partition of a
/// stage's output. Only invoked in process mode; never returns data.
pub trait Action: std::fmt::Debug + Send + Sync {
    fn run(&self, items: &[PullRequest]) -> Result<()>;
}

type FilterCtor = Box<dyn Fn(&Metadata, &ParamMap) -> Result<Box<dyn Filter>> + Send + Sync>;
type ActionCtor = Box<dyn Fn(&Metadata, &ParamMap) -> Result<Box<dyn Action>> + Send + Sync>;

pub struct Registry {
    filters: HashMap<String, FilterCtor>,
    actions: HashMap<String, ActionCtor>,
}

impl Registry {
    pub fn empty() -> Self {
        Self {
            filters: HashMap::new(),
            actions: HashMap::new(),
        }
    }

    /// A registry holding every built-in filter and action kind.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();

        registry.register_filter("Status", filters::StatusFilter::from_config);
        registry.register_filter("Label", filters::LabelFilter::from_config);
        registry.register_filter("Author", filters::AuthorFilter::from_config);
        registry.register_filter("BaseBranch", filters::BaseBranchFilter::from_config);
        registry.register_filter("Identity", filters::IdentityFilter::from_config);
        registry.register_filter(
            "ThisPullRequest",
            filters::ThisPullRequestFilter::from_config,
        );

        registry.register_action("Comment", actions::CommentAction::from_config);
        registry.register_action("Approve", actions::ApproveAction::from_config);
        registry.register_action("Lgtm", actions::LgtmAction::from_config);
        registry.register_action("OkToTest", actions::OkToTestAction::from_config);
        registry.register_action("Retest", actions::RetestAction::from_config);
        registry.register_action("Close", actions::CloseAction::from_config);

        registry
    }

    pub fn register_filter(
        &mut self,
        name: impl Into<String>,
        ctor: impl Fn(&Metadata, &ParamMap) -> Result<Box<dyn Filter>> + Send + Sync + 'static,
    ) {
        self.filters.insert(name.into(), Box::new(ctor));
    }

    pub fn register_action(
        &mut self,
        name: impl Into<String>,
        ctor: impl Fn(&Metadata, &ParamMap) -> Result<Box<dyn Action>> + Send + Sync + 'static,
    ) {
        self.actions.insert(name.into(), Box::new(ctor));
    }

    pub fn build_filter(
        &self,
        name: &str,
        meta: &Metadata,
        config: &ParamMap,
    ) -> Result<Box<dyn Filter>> {
        let ctor = self
            .filters
            .get(name)
            .ok_or_else(|| Error::UnknownFilterType(name.to_string()))?;
        ctor(meta, config)
    }

    pub fn build_action(
        &self,
        name: &str,
        meta: &Metadata,
        parameters: &ParamMap,
    ) -> Result<Box<dyn Action>> {
        let ctor = self
            .actions
            .get(name)
            .ok_or_else(|| Error::UnknownActionType(name.to_string()))?;
        ctor(meta, parameters)
    }
}
