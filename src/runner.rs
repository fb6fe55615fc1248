//! Drives configured process items across their resolved repositories
//! and aggregates the surviving pull requests.

use std::{io::Write, path::PathBuf};

use anyhow::Result;

use crate::{
    chain::{build_chain, run_chain},
    config::{Overrides, ProcessItem, RunConfig},
    github::Provider,
    registry::Registry,
    resolve::resolve_repositories,
    trace::Tracer,
    types::{ItemState, Metadata, PullRequest, RunMode},
};

pub struct Worker<'a, P> {
    config: &'a RunConfig,
    overrides: &'a Overrides,
    registry: &'a Registry,
    provider: &'a P,
    config_base_path: PathBuf,
    tracer: Tracer,
}

impl<'a, P> Worker<'a, P>
where
    P: Provider + Sync,
{
    pub fn new(
        config: &'a RunConfig,
        overrides: &'a Overrides,
        registry: &'a Registry,
        provider: &'a P,
        config_base_path: PathBuf,
    ) -> Self {
        let tracer = Tracer::new(overrides.trace);
        Self {
            config,
            overrides,
            registry,
            provider,
            config_base_path,
            tracer,
        }
    }

    fn metadata(&self, organization: &str, repository: &str, context: &str) -> Metadata {
        Metadata::new(
            organization,
            repository,
            context,
            &self.config_base_path,
            self.overrides.dry_run,
        )
    }

    /// Evaluates every process item against every resolved repository,
    /// in configuration order, and aggregates the surviving pull
    /// requests into one flat sequence. Repositories excluded by the
    /// only-repo override contribute nothing.
    pub async fn collect(&self, mode: RunMode, state: ItemState) -> Result<Vec<PullRequest>> {
        let mut collected = Vec::new();

        for item in &self.config.pr_processing {
            let repositories = resolve_repositories(self.provider, item).await?;
            for repository in &repositories {
                if let Some(survivors) = self.evaluate(item, repository, mode, state).await? {
                    collected.extend(survivors);
                }
            }
        }

        Ok(collected)
    }

    /// Runs the chain for one (process item, repository) pair. `None`
    /// means the repository was excluded by the only-repo override,
    /// not that the chain produced nothing.
    async fn evaluate(
        &self,
        item: &ProcessItem,
        repository: &str,
        mode: RunMode,
        state: ItemState,
    ) -> Result<Option<Vec<PullRequest>>> {
        let meta = self.metadata(&item.config.organization, repository, &item.config.context);

        if let Some(only_repo) = &self.overrides.only_repo {
            if *only_repo != meta.org_repo {
                return Ok(None);
            }
        }

        self.tracer
            .section("==", &format!("Processing: {}", meta.org_repo));

        let chain = build_chain(self.registry, &meta, item, self.overrides)?;

        let initial = self
            .provider
            .list_pull_requests(&meta.organization, &meta.repository, state)
            .await?;
        self.tracer
            .section("PR ", "Full and unfiltered pull request list:");
        self.tracer.items(&initial);

        run_chain(&chain, mode, initial, &self.tracer).map(Some)
    }

    /// Runs the chains with actions enabled.
    pub async fn process(&self) -> Result<Vec<PullRequest>> {
        self.collect(RunMode::Process, ItemState::Open).await
    }

    /// Runs the chains without dispatching any actions.
    pub async fn get(&self) -> Result<Vec<PullRequest>> {
        self.collect(RunMode::Get, ItemState::Open).await
    }

    /// Prints one `number:head-sha:base-branch` line per surviving
    /// pull request, in processing order.
    pub async fn list(&self, out: &mut impl Write) -> Result<()> {
        for pr in self.get().await? {
            writeln!(out, "{}", pr.summary())?;
        }
        Ok(())
    }
}
