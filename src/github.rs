//! GitHub as the hosting provider.
//!
//! The pipeline consumes the [`Provider`] trait; [`GitHub`] implements
//! it with octocrab (REST for repository listing, GraphQL search for
//! pull requests). Tests substitute their own implementations.

use std::process::Command;

use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::Octocrab;

use crate::{
    graphql::{GraphQLResponse, convert_pull_request, pull_request_query},
    types::{ItemState, PullRequest, Repo},
};

/// The remote hosting provider, reduced to the two listing calls the
/// pipeline needs.
#[async_trait]
pub trait Provider {
    /// Names of the organization's repositories.
    async fn list_repositories(&self, organization: &str) -> Result<Vec<String>>;

    /// The full, unfiltered pull request set for one repository.
    async fn list_pull_requests(
        &self,
        organization: &str,
        repository: &str,
        state: ItemState,
    ) -> Result<Vec<PullRequest>>;
}

fn get_github_token() -> Result<String> {
    // Prefer environment variables over gh CLI to avoid subprocess overhead.
    if let Ok(token) = std::env::var("GITHUB_TOKEN") {
        return Ok(token);
    }

    if let Ok(token) = std::env::var("GH_TOKEN") {
        return Ok(token);
    }

    let output = Command::new("gh").args(["auth", "token"]).output()?;

    if !output.status.success() {
        anyhow::bail!("Failed to get GitHub token from gh CLI. Please run 'gh auth login' first");
    }

    let token = String::from_utf8(output.stdout)?.trim().to_string();

    if token.is_empty() {
        anyhow::bail!("Empty token returned from gh CLI");
    }

    Ok(token)
}

pub struct GitHub {
    octocrab: Octocrab,
}

impl GitHub {
    /// Creates an authenticated client using available credentials.
    pub async fn connect() -> Result<Self> {
        let token = get_github_token().context("Failed to obtain GitHub authentication token")?;
        let octocrab = Octocrab::builder()
            .personal_token(token)
            .build()
            .context("Failed to create GitHub client")?;
        Ok(Self { octocrab })
    }
}

#[async_trait]
impl Provider for GitHub {
    async fn list_repositories(&self, organization: &str) -> Result<Vec<String>> {
        let page = self
            .octocrab
            .orgs(organization)
            .list_repos()
            .per_page(100)
            .send()
            .await
            .with_context(|| format!("Failed to list repositories for '{organization}'"))?;

        let repositories = self
            .octocrab
            .all_pages(page)
            .await
            .with_context(|| format!("Failed to page repositories for '{organization}'"))?;

        Ok(repositories.into_iter().map(|repo| repo.name).collect())
    }

    async fn list_pull_requests(
        &self,
        organization: &str,
        repository: &str,
        state: ItemState,
    ) -> Result<Vec<PullRequest>> {
        let repo = Repo::new(organization, repository);
        let search = format!("repo:{repo} type:pr state:{}", state.as_str());

        let mut pull_requests = Vec::new();
        let mut after_cursor: Option<String> = None;
        let mut page_count = 0;

        loop {
            page_count += 1;
            let mut query = pull_request_query();
            query["variables"]["query"] = serde_json::Value::String(search.clone());
            query["variables"]["after"] = match &after_cursor {
                Some(cursor) => serde_json::Value::String(cursor.clone()),
                None => serde_json::Value::Null,
            };

            let response: GraphQLResponse = self
                .octocrab
                .graphql(&query)
                .await
                .with_context(|| format!("Failed to list pull requests for '{repo}'"))?;
            let results = response.data.search;

            pull_requests.extend(
                results
                    .nodes
                    .into_iter()
                    .map(|node| convert_pull_request(&repo, node)),
            );

            if !results.page_info.has_next_page {
                break;
            }

            after_cursor = results.page_info.end_cursor;
            if after_cursor.is_none() {
                break;
            }

            // Safety limit to prevent too many requests.
            if page_count >= 20 {
                break;
            }
        }

        Ok(pull_requests)
    }
}
