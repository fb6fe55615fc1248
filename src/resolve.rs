//! Expands a process item's repository selection into concrete
//! repository names.

use anyhow::Result;
use regex::Regex;

use crate::{config::ProcessItem, error::Error, github::Provider};

/// An explicit non-empty `repositories` list is used verbatim. Failing
/// that, a non-empty `repository_filter` pattern list triggers one
/// repository-listing call against the provider and keeps every name
/// matching at least one pattern. Neither configured yields an empty
/// set, not an error.
pub async fn resolve_repositories<P>(provider: &P, item: &ProcessItem) -> Result<Vec<String>>
where
    P: Provider + Sync,
{
    let config = &item.config;

    if !config.repositories.is_empty() {
        return Ok(config.repositories.clone());
    }

    if config.repository_filter.is_empty() {
        return Ok(Vec::new());
    }

    let patterns = config
        .repository_filter
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| Error::InvalidRepositoryPattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let names = provider.list_repositories(&config.organization).await?;

    Ok(names
        .into_iter()
        .filter(|name| patterns.iter().any(|re| re.is_match(name)))
        .collect())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::types::{ItemState, PullRequest};

    struct FixedProvider {
        repositories: Vec<String>,
    }

    #[async_trait]
    impl Provider for FixedProvider {
        async fn list_repositories(&self, _organization: &str) -> Result<Vec<String>> {
            Ok(self.repositories.clone())
        }

        async fn list_pull_requests(
            &self,
            _organization: &str,
            _repository: &str,
            _state: ItemState,
        ) -> Result<Vec<PullRequest>> {
            Ok(Vec::new())
        }
    }

    fn item(repositories: &[&str], repository_filter: &[&str]) -> ProcessItem {
        serde_json::from_value(serde_json::json!({
            "config": {
                "organization": "acme",
                "repositories": repositories,
                "repository_filter": repository_filter,
            },
        }))
        .unwrap()
    }

    fn provider() -> FixedProvider {
        FixedProvider {
            repositories: vec![
                "widget-core".to_string(),
                "widget-ui".to_string(),
                "gadget".to_string(),
            ],
        }
    }

    #[tokio::test]
    async fn explicit_list_is_used_verbatim() {
        let repos = resolve_repositories(&provider(), &item(&["one", "two"], &["^widget-"]))
            .await
            .unwrap();
        assert_eq!(repos, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn patterns_select_matching_repositories() {
        let repos = resolve_repositories(&provider(), &item(&[], &["^widget-"]))
            .await
            .unwrap();
        assert_eq!(repos, vec!["widget-core", "widget-ui"]);
    }

    #[tokio::test]
    async fn non_matching_patterns_are_silently_empty() {
        let repos = resolve_repositories(&provider(), &item(&[], &["^thingamajig-"]))
            .await
            .unwrap();
        assert!(repos.is_empty());
    }

    #[tokio::test]
    async fn no_selector_yields_no_repositories() {
        let repos = resolve_repositories(&provider(), &item(&[], &[]))
            .await
            .unwrap();
        assert!(repos.is_empty());
    }

    #[tokio::test]
    async fn invalid_pattern_is_a_configuration_error() {
        let err = resolve_repositories(&provider(), &item(&[], &["["]))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidRepositoryPattern { .. })
        ));
    }
}
