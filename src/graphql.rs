//! GraphQL query and response shapes for pull request listing.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::{ItemState, PullRequest, Repo};

pub fn pull_request_query() -> serde_json::Value {
    serde_json::json!({
        "query": r#"
            query($query: String!, $after: String) {
                search(query: $query, type: ISSUE, first: 100, after: $after) {
                    nodes {
                        ... on PullRequest {
                            number
                            title
                            url
                            state
                            createdAt
                            headRefOid
                            baseRefName
                            author {
                                login
                                __typename
                            }
                            labels(first: 20) {
                                nodes {
                                    name
                                }
                            }
                            statusCheckRollup {
                                state
                            }
                        }
                    }
                    pageInfo {
                        hasNextPage
                        endCursor
                    }
                }
            }
        "#,
        "variables": {}
    })
}

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse {
    pub data: SearchData,
}

#[derive(Debug, Deserialize)]
pub struct SearchData {
    pub search: SearchResults,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub nodes: Vec<GraphQLPullRequest>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLPullRequest {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub head_ref_oid: String,
    pub base_ref_name: String,
    pub author: Option<GraphQLAuthor>,
    pub labels: GraphQLLabelConnection,
    pub status_check_rollup: Option<GraphQLStatusCheckRollup>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLAuthor {
    pub login: String,
    #[serde(rename = "__typename")]
    pub typename: String,
}

impl GraphQLAuthor {
    /// Display form with a bot indicator for app accounts.
    pub fn display_format(&self) -> String {
        match self.typename.as_str() {
            "Bot" | "App" => format!("{}[bot]", self.login),
            _ => self.login.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GraphQLLabelConnection {
    pub nodes: Vec<GraphQLLabel>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLLabel {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLStatusCheckRollup {
    pub state: String,
}

/// Flattens one GraphQL node into the pipeline's pull request record.
pub fn convert_pull_request(repo: &Repo, node: GraphQLPullRequest) -> PullRequest {
    let state = match node.state.as_str() {
        "OPEN" => ItemState::Open,
        _ => ItemState::Closed,
    };

    // Rollup states arrive UPPERCASE (SUCCESS, FAILURE, PENDING, ERROR,
    // EXPECTED); the Status filter compares case-insensitively against
    // the lowercased form.
    let status = node
        .status_check_rollup
        .map(|rollup| rollup.state.to_lowercase())
        .unwrap_or_default();

    PullRequest {
        repo: repo.clone(),
        number: node.number,
        title: node.title,
        author_login: node
            .author
            .map(|author| author.display_format())
            .unwrap_or_else(|| "Unknown".to_string()),
        url: node.url,
        head_sha: node.head_ref_oid,
        base_branch: node.base_ref_name,
        state,
        status,
        labels: node.labels.nodes.into_iter().map(|label| label.name).collect(),
        created_at: node.created_at,
    }
}
