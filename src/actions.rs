//! Built-in action kinds.
//!
//! Actions emit `gh` CLI commands on stdout, one per affected pull
//! request, so a run's side effects can be reviewed or piped into a
//! shell. Under the dry-run flag they log the command instead.

use anyhow::Result;
use serde_json::Value;

use crate::{
    config::ParamMap,
    error::Error,
    registry::Action,
    types::{Metadata, PullRequest},
};

fn emit(meta: &Metadata, command: &str) {
    if meta.dry_run {
        tracing::info!("dry-run: {command}");
    } else {
        println!("{command}");
    }
}

fn emit_comment(meta: &Metadata, pr: &PullRequest, body: &str) {
    emit(
        meta,
        &format!(
            "gh pr comment {} --repo {} --body \"{}\"",
            pr.number, meta.org_repo, body
        ),
    );
}

macro_rules! comment_action {
    ($vis:vis $ty:ident, $body:expr, $only_if:expr) => {
        #[derive(Debug)]
        $vis struct $ty {
            meta: Metadata,
        }

        impl $ty {
            pub fn from_config(meta: &Metadata, _params: &ParamMap) -> Result<Box<dyn Action>> {
                Ok(Box::new(Self { meta: meta.clone() }))
            }
        }

        impl Action for $ty {
            fn run(&self, items: &[PullRequest]) -> Result<()> {
                for pr in items.iter().filter(|pr| ($only_if)(*pr)) {
                    emit_comment(&self.meta, pr, $body);
                }
                Ok(())
            }
        }
    };
}

comment_action!(pub ApproveAction, "/approve", |pr: &PullRequest| !pr
    .has_label("approved"));

comment_action!(pub LgtmAction, "/lgtm", |pr: &PullRequest| !pr
    .has_label("lgtm"));

comment_action!(pub OkToTestAction, "/ok-to-test", |pr: &PullRequest| pr
    .has_label("needs-ok-to-test"));

comment_action!(pub RetestAction, "/retest", |_pr: &PullRequest| true);

/// Posts a configured comment body on every pull request in the set.
#[derive(Debug)]
pub struct CommentAction {
    meta: Metadata,
    body: String,
}

impl CommentAction {
    pub fn from_config(meta: &Metadata, params: &ParamMap) -> Result<Box<dyn Action>> {
        let body = match params.get("body") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(Error::invalid_config(
                    "action",
                    "Comment",
                    format!("'body' must be a string, got {other}"),
                )
                .into());
            }
            None => return Err(Error::invalid_config("action", "Comment", "missing 'body'").into()),
        };
        Ok(Box::new(Self {
            meta: meta.clone(),
            body,
        }))
    }
}

impl Action for CommentAction {
    fn run(&self, items: &[PullRequest]) -> Result<()> {
        for pr in items {
            emit_comment(&self.meta, pr, &self.body);
        }
        Ok(())
    }
}

/// Closes every pull request in the set.
#[derive(Debug)]
pub struct CloseAction {
    meta: Metadata,
}

impl CloseAction {
    pub fn from_config(meta: &Metadata, _params: &ParamMap) -> Result<Box<dyn Action>> {
        Ok(Box::new(Self { meta: meta.clone() }))
    }
}

impl Action for CloseAction {
    fn run(&self, items: &[PullRequest]) -> Result<()> {
        for pr in items {
            emit(
                &self.meta,
                &format!("gh pr close {} --repo {}", pr.number, self.meta.org_repo),
            );
        }
        Ok(())
    }
}
