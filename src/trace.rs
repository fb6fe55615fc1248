//! Optional observer that prints intermediate pipeline state.
//!
//! Enabled by the trace flag. Printing is its only effect: engine
//! results are identical with tracing on or off.

use crate::{
    registry::{Action, Filter},
    types::PullRequest,
};

#[derive(Debug, Clone, Copy)]
pub struct Tracer {
    enabled: bool,
}

impl Tracer {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// Prints a marker separator line followed by a label.
    pub fn section(&self, marker: &str, label: &str) {
        if !self.enabled {
            return;
        }
        println!("{}", marker.repeat(25));
        println!("{label}");
    }

    pub fn filter(&self, filter: &dyn Filter) {
        if self.enabled {
            println!("{filter:?}");
        }
    }

    pub fn actions(&self, actions: &[Box<dyn Action>]) {
        if !self.enabled {
            return;
        }
        for action in actions {
            println!("{action:?}");
        }
    }

    /// Compact item list, one `number:head-sha:base-branch` line each.
    pub fn items(&self, items: &[PullRequest]) {
        if !self.enabled {
            return;
        }
        for pr in items {
            println!("{}", pr.summary());
        }
    }
}
