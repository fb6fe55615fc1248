use thiserror::Error;

/// Typed failures raised by the pipeline core.
///
/// All of these are fatal: the run aborts on the first one. They travel
/// through `anyhow::Result` so callers can still downcast to the
/// concrete variant.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown filter type '{0}'")]
    UnknownFilterType(String),

    #[error("unknown action type '{0}'")]
    UnknownActionType(String),

    #[error("invalid configuration for {kind} '{name}': {message}")]
    InvalidCapabilityConfig {
        kind: &'static str,
        name: &'static str,
        message: String,
    },

    #[error("invalid repository pattern '{pattern}': {source}")]
    InvalidRepositoryPattern {
        pattern: String,
        source: regex::Error,
    },

    /// A filter returned white/black lists that are not a disjoint,
    /// complete split of its input.
    #[error("filter {filter} broke the partition contract: {detail}")]
    PartitionViolation { filter: String, detail: String },
}

impl Error {
    pub(crate) fn invalid_config(
        kind: &'static str,
        name: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Error::InvalidCapabilityConfig {
            kind,
            name,
            message: message.into(),
        }
    }
}
