//! Configuration error types.

use thiserror::Error;

/// Result type alias for configuration assembly.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while assembling a [`crate::Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no capability probe configured")]
    MissingProbe,

    #[error("auto-detect frequency must be greater than zero")]
    ZeroInterval,

    #[error("invalid labels filter {pattern:?}: {source}")]
    InvalidLabelsFilter {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("settings error: {0}")]
    Settings(#[from] anyhow::Error),
}
