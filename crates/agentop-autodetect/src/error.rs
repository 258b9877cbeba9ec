//! Auto-detection error types.

use std::fmt;

use thiserror::Error;

/// Result type alias for detection passes.
pub type AutodetectResult<T> = Result<T, AutodetectError>;

/// Result type alias for capability probe queries.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// A capability probe could not answer its query.
///
/// Treated as transient: the next periodic pass asks again.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ProbeError {
    message: String,
}

impl ProbeError {
    /// Create a probe error with a human-readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message the probe reported.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors returned by a detection pass.
#[derive(Debug, Error)]
pub enum AutodetectError {
    #[error("routes availability probe failed: {0}")]
    RoutesProbe(ProbeError),

    #[error("autoscaling version probe failed: {0}")]
    AutoscalingProbe(ProbeError),
}

/// One failed change callback, identified by its registration index.
#[derive(Debug)]
pub struct CallbackFailure {
    pub index: usize,
    pub error: anyhow::Error,
}

/// Every callback that failed during a single notification round.
///
/// Failures are kept in registration order.
#[derive(Debug)]
pub struct CallbackError {
    pub failures: Vec<CallbackFailure>,
    pub total: usize,
}

impl CallbackError {
    /// The earliest-registered failing callback.
    pub fn first(&self) -> Option<&CallbackFailure> {
        self.failures.first()
    }
}

impl fmt::Display for CallbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} change callbacks failed",
            self.failures.len(),
            self.total
        )?;
        if let Some(first) = self.first() {
            write!(f, "; callback #{}: {:#}", first.index, first.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for CallbackError {}
