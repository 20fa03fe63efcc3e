//! Shared error type across lineflux crates.

use thiserror::Error;

/// Stable error categories (used in logs and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Host metrics could not be read.
    SamplingFailure,
    /// A batch could not be composed.
    BuildFailure,
    /// Network error, timeout or non-success response from the backend.
    PushFailure,
    /// Invalid configuration.
    Config,
    /// Internal error.
    Internal,
}

impl ErrorKind {
    /// String representation used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::SamplingFailure => "SAMPLING_FAILURE",
            ErrorKind::BuildFailure => "BUILD_FAILURE",
            ErrorKind::PushFailure => "PUSH_FAILURE",
            ErrorKind::Config => "CONFIG",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, LineFluxError>;

/// Unified error type used by core and agent.
#[derive(Debug, Error)]
pub enum LineFluxError {
    #[error("sampling failed: {0}")]
    Sampling(String),
    #[error("build failed: {0}")]
    Build(String),
    #[error("push failed: {0}")]
    Push(String),
    #[error("push rejected with status {0}")]
    PushStatus(u16),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl LineFluxError {
    /// Map the error to its stable category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LineFluxError::Sampling(_) => ErrorKind::SamplingFailure,
            LineFluxError::Build(_) => ErrorKind::BuildFailure,
            LineFluxError::Push(_) | LineFluxError::PushStatus(_) => ErrorKind::PushFailure,
            LineFluxError::Config(_) => ErrorKind::Config,
            LineFluxError::Internal(_) => ErrorKind::Internal,
        }
    }
}
