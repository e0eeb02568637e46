//! Engine error types

use thiserror::Error;

/// Errors raised by geometry, physics and configuration operations.
///
/// All of these are caller errors, not transient conditions: nothing retries.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An operation received a value it cannot work with (zero-length vector,
    /// non-finite coordinate, degenerate polygon).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// An internal consistency check failed.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    /// An entity could not be built.
    #[error("construction failure: {0}")]
    ConstructionFailure(String),
    /// Settings could not be parsed or serialized.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
