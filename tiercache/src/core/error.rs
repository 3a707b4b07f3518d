use std::time::Duration;
use thiserror::Error;

use super::types::Operation;

/// Main error type for tiercache operations
///
/// A miss is never an error: stores report it as `Ok(None)`. Every variant
/// here is a real failure of the tier that produced it.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: Operation, after: Duration },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Propagation task failed: {0}")]
    TaskFailed(String),

    #[error("No tokio runtime available to run propagation tasks")]
    NoRuntime,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CacheError {
    /// True for failures that are worth retrying (timeouts, lost connections)
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Connection(_))
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<tokio::task::JoinError> for CacheError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            Self::TaskFailed("task was cancelled".to_string())
        } else {
            Self::TaskFailed(err.to_string())
        }
    }
}

/// Result type alias for tiercache operations
pub type Result<T> = std::result::Result<T, CacheError>;
