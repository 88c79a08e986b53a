//! Run log error types.

use thiserror::Error;
use ward_storage::StorageError;

/// Errors from run log operations.
#[derive(Debug, Error)]
pub enum RunLogError {
    /// A required event field was missing or empty.
    #[error("{0}")]
    Validation(String),

    /// Failed to serialize an event for appending.
    #[error("encoding run event: {0}")]
    Encode(#[from] serde_json::Error),

    /// Lock or I/O failure in the persistence layer.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// I/O failure reading or appending the log file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for run log operations.
pub type RunLogResult<T> = Result<T, RunLogError>;
