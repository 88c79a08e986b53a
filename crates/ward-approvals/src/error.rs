//! Approval-related error types.

use thiserror::Error;
use ward_storage::StorageError;

use crate::request::ApprovalStatus;

/// Errors from the approval store.
#[derive(Debug, Error)]
pub enum ApprovalError {
    /// Input rejected before touching the store; not retryable as-is.
    #[error("{0}")]
    Validation(String),

    /// No request with the given id exists.
    #[error("approval {id:?} not found")]
    NotFound {
        /// The id that was looked up.
        id: String,
    },

    /// The request is not in the state the operation requires. The caller
    /// must re-fetch current state before retrying.
    #[error("approval {id} is {status} (expected {expected})")]
    Conflict {
        /// The request id.
        id: String,
        /// Its current status.
        status: ApprovalStatus,
        /// The status the operation required.
        expected: &'static str,
    },

    /// Lock, I/O, or document-corruption failure in the persistence layer.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for approval operations.
pub type ApprovalResult<T> = Result<T, ApprovalError>;
