//! Storage-related error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the persistence layer.
///
/// These are fatal to the operation that hit them and are surfaced with
/// their underlying cause; the core never retries automatically.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O failure reading or writing a backing file.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to acquire the advisory lock.
    #[error("locking {path}: {source}")]
    Lock {
        /// The lock file path.
        path: PathBuf,
        /// Underlying I/O cause.
        source: std::io::Error,
    },

    /// The backing document exists but is not valid JSON.
    #[error("parsing {path}: {source}")]
    Corrupt {
        /// The document path.
        path: PathBuf,
        /// Underlying parse failure.
        source: serde_json::Error,
    },

    /// Failed to serialize a document for writing.
    #[error("encoding document: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
