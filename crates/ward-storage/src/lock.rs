//! Exclusive advisory file locking.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::{StorageError, StorageResult};

/// An exclusive advisory lock held over a named lock file.
///
/// Acquisition blocks until the lock is free; there is no timeout and no
/// cancellation. The lock is released when the guard drops (or when the
/// holding process exits, on platforms where the OS releases file locks).
#[derive(Debug)]
pub struct AdvisoryLock {
    file: File,
    path: PathBuf,
}

impl AdvisoryLock {
    /// Acquire the exclusive lock at `path`, creating the lock file and any
    /// missing parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Lock`] if the lock file cannot be opened or
    /// the lock syscall fails.
    pub fn acquire(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| StorageError::Lock {
                path: path.to_path_buf(),
                source,
            })?;

        file.lock_exclusive().map_err(|source| StorageError::Lock {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::trace!(path = %path.display(), "acquired advisory lock");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// The lock file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for AdvisoryLock {
    fn drop(&mut self) {
        // Best effort; the OS also releases the lock on process exit.
        let _ = FileExt::unlock(&self.file);
    }
}
