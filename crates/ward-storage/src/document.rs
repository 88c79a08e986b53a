//! Whole-document JSON persistence with lock-then-atomic-rewrite.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::error::{StorageError, StorageResult};
use crate::lock::AdvisoryLock;

/// Atomically replace `path` with the JSON encoding of `value`.
///
/// Writes to a temporary file in the same directory, restricts permissions
/// to owner-only on unix, then renames over the target. Readers holding the
/// store lock never observe a partially written document.
///
/// # Errors
///
/// Returns [`StorageError::Encode`] if serialization fails, or
/// [`StorageError::Io`] on any filesystem failure.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> StorageResult<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let data = serde_json::to_vec_pretty(value).map_err(StorageError::Encode)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&data)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    tmp.persist(path).map_err(|e| StorageError::Io(e.error))?;
    Ok(())
}

/// A JSON document on disk, guarded by a sibling advisory lock file.
///
/// This is the narrow repository seam the stores build on: `read` observes
/// a consistent snapshot, `update` serializes all mutations across threads
/// and cooperating processes. The whole document is loaded and rewritten on
/// every call, which is O(n) but fine for the tens-to-hundreds of entries
/// these stores hold.
#[derive(Debug)]
pub struct DocumentFile<T> {
    path: PathBuf,
    lock_path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> DocumentFile<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Bind a document file at `path`, locking via `<path>.lock`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_name = path.as_os_str().to_owned();
        lock_name.push(".lock");
        Self {
            lock_path: PathBuf::from(lock_name),
            path,
            _marker: PhantomData,
        }
    }

    /// The document path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document under the lock.
    ///
    /// A missing file yields `T::default()`; corrupt JSON is a
    /// [`StorageError::Corrupt`].
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] on lock, I/O, or parse failure.
    pub fn read(&self) -> StorageResult<T> {
        let _guard = AdvisoryLock::acquire(&self.lock_path)?;
        self.load_unlocked()
    }

    /// Load, mutate, and atomically rewrite the document under the lock.
    ///
    /// The rewrite only happens when `mutate` returns `Ok`; a domain error
    /// from the closure leaves the stored document untouched.
    ///
    /// # Errors
    ///
    /// Propagates the closure's error, or a [`StorageError`] (converted via
    /// `E: From<StorageError>`) on lock, I/O, or parse failure.
    pub fn update<R, E, F>(&self, mutate: F) -> Result<R, E>
    where
        E: From<StorageError>,
        F: FnOnce(&mut T) -> Result<R, E>,
    {
        let _guard = AdvisoryLock::acquire(&self.lock_path).map_err(E::from)?;
        let mut doc = self.load_unlocked().map_err(E::from)?;
        let out = mutate(&mut doc)?;
        write_json_atomic(&self.path, &doc).map_err(E::from)?;
        Ok(out)
    }

    fn load_unlocked(&self) -> StorageResult<T> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(StorageError::Io(e)),
        };
        serde_json::from_slice(&data).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }
}
