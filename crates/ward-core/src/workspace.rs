//! Workspace discovery and `.ward/` directory layout.
//!
//! A Ward workspace is any directory containing a `.ward/` control
//! directory. All governed state lives inside it:
//!
//! ```text
//! <workspace>/.ward/
//! ├── policy.json             (optional rule document)
//! ├── approvals.json          (approval store, atomically rewritten)
//! ├── approvals.json.lock     (advisory lock file)
//! ├── run-events.jsonl        (append-only run log)
//! └── run-events.jsonl.lock   (advisory lock file)
//! ```
//!
//! Discovery walks up from a starting directory until a `.ward/` directory
//! is found, so commands work from anywhere inside the project.

use std::io;
use std::path::{Path, PathBuf};

/// Name of the per-project control directory.
pub const CONTROL_DIR: &str = ".ward";

/// Root of a Ward workspace (the directory that contains `.ward/`).
#[derive(Debug, Clone)]
pub struct WorkspaceRoot {
    root: PathBuf,
}

impl WorkspaceRoot {
    /// Create from an explicit root path (useful for testing).
    #[must_use]
    pub fn from_path(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Discover the workspace root by walking up from the current directory.
    ///
    /// Returns `Ok(None)` when no ancestor contains a `.ward/` directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn discover() -> io::Result<Option<Self>> {
        let cwd = std::env::current_dir()?;
        Ok(Self::discover_from(&cwd))
    }

    /// Discover the workspace root by walking up from `start`.
    #[must_use]
    pub fn discover_from(start: &Path) -> Option<Self> {
        let mut dir = Some(start);
        while let Some(d) = dir {
            if d.join(CONTROL_DIR).is_dir() {
                return Some(Self::from_path(d));
            }
            dir = d.parent();
        }
        None
    }

    /// Ensure the control directory exists with owner-only permissions.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or permission setting fails.
    pub fn ensure(&self) -> io::Result<()> {
        std::fs::create_dir_all(self.control_dir())?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            std::fs::set_permissions(self.control_dir(), perms)?;
        }
        Ok(())
    }

    /// Workspace root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `.ward/` control directory.
    #[must_use]
    pub fn control_dir(&self) -> PathBuf {
        self.root.join(CONTROL_DIR)
    }

    /// Path to the optional policy rule document.
    #[must_use]
    pub fn policy_path(&self) -> PathBuf {
        self.control_dir().join("policy.json")
    }

    /// Path to the approval store document.
    #[must_use]
    pub fn approvals_path(&self) -> PathBuf {
        self.control_dir().join("approvals.json")
    }

    /// Path to the append-only run event log.
    #[must_use]
    pub fn run_log_path(&self) -> PathBuf {
        self.control_dir().join("run-events.jsonl")
    }
}
