//! Append-only JSONL storage for run events.

use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use ward_core::WorkspaceRoot;
use ward_storage::AdvisoryLock;

use crate::error::{RunLogError, RunLogResult};
use crate::event::{RunEvent, new_event_id};
use crate::redact::redact_payload;

/// Handle to the workspace run log (`.ward/run-events.jsonl`).
///
/// Appends and reads serialize through the file's sibling `.lock`, so a
/// reader never observes a half-written line from a cooperating process.
#[derive(Debug)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// Bind a run log to an explicit file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Bind a run log to a workspace.
    #[must_use]
    pub fn for_workspace(ws: &WorkspaceRoot) -> Self {
        Self::new(ws.run_log_path())
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut p = self.path.clone().into_os_string();
        p.push(".lock");
        PathBuf::from(p)
    }

    /// Append one event to the log.
    ///
    /// Fills `event_id` and `timestamp` when unset and redacts the payload
    /// before anything touches disk.
    ///
    /// # Errors
    ///
    /// [`RunLogError::Validation`] when `run_id` or `event_type` is empty,
    /// otherwise lock, encoding, or I/O failures.
    pub fn append(&self, mut event: RunEvent) -> RunLogResult<()> {
        if event.run_id.trim().is_empty() {
            return Err(RunLogError::Validation("run_id is required".to_string()));
        }
        if event.event_type.trim().is_empty() {
            return Err(RunLogError::Validation(
                "event_type is required".to_string(),
            ));
        }
        if event.event_id.is_empty() {
            event.event_id = new_event_id();
        }
        if event.timestamp.is_none() {
            event.timestamp = Some(Utc::now());
        }
        event.payload = redact_payload(event.payload);

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(RunLogError::Io)?;
        }

        let mut line = serde_json::to_vec(&event)?;
        line.push(b'\n');

        let _lock = AdvisoryLock::acquire(&self.lock_path())?;
        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;
        file.write_all(&line)?;

        tracing::trace!(
            run_id = %event.run_id,
            event_type = %event.event_type,
            "appended run event"
        );
        Ok(())
    }

    /// Read all events for one run, ordered by timestamp (stable, so
    /// equal-timestamp events keep append order).
    ///
    /// Blank, malformed, and non-UTF-8 lines are skipped, never reported:
    /// partial damage must not hide the remaining history. Payloads are redacted
    /// again on the way out to sanitize pre-redaction history.
    ///
    /// # Errors
    ///
    /// [`RunLogError::Validation`] when `run_id` is empty, otherwise lock
    /// or I/O failures. A missing log file yields an empty list.
    pub fn read_run(&self, run_id: &str) -> RunLogResult<Vec<RunEvent>> {
        if run_id.trim().is_empty() {
            return Err(RunLogError::Validation("run id is required".to_string()));
        }
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let _lock = AdvisoryLock::acquire(&self.lock_path())?;
        let data = fs::read(&self.path)?;

        let mut out = Vec::new();
        for line in data.split(|b| *b == b'\n') {
            // Lines are decoded individually so one torn or non-UTF-8
            // line cannot take the rest of the history with it.
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            let Ok(mut event) = serde_json::from_slice::<RunEvent>(line) else {
                continue;
            };
            if event.run_id == run_id {
                event.payload = redact_payload(event.payload);
                out.push(event);
            }
        }

        out.sort_by_key(|e| e.timestamp);
        Ok(out)
    }
}
