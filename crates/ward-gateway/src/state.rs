//! Shared handler state.

use std::sync::Arc;
use ward_approvals::ApprovalStore;
use ward_core::WorkspaceRoot;
use ward_policy::Evaluator;
use ward_runlog::RunLog;

/// Environment variable holding the shared dashboard token.
pub const TOKEN_ENV: &str = "WARD_DASHBOARD_TOKEN";

struct Inner {
    evaluator: Evaluator,
    approvals: ApprovalStore,
    run_log: RunLog,
    work_dir: String,
    token: Option<String>,
}

/// Cheaply cloneable state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

impl AppState {
    /// Build state for a workspace. The policy document is loaded once at
    /// startup; the token is read from [`TOKEN_ENV`].
    #[must_use]
    pub fn for_workspace(ws: &WorkspaceRoot) -> Self {
        let token = std::env::var(TOKEN_ENV)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Self {
            inner: Arc::new(Inner {
                evaluator: Evaluator::load_or_default(ws.policy_path()),
                approvals: ApprovalStore::for_workspace(ws),
                run_log: RunLog::for_workspace(ws),
                work_dir: ws.root().display().to_string(),
                token,
            }),
        }
    }

    /// Replace the required token (`None` disables the check).
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.token = token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        }
        self
    }

    /// The policy evaluator.
    #[must_use]
    pub fn evaluator(&self) -> &Evaluator {
        &self.inner.evaluator
    }

    /// The approval store.
    #[must_use]
    pub fn approvals(&self) -> &ApprovalStore {
        &self.inner.approvals
    }

    /// The run log.
    #[must_use]
    pub fn run_log(&self) -> &RunLog {
        &self.inner.run_log
    }

    /// Workspace root path, used as the default repo identifier.
    #[must_use]
    pub fn work_dir(&self) -> &str {
        &self.inner.work_dir
    }

    /// The required dashboard token, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.inner.token.as_deref()
    }
}
