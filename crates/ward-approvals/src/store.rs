//! The durable approval store.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use uuid::Uuid;
use ward_core::WorkspaceRoot;
use ward_storage::DocumentFile;

use crate::error::{ApprovalError, ApprovalResult};
use crate::request::{ApprovalRequest, ApprovalStatus, CreateRequest, DecideRequest};

const DEFAULT_TTL_MINUTES: i64 = 15;

fn default_version() -> u32 {
    1
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    requests: Vec<ApprovalRequest>,
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            version: 1,
            requests: Vec::new(),
        }
    }
}

/// Lock-guarded repository of approval requests.
///
/// Every operation acquires the store's exclusive advisory lock, applies
/// the lazy-expiry pass, then performs the requested read or mutation.
/// Mutations atomically rewrite the whole JSON document before the lock is
/// released, which makes access linearizable across cooperating processes.
#[derive(Debug)]
pub struct ApprovalStore {
    doc: DocumentFile<StoreFile>,
}

impl ApprovalStore {
    /// Bind a store to an explicit document path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            doc: DocumentFile::new(path),
        }
    }

    /// Bind a store to a workspace (`.ward/approvals.json`).
    #[must_use]
    pub fn for_workspace(ws: &WorkspaceRoot) -> Self {
        Self::new(ws.approvals_path())
    }

    /// The backing document path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.doc.path()
    }

    /// Create a new pending approval request.
    ///
    /// TTL defaults to 15 minutes when unset or zero.
    ///
    /// # Errors
    ///
    /// [`ApprovalError::Validation`] on empty command text, or
    /// [`ApprovalError::Storage`] on persistence failure.
    pub fn create(&self, input: CreateRequest) -> ApprovalResult<ApprovalRequest> {
        let command = input.command.trim().to_string();
        if command.is_empty() {
            return Err(ApprovalError::Validation("command is required".to_string()));
        }

        let ttl = input
            .ttl
            .filter(|d| !d.is_zero())
            .and_then(|d| TimeDelta::from_std(d).ok())
            .unwrap_or_else(|| TimeDelta::minutes(DEFAULT_TTL_MINUTES));

        let now = Utc::now();
        let req = ApprovalRequest {
            id: format!("apr-{}", short_id()),
            run_id: input.run_id.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()),
            command_hash: hash_command(&command),
            command,
            class: input.class,
            requested_by: non_empty_or(input.requested_by, "system"),
            repo: input.repo.map(|r| r.trim().to_string()).unwrap_or_default(),
            status: ApprovalStatus::Pending,
            policy_decision: input.policy_decision,
            reason: input.reason.map(|r| r.trim().to_string()).unwrap_or_default(),
            created_at: now,
            expires_at: now + ttl,
            decision_at: None,
            decided_by: String::new(),
            decision_rationale: String::new(),
        };

        let created = req.clone();
        self.doc.update(|sf| {
            expire_pending(sf, now);
            sf.requests.push(req);
            Ok::<_, ApprovalError>(())
        })?;

        tracing::debug!(id = %created.id, class = %created.class, "created approval request");
        Ok(created)
    }

    /// Fetch a single request by id.
    ///
    /// # Errors
    ///
    /// [`ApprovalError::NotFound`] if the id is absent.
    pub fn get(&self, id: &str) -> ApprovalResult<ApprovalRequest> {
        let mut sf = self.doc.read()?;
        expire_pending(&mut sf, Utc::now());

        sf.requests
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| ApprovalError::NotFound { id: id.to_string() })
    }

    /// List requests, newest-created-first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// [`ApprovalError::Storage`] on persistence failure.
    pub fn list(&self, filter: Option<ApprovalStatus>) -> ApprovalResult<Vec<ApprovalRequest>> {
        let mut sf = self.doc.read()?;
        expire_pending(&mut sf, Utc::now());

        let mut out: Vec<ApprovalRequest> = sf
            .requests
            .into_iter()
            .filter(|r| filter.is_none_or(|f| r.status == f))
            .collect();
        // Stable sort: equal creation instants keep insertion order.
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    /// Record a decision on a pending request.
    ///
    /// # Errors
    ///
    /// [`ApprovalError::NotFound`] for an unknown id,
    /// [`ApprovalError::Conflict`] when the request is not pending
    /// (including one that just lazily expired).
    pub fn decide(&self, input: DecideRequest) -> ApprovalResult<ApprovalRequest> {
        let now = Utc::now();
        self.doc.update(|sf| {
            expire_pending(sf, now);
            let Some(req) = sf.requests.iter_mut().find(|r| r.id == input.id) else {
                return Err(ApprovalError::NotFound {
                    id: input.id.clone(),
                });
            };
            if req.status != ApprovalStatus::Pending {
                return Err(ApprovalError::Conflict {
                    id: req.id.clone(),
                    status: req.status,
                    expected: "pending",
                });
            }
            req.status = input.verdict.status();
            req.decided_by = non_empty_or(input.approver.clone(), "operator");
            req.decision_rationale = input
                .rationale
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string();
            req.decision_at = Some(now);
            Ok(req.clone())
        })
    }

    /// Record that a request's command was executed.
    ///
    /// Allowed from `approved` or directly from `pending` (auto-tracked
    /// commands that never required a decision). Optionally attaches or
    /// overwrites the run identifier.
    ///
    /// # Errors
    ///
    /// [`ApprovalError::NotFound`] for an unknown id,
    /// [`ApprovalError::Conflict`] for any other source status.
    pub fn mark_executed(
        &self,
        id: &str,
        run_id: Option<&str>,
    ) -> ApprovalResult<ApprovalRequest> {
        let now = Utc::now();
        self.doc.update(|sf| {
            expire_pending(sf, now);
            let Some(req) = sf.requests.iter_mut().find(|r| r.id == id) else {
                return Err(ApprovalError::NotFound { id: id.to_string() });
            };
            if !matches!(
                req.status,
                ApprovalStatus::Approved | ApprovalStatus::Pending
            ) {
                return Err(ApprovalError::Conflict {
                    id: req.id.clone(),
                    status: req.status,
                    expected: "approved or pending",
                });
            }
            req.status = ApprovalStatus::Executed;
            if let Some(run) = run_id.map(str::trim).filter(|r| !r.is_empty()) {
                req.run_id = Some(run.to_string());
            }
            Ok(req.clone())
        })
    }
}

/// Lazy expiry pass: flip stale pending entries to expired in place.
///
/// Pure with respect to everything but `status`; invoked under the lock at
/// the start of every store operation.
fn expire_pending(sf: &mut StoreFile, now: DateTime<Utc>) {
    for req in &mut sf.requests {
        if req.status == ApprovalStatus::Pending && req.expires_at <= now {
            req.status = ApprovalStatus::Expired;
        }
    }
}

/// Stable content hash of the trimmed command text (hex-encoded SHA-256).
#[must_use]
pub fn hash_command(command: &str) -> String {
    let digest = Sha256::digest(command.trim().as_bytes());
    hex::encode(digest)
}

fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(10);
    id
}

fn non_empty_or(value: Option<String>, fallback: &str) -> String {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => v,
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use ward_core::{Decision, RiskClass};

    fn store(dir: &Path) -> ApprovalStore {
        ApprovalStore::new(dir.join("approvals.json"))
    }

    fn sensitive_push() -> CreateRequest {
        CreateRequest::new(
            "git push origin main",
            RiskClass::Class2Sensitive,
            Decision::RequireApproval,
        )
        .with_requested_by("dashboard")
    }

    #[test]
    fn test_create_and_decide() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());

        let req = store
            .create(sensitive_push().with_run_id("run-1").with_ttl(Duration::from_secs(600)))
            .unwrap();
        assert_eq!(req.status, ApprovalStatus::Pending);
        assert!(req.id.starts_with("apr-"));
        assert_eq!(req.command_hash, hash_command("git push origin main"));

        let got = store
            .decide(
                DecideRequest::new(&req.id, crate::Verdict::Approved)
                    .with_approver("ops")
                    .with_rationale("change window open"),
            )
            .unwrap();
        assert_eq!(got.status, ApprovalStatus::Approved);
        assert_eq!(got.decided_by, "ops");
        assert_eq!(got.decision_rationale, "change window open");
        assert!(got.decision_at.is_some());
    }

    #[test]
    fn test_create_requires_command() {
        let tmp = tempfile::tempdir().unwrap();
        let err = store(tmp.path())
            .create(CreateRequest::new(
                "   ",
                RiskClass::Class0Safe,
                Decision::Allow,
            ))
            .unwrap_err();
        assert!(matches!(err, ApprovalError::Validation(_)));
    }

    #[test]
    fn test_get_round_trips_created_request() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let created = store.create(sensitive_push()).unwrap();
        let got = store.get(&created.id).unwrap();
        assert_eq!(got.id, created.id);
        assert_eq!(got.command, created.command);
        assert_eq!(got.created_at, created.created_at);
        assert_eq!(got.expires_at, created.expires_at);
        assert_eq!(got.status, ApprovalStatus::Pending);
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = store(tmp.path()).get("apr-nope").unwrap_err();
        assert!(matches!(err, ApprovalError::NotFound { .. }));
    }

    #[test]
    fn test_lazy_expiry_on_get() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let req = store
            .create(sensitive_push().with_ttl(Duration::from_millis(1)))
            .unwrap();

        std::thread::sleep(Duration::from_millis(5));
        let got = store.get(&req.id).unwrap();
        assert_eq!(got.status, ApprovalStatus::Expired);
    }

    #[test]
    fn test_decide_expired_is_conflict_and_leaves_record() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let req = store
            .create(sensitive_push().with_ttl(Duration::from_millis(1)))
            .unwrap();
        std::thread::sleep(Duration::from_millis(5));

        let err = store
            .decide(DecideRequest::new(&req.id, crate::Verdict::Approved))
            .unwrap_err();
        assert!(matches!(err, ApprovalError::Conflict { .. }));

        let got = store.get(&req.id).unwrap();
        assert_eq!(got.status, ApprovalStatus::Expired);
        assert!(got.decision_at.is_none());
    }

    #[test]
    fn test_decide_twice_is_conflict() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let req = store.create(sensitive_push()).unwrap();
        store
            .decide(DecideRequest::new(&req.id, crate::Verdict::Denied))
            .unwrap();

        let err = store
            .decide(DecideRequest::new(&req.id, crate::Verdict::Approved))
            .unwrap_err();
        assert!(matches!(
            err,
            ApprovalError::Conflict {
                status: ApprovalStatus::Denied,
                ..
            }
        ));
    }

    #[test]
    fn test_default_decider_is_operator() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let req = store.create(sensitive_push()).unwrap();
        let got = store
            .decide(DecideRequest::new(&req.id, crate::Verdict::Approved))
            .unwrap();
        assert_eq!(got.decided_by, "operator");
    }

    #[test]
    fn test_mark_executed_from_approved_and_pending() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());

        let a = store.create(sensitive_push()).unwrap();
        store
            .decide(DecideRequest::new(&a.id, crate::Verdict::Approved))
            .unwrap();
        let done = store.mark_executed(&a.id, Some("run-42")).unwrap();
        assert_eq!(done.status, ApprovalStatus::Executed);
        assert_eq!(done.run_id.as_deref(), Some("run-42"));

        // Direct pending -> executed stays allowed.
        let b = store.create(sensitive_push()).unwrap();
        let done = store.mark_executed(&b.id, None).unwrap();
        assert_eq!(done.status, ApprovalStatus::Executed);
    }

    #[test]
    fn test_mark_executed_from_denied_is_conflict() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let req = store.create(sensitive_push()).unwrap();
        store
            .decide(DecideRequest::new(&req.id, crate::Verdict::Denied))
            .unwrap();
        let err = store.mark_executed(&req.id, None).unwrap_err();
        assert!(matches!(err, ApprovalError::Conflict { .. }));
    }

    #[test]
    fn test_list_newest_first_and_filtered() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());

        let first = store.create(sensitive_push()).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        let second = store.create(sensitive_push()).unwrap();
        store
            .decide(DecideRequest::new(&second.id, crate::Verdict::Approved))
            .unwrap();

        let all = store.list(None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[1].id, first.id);

        let pending = store.list(Some(ApprovalStatus::Pending)).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, first.id);

        // Idempotent absent intervening writes.
        let again = store.list(None).unwrap();
        assert_eq!(
            again.iter().map(|r| r.id.clone()).collect::<Vec<_>>(),
            all.iter().map(|r| r.id.clone()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_concurrent_creates_are_all_persisted() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("approvals.json");

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let path = path.clone();
                std::thread::spawn(move || {
                    ApprovalStore::new(path).create(
                        CreateRequest::new(
                            format!("git push origin branch-{i}"),
                            RiskClass::Class2Sensitive,
                            Decision::RequireApproval,
                        ),
                    )
                })
            })
            .collect();
        let mut ids = Vec::new();
        for h in handles {
            ids.push(h.join().unwrap().unwrap().id);
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 10);

        let all = ApprovalStore::new(path).list(None).unwrap();
        assert_eq!(all.len(), 10);
    }

    #[test]
    fn test_hash_command_is_stable_and_trimmed() {
        assert_eq!(hash_command("git push"), hash_command("  git push  "));
        assert_ne!(hash_command("git push"), hash_command("git pull"));
        assert_eq!(hash_command("x").len(), 64);
    }
}
