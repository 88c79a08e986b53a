//! Approval request types and lifecycle states.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use ward_core::{Decision, RiskClass};

/// Lifecycle status of an approval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Awaiting a decision.
    Pending,
    /// A human approved the command.
    Approved,
    /// A human denied the command. Terminal.
    Denied,
    /// The TTL elapsed before a decision. Terminal.
    Expired,
    /// The command was executed.
    Executed,
}

impl ApprovalStatus {
    /// Stable wire string for this status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
            Self::Expired => "expired",
            Self::Executed => "executed",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "denied" => Ok(Self::Denied),
            "expired" => Ok(Self::Expired),
            "executed" => Ok(Self::Executed),
            other => Err(format!("unknown approval status {other:?}")),
        }
    }
}

/// The two verdicts a decider can record on a pending request.
///
/// Modeled as its own type so an invalid decision value is unrepresentable
/// past the CLI/HTTP parsing boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Approve the command.
    Approved,
    /// Deny the command.
    Denied,
}

impl Verdict {
    /// The status this verdict transitions a pending request into.
    #[must_use]
    pub fn status(self) -> ApprovalStatus {
        match self {
            Self::Approved => ApprovalStatus::Approved,
            Self::Denied => ApprovalStatus::Denied,
        }
    }
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "approve" | "approved" => Ok(Self::Approved),
            "deny" | "denied" => Ok(Self::Denied),
            _ => Err("decision must be approve or deny".to_string()),
        }
    }
}

/// One command instance awaiting (or past) human sign-off.
///
/// `created_at` and `expires_at` are immutable once set; the decision
/// fields are write-once, filled by the transition that sets them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRequest {
    /// Stable identifier (`apr-` plus a short random hex suffix).
    pub id: String,
    /// Associated execution run, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    /// The command text under governance.
    pub command: String,
    /// Stable content hash of the trimmed command, for dedup/audit
    /// correlation. Never enforced unique.
    pub command_hash: String,
    /// Risk class assessed at creation.
    pub class: RiskClass,
    /// Who asked for the command to run.
    pub requested_by: String,
    /// Normalized repository identifier.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repo: String,
    /// Current lifecycle status.
    pub status: ApprovalStatus,
    /// The evaluator's original decision.
    pub policy_decision: Decision,
    /// Reason carried from evaluation or supplied by the requester.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Instant after which a still-pending request expires.
    pub expires_at: DateTime<Utc>,
    /// When the decision was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_at: Option<DateTime<Utc>>,
    /// Who decided.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub decided_by: String,
    /// Why they decided that way.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub decision_rationale: String,
}

/// Input for creating an approval request.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    /// Associated run identifier.
    pub run_id: Option<String>,
    /// Command text (required).
    pub command: String,
    /// Risk class from evaluation.
    pub class: RiskClass,
    /// Requester identity; defaults to `"system"`.
    pub requested_by: Option<String>,
    /// Normalized repository identifier.
    pub repo: Option<String>,
    /// The evaluator's decision for the command.
    pub policy_decision: Decision,
    /// Reason text for the audit trail.
    pub reason: Option<String>,
    /// Time-to-live; `None` or zero falls back to 15 minutes.
    pub ttl: Option<Duration>,
}

impl CreateRequest {
    /// Create input for a command with its evaluation outcome.
    #[must_use]
    pub fn new(command: impl Into<String>, class: RiskClass, policy_decision: Decision) -> Self {
        Self {
            run_id: None,
            command: command.into(),
            class,
            requested_by: None,
            repo: None,
            policy_decision,
            reason: None,
            ttl: None,
        }
    }

    /// Attach a run identifier.
    #[must_use]
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    /// Set the requester identity.
    #[must_use]
    pub fn with_requested_by(mut self, requested_by: impl Into<String>) -> Self {
        self.requested_by = Some(requested_by.into());
        self
    }

    /// Set the repository identifier.
    #[must_use]
    pub fn with_repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = Some(repo.into());
        self
    }

    /// Set the reason text.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Set the time-to-live.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

/// Input for recording a decision on a pending request.
#[derive(Debug, Clone)]
pub struct DecideRequest {
    /// The request to decide.
    pub id: String,
    /// Approve or deny.
    pub verdict: Verdict,
    /// Decider identity; defaults to `"operator"`.
    pub approver: Option<String>,
    /// Decision rationale.
    pub rationale: Option<String>,
}

impl DecideRequest {
    /// Create a decision input.
    #[must_use]
    pub fn new(id: impl Into<String>, verdict: Verdict) -> Self {
        Self {
            id: id.into(),
            verdict,
            approver: None,
            rationale: None,
        }
    }

    /// Set the decider identity.
    #[must_use]
    pub fn with_approver(mut self, approver: impl Into<String>) -> Self {
        self.approver = Some(approver.into());
        self
    }

    /// Set the rationale.
    #[must_use]
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_strings() {
        assert_eq!(
            serde_json::to_string(&ApprovalStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!("executed".parse::<ApprovalStatus>().unwrap(), ApprovalStatus::Executed);
        assert!("done".parse::<ApprovalStatus>().is_err());
    }

    #[test]
    fn test_verdict_parsing_accepts_both_forms() {
        assert_eq!("approve".parse::<Verdict>().unwrap(), Verdict::Approved);
        assert_eq!("Approved".parse::<Verdict>().unwrap(), Verdict::Approved);
        assert_eq!("deny".parse::<Verdict>().unwrap(), Verdict::Denied);
        assert_eq!("denied".parse::<Verdict>().unwrap(), Verdict::Denied);
        assert!("expire".parse::<Verdict>().is_err());
    }

    #[test]
    fn test_verdict_target_status() {
        assert_eq!(Verdict::Approved.status(), ApprovalStatus::Approved);
        assert_eq!(Verdict::Denied.status(), ApprovalStatus::Denied);
    }
}
