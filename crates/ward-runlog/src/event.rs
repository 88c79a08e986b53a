//! Run event type and identifier helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// One append-only audit event in a command run's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    /// Unique event identifier (`evt-` plus a short random hex suffix).
    /// Filled on append when empty.
    #[serde(default)]
    pub event_id: String,
    /// The run this event belongs to.
    pub run_id: String,
    /// Owning tenant, if the deployment is multi-tenant.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tenant_id: String,
    /// Acting agent, if known.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub agent_id: String,
    /// Run state at the time of the event.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub state: String,
    /// Policy decision associated with the event, if any.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub policy_decision: String,
    /// Attempt number for retried commands.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub attempt: u32,
    /// What happened (`approval_requested`, `command_started`, ...).
    pub event_type: String,
    /// Free-form structured detail. Redacted on append and on read.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub payload: Map<String, Value>,
    /// When the event happened. Filled on append when unset.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(v: &u32) -> bool {
    *v == 0
}

impl RunEvent {
    /// Create an event for a run with an event type; all other fields
    /// start empty.
    #[must_use]
    pub fn new(run_id: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            event_id: String::new(),
            run_id: run_id.into(),
            tenant_id: String::new(),
            agent_id: String::new(),
            state: String::new(),
            policy_decision: String::new(),
            attempt: 0,
            event_type: event_type.into(),
            payload: Map::new(),
            timestamp: None,
        }
    }

    /// Set the owning tenant.
    #[must_use]
    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = tenant_id.into();
        self
    }

    /// Set the acting agent.
    #[must_use]
    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = agent_id.into();
        self
    }

    /// Set the run state.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    /// Set the associated policy decision.
    #[must_use]
    pub fn with_policy_decision(mut self, decision: impl Into<String>) -> Self {
        self.policy_decision = decision.into();
        self
    }

    /// Add one payload entry.
    #[must_use]
    pub fn with_payload_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }
}

/// Mint a fresh run identifier: `run-<utc stamp>-<12 hex>`.
///
/// The UTC stamp (`%Y%m%dt%H%M%S`) keeps identifiers roughly sortable by
/// creation time while the random suffix keeps them unique.
#[must_use]
pub fn new_run_id() -> String {
    let stamp = Utc::now().format("%Y%m%dt%H%M%S");
    let mut suffix = Uuid::new_v4().simple().to_string();
    suffix.truncate(12);
    format!("run-{stamp}-{suffix}")
}

pub(crate) fn new_event_id() -> String {
    let mut suffix = Uuid::new_v4().simple().to_string();
    suffix.truncate(10);
    format!("evt-{suffix}")
}
