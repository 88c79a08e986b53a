//! Policy rule documents loaded from `.ward/policy.json`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use ward_core::{Decision, RiskClass};

fn default_version() -> u32 {
    1
}

/// An externally loaded set of decision overrides.
///
/// Rules are ordered; the first enabled, matching rule wins. When no rule
/// matches, `default_decision` (if set) replaces the classifier's base
/// decision without changing the class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document format version.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Decision applied when no rule matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_decision: Option<Decision>,
    /// Ordered override rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            version: 1,
            default_decision: None,
            rules: Vec::new(),
        }
    }
}

/// A single conditional decision override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Stable rule identifier, echoed in evaluation results.
    pub id: String,
    /// Decision applied when the rule matches.
    pub decision: Decision,
    /// Reason text replacing the classifier's (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Conjunctive match predicate.
    #[serde(rename = "match", default)]
    pub matcher: RuleMatch,
    /// Explicit enable flag; absent means enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Expiry timestamp; the rule is skipped after this instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
}

/// Command metadata predicates. All present predicates must hold; empty
/// lists impose no constraint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleMatch {
    /// Glob-style agent patterns (`exact`, `*`, `prefix*`, `*.suffix`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<String>,
    /// Glob-style repo patterns.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repos: Vec<String>,
    /// Literal lowercase command prefixes (any may match).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command_prefixes: Vec<String>,
    /// Regex the normalized command must match. A malformed regex makes the
    /// rule non-matching, never fatal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_regex: Option<String>,
    /// Risk classes the rule is restricted to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<RiskClass>,
}

/// Errors loading a rule document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document file could not be read.
    #[error("reading policy document: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid JSON.
    #[error("parsing policy document: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Document {
    /// Load a rule document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] on read or parse failure. Callers that
    /// want the degrade-to-default behavior use
    /// [`Evaluator::load_or_default`](crate::Evaluator::load_or_default).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let data = std::fs::read(path.as_ref())?;
        Ok(serde_json::from_slice(&data)?)
    }
}
