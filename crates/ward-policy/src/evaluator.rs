//! The policy evaluator: classification plus rule overlay.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use ward_core::{Decision, RiskClass};

use crate::classify::{classify_command, normalize_command};
use crate::document::{Document, Rule, RuleMatch};

/// A proposed command to evaluate. Immutable, constructed per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalRequest {
    /// Agent identity issuing the command.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub agent: String,
    /// Normalized repository identifier (see [`crate::normalize_repo`]).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repo: String,
    /// Raw command text.
    pub command: String,
    /// Argument list, used when `command` is empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Requester identity, for the audit trail.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub requested_by: String,
    /// Evaluation instant; rule expiry is judged against this. Defaults to
    /// now when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl EvalRequest {
    /// Create a request for a raw command string.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            agent: String::new(),
            repo: String::new(),
            command: command.into(),
            args: Vec::new(),
            requested_by: String::new(),
            timestamp: None,
        }
    }

    /// Set the issuing agent.
    #[must_use]
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = agent.into();
        self
    }

    /// Set the repository identifier.
    #[must_use]
    pub fn with_repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = repo.into();
        self
    }

    /// Set the argument list.
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Set the requester identity.
    #[must_use]
    pub fn with_requested_by(mut self, requested_by: impl Into<String>) -> Self {
        self.requested_by = requested_by.into();
        self
    }

    /// Pin the evaluation timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// The policy decision for a command. Derived, never persisted by the
/// evaluator itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalResult {
    /// Governance outcome.
    pub decision: Decision,
    /// Assessed risk class.
    pub class: RiskClass,
    /// Human-readable reason.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    /// Identifier of the rule that overrode the base decision, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
}

/// Evaluates commands against default classification plus document rules.
///
/// Stateless apart from the loaded document; safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    doc: Document,
}

impl Evaluator {
    /// Create an evaluator from an explicit document.
    #[must_use]
    pub fn new(doc: Document) -> Self {
        Self { doc }
    }

    /// Load the rule document at `path`, degrading to a zero-rule
    /// evaluator when the file is absent or unparseable.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Document::load(path.as_ref()) {
            Ok(doc) => Self::new(doc),
            Err(e) => {
                tracing::debug!(
                    path = %path.as_ref().display(),
                    error = %e,
                    "no usable policy document, using defaults"
                );
                Self::default()
            },
        }
    }

    /// Apply risk classification and policy rules to a command.
    ///
    /// Always succeeds: absence of input is handled by classification
    /// (an empty command classifies as critical), not by rejection.
    #[must_use]
    pub fn evaluate(&self, req: &EvalRequest) -> EvalResult {
        let (class, class_reason) = classify_command(&req.command, &req.args);
        let mut result = EvalResult {
            decision: class.default_decision(),
            class,
            reason: class_reason.to_string(),
            rule_id: None,
        };

        if self.doc.rules.is_empty() {
            return result;
        }

        let now = req.timestamp.unwrap_or_else(Utc::now);

        for rule in &self.doc.rules {
            if !rule_enabled(rule, now) {
                continue;
            }
            if !rule_matches(&rule.matcher, req, class) {
                continue;
            }
            result.decision = rule.decision;
            result.rule_id = Some(rule.id.clone());
            if let Some(reason) = &rule.reason {
                if !reason.is_empty() {
                    result.reason.clone_from(reason);
                }
            }
            return result;
        }

        if let Some(default) = self.doc.default_decision {
            result.decision = default;
        }
        result
    }
}

fn rule_enabled(rule: &Rule, now: DateTime<Utc>) -> bool {
    if rule.enabled == Some(false) {
        return false;
    }
    if let Some(until) = rule.until {
        if now > until {
            return false;
        }
    }
    true
}

fn rule_matches(matcher: &RuleMatch, req: &EvalRequest, class: RiskClass) -> bool {
    if !matcher.classes.is_empty() && !matcher.classes.contains(&class) {
        return false;
    }
    if !matcher.agents.is_empty() && !matches_pattern_list(&matcher.agents, &req.agent) {
        return false;
    }
    if !matcher.repos.is_empty() && !matches_pattern_list(&matcher.repos, &req.repo) {
        return false;
    }

    let command = normalize_command(&req.command, &req.args);
    if !matcher.command_prefixes.is_empty() {
        let ok = matcher.command_prefixes.iter().any(|prefix| {
            let p = prefix.trim().to_lowercase();
            !p.is_empty() && command.starts_with(&p)
        });
        if !ok {
            return false;
        }
    }

    if let Some(raw) = &matcher.command_regex {
        if !raw.is_empty() {
            // A malformed regex makes the rule non-matching, never fatal.
            let matched = Regex::new(raw).map(|re| re.is_match(&command));
            if !matched.unwrap_or(false) {
                return false;
            }
        }
    }

    true
}

/// Glob-subset matching over a pattern list: exact string, `*`
/// (wildcard-all), `prefix*`, and `*.suffix`. Comparison is lowercase and
/// trimmed; an empty value matches nothing.
fn matches_pattern_list(patterns: &[String], value: &str) -> bool {
    let v = value.trim().to_lowercase();
    if v.is_empty() {
        return false;
    }
    for raw in patterns {
        let p = raw.trim().to_lowercase();
        if p.is_empty() {
            continue;
        }
        if p == "*" || p == v {
            return true;
        }
        if let Some(suffix) = p.strip_prefix("*.") {
            if v.ends_with(&format!(".{suffix}")) {
                return true;
            }
        }
        if let Some(prefix) = p.strip_suffix('*') {
            if v.starts_with(prefix) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn rule(id: &str, matcher: RuleMatch) -> Rule {
        Rule {
            id: id.to_string(),
            decision: Decision::AllowWithJustification,
            reason: None,
            matcher,
            enabled: Some(true),
            until: None,
        }
    }

    #[test]
    fn test_zero_rule_document_uses_base_mapping() {
        let e = Evaluator::default();
        let result = e.evaluate(&EvalRequest::new("git status"));
        assert_eq!(result.class, RiskClass::Class0Safe);
        assert_eq!(result.decision, Decision::Allow);
        assert!(result.rule_id.is_none());

        let result = e.evaluate(&EvalRequest::new("rm -rf /"));
        assert_eq!(result.decision, Decision::Deny);
    }

    #[test]
    fn test_rule_override_records_rule_id() {
        let e = Evaluator::new(Document {
            rules: vec![rule(
                "allow-push-for-releaser",
                RuleMatch {
                    agents: vec!["releaser".to_string()],
                    command_prefixes: vec!["git push".to_string()],
                    ..RuleMatch::default()
                },
            )],
            ..Document::default()
        });

        let got = e.evaluate(&EvalRequest::new("git push origin main").with_agent("releaser"));
        assert_eq!(got.decision, Decision::AllowWithJustification);
        assert_eq!(got.rule_id.as_deref(), Some("allow-push-for-releaser"));
    }

    #[test]
    fn test_rule_matching_is_conjunctive() {
        let e = Evaluator::new(Document {
            rules: vec![rule(
                "releaser-only",
                RuleMatch {
                    agents: vec!["releaser".to_string()],
                    command_prefixes: vec!["git push".to_string()],
                    ..RuleMatch::default()
                },
            )],
            ..Document::default()
        });

        // Wrong agent: the base require_approval decision stands.
        let got = e.evaluate(&EvalRequest::new("git push origin main").with_agent("builder"));
        assert_eq!(got.decision, Decision::RequireApproval);
        assert!(got.rule_id.is_none());
    }

    #[test]
    fn test_disabled_and_expired_rules_skipped() {
        let now = Utc::now();
        let mut disabled = rule("off", RuleMatch::default());
        disabled.enabled = Some(false);
        let mut expired = rule("stale", RuleMatch::default());
        expired.until = Some(now - Duration::hours(1));

        let e = Evaluator::new(Document {
            rules: vec![disabled, expired],
            ..Document::default()
        });
        let got = e.evaluate(&EvalRequest::new("git push origin main").with_timestamp(now));
        assert!(got.rule_id.is_none());
        assert_eq!(got.decision, Decision::RequireApproval);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let mut first = rule("first", RuleMatch::default());
        first.decision = Decision::Deny;
        let mut second = rule("second", RuleMatch::default());
        second.decision = Decision::Allow;

        let e = Evaluator::new(Document {
            rules: vec![first, second],
            ..Document::default()
        });
        let got = e.evaluate(&EvalRequest::new("echo hi"));
        assert_eq!(got.rule_id.as_deref(), Some("first"));
        assert_eq!(got.decision, Decision::Deny);
    }

    #[test]
    fn test_malformed_rule_regex_is_non_matching() {
        let e = Evaluator::new(Document {
            rules: vec![rule(
                "bad-regex",
                RuleMatch {
                    command_regex: Some("([unclosed".to_string()),
                    ..RuleMatch::default()
                },
            )],
            ..Document::default()
        });
        let got = e.evaluate(&EvalRequest::new("echo hi"));
        assert!(got.rule_id.is_none());
    }

    #[test]
    fn test_document_default_decision_applies_without_match() {
        let e = Evaluator::new(Document {
            default_decision: Some(Decision::Deny),
            rules: vec![rule(
                "narrow",
                RuleMatch {
                    agents: vec!["nobody".to_string()],
                    ..RuleMatch::default()
                },
            )],
            ..Document::default()
        });
        let got = e.evaluate(&EvalRequest::new("git status"));
        // Decision overridden; class untouched.
        assert_eq!(got.decision, Decision::Deny);
        assert_eq!(got.class, RiskClass::Class0Safe);
    }

    #[test]
    fn test_class_restriction() {
        let e = Evaluator::new(Document {
            rules: vec![rule(
                "sensitive-only",
                RuleMatch {
                    classes: vec![RiskClass::Class2Sensitive],
                    ..RuleMatch::default()
                },
            )],
            ..Document::default()
        });
        assert!(e.evaluate(&EvalRequest::new("git status")).rule_id.is_none());
        assert!(e.evaluate(&EvalRequest::new("git push")).rule_id.is_some());
    }

    #[test]
    fn test_pattern_list_glob_forms() {
        let pats = |ps: &[&str]| ps.iter().map(ToString::to_string).collect::<Vec<_>>();
        assert!(matches_pattern_list(&pats(&["*"]), "anything"));
        assert!(matches_pattern_list(&pats(&["releaser"]), "Releaser"));
        assert!(matches_pattern_list(&pats(&["deploy*"]), "deploy-bot-7"));
        assert!(matches_pattern_list(&pats(&["*.corp"]), "repo.corp"));
        assert!(!matches_pattern_list(&pats(&["*.corp"]), "corp"));
        assert!(!matches_pattern_list(&pats(&["releaser"]), ""));
    }

    #[test]
    fn test_load_or_default_degrades() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("policy.json");
        std::fs::write(&path, b"definitely not json").unwrap();
        let e = Evaluator::load_or_default(&path);
        let got = e.evaluate(&EvalRequest::new("git push"));
        assert_eq!(got.decision, Decision::RequireApproval);
    }
}
