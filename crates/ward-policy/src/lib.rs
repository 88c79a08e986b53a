//! Ward Policy - risk classification and rule-driven decisions.
//!
//! The evaluator is a pure function: given an [`EvalRequest`] it always
//! produces an [`EvalResult`], never an error. Classification walks four
//! fixed severity tiers (most severe wins), the base decision is a total
//! function of the class, and an optionally loaded [`Document`] of rules
//! can override the decision for matching commands.
//!
//! # Example
//!
//! ```
//! use ward_policy::{EvalRequest, Evaluator};
//! use ward_core::{Decision, RiskClass};
//!
//! let evaluator = Evaluator::default();
//! let result = evaluator.evaluate(&EvalRequest::new("git push origin main"));
//! assert_eq!(result.class, RiskClass::Class2Sensitive);
//! assert_eq!(result.decision, Decision::RequireApproval);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod classify;
pub mod document;
pub mod evaluator;
pub mod repo;

pub use classify::classify_command;
pub use document::{Document, DocumentError, Rule, RuleMatch};
pub use evaluator::{EvalRequest, EvalResult, Evaluator};
pub use repo::normalize_repo;
