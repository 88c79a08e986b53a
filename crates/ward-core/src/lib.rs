//! Ward Core - shared types for policy-gated command governance.
//!
//! This crate holds the closed value types every other Ward crate agrees on:
//!
//! - [`Decision`]: the governance outcome for a proposed command
//! - [`RiskClass`]: the four-tier severity classification
//! - [`WorkspaceRoot`]: discovery and layout of the per-project `.ward/`
//!   control directory
//!
//! Both enums serialize to the stable wire strings used by the policy
//! document, the approvals store, and the run log (`"allow"`,
//! `"class2_sensitive"`, ...). Exhaustive matches over them are how the
//! classifier tiers and the approval state machine stay honest.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod decision;
pub mod workspace;

pub use decision::{Decision, RiskClass};
pub use workspace::WorkspaceRoot;
