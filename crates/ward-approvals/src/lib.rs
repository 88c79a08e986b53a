//! Ward Approvals - human-in-the-loop sign-off for governed commands.
//!
//! An [`ApprovalRequest`] tracks one command instance through the lifecycle
//! state machine:
//!
//! ```text
//! pending ──► approved ──► executed
//!    │  │
//!    │  └──► denied            (terminal)
//!    ├─────► expired           (terminal, time-driven, lazy)
//!    └─────► executed          (auto-tracked commands, see below)
//! ```
//!
//! Expiry is lazy: there is no timer thread. Every store operation first
//! flips stale `pending` entries to `expired` under the store lock, so
//! staleness is only observable (and only corrected) on access.
//!
//! The direct `pending → executed` transition is preserved from the
//! original workflow: it records execution of commands that never required
//! an explicit decision. `executed` therefore does not imply "was
//! approved".
//!
//! Persistence is a single JSON document per workspace, rewritten
//! atomically under an exclusive advisory lock (see [`ward_storage`]).

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod request;
pub mod store;

pub use error::{ApprovalError, ApprovalResult};
pub use request::{ApprovalRequest, ApprovalStatus, CreateRequest, DecideRequest, Verdict};
pub use store::{ApprovalStore, hash_command};
