//! Ward Runlog - the append-only audit trail for governed command runs.
//!
//! Events are stored one JSON object per line in `.ward/run-events.jsonl`.
//! The file is append-only: no operation edits or removes a line once
//! written. Reads tolerate damage, skipping blank and malformed lines so a
//! torn write never makes the rest of the history unreadable.
//!
//! All string payload values pass through [`redact::redact_str`] on append
//! and again on read, so secrets never reach disk and pre-redaction
//! history is still sanitized when served.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod event;
pub mod redact;
pub mod store;

pub use error::{RunLogError, RunLogResult};
pub use event::{RunEvent, new_run_id};
pub use redact::{redact_payload, redact_str};
pub use store::RunLog;
