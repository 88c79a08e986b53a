//! Ward Gateway - the local HTTP surface for policy-gated commands.
//!
//! Serves a small JSON API under `/v1`:
//!
//! - `POST /v1/policy/evaluate` - classify and evaluate a command
//! - `POST /v1/approvals` - create an approval request
//! - `GET  /v1/approvals` - list approval requests
//! - `POST /v1/approvals/{id}/decision` - approve or deny
//! - `GET  /v1/runs/{id}/audit` - redacted audit trail for a run
//!
//! The gateway is loopback-oriented: browser origins other than localhost
//! are rejected outright, and when `WARD_DASHBOARD_TOKEN` is set every
//! request must carry it (header or bearer credential).

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod routes;
pub mod security;
pub mod server;
pub mod state;

pub use error::{GatewayError, GatewayResult};
pub use routes::router;
pub use server::Gateway;
pub use state::AppState;
