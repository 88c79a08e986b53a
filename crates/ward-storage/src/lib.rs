//! Ward Storage - cooperating-process persistence primitives.
//!
//! Two tiers, both deliberately small:
//!
//! - [`AdvisoryLock`]: blocking, exclusive, cross-process file lock over a
//!   named `.lock` file. Effective only among processes that honor it.
//! - [`DocumentFile`]: a whole-document JSON repository with a
//!   lock → load → mutate → atomic-rewrite discipline. Every mutation
//!   rewrites the full document via write-to-temp-then-rename, so readers
//!   never observe a torn file.
//!
//! The repository surface is intentionally narrow (`read`, `update`) so a
//! future embedded store can replace the file backend without touching the
//! state-machine logic layered above it.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod document;
pub mod error;
pub mod lock;

pub use document::{DocumentFile, write_json_atomic};
pub use error::{StorageError, StorageResult};
pub use lock::AdvisoryLock;
