//! Subcommand implementations.

pub mod approvals;
pub mod init;
pub mod policy;
pub mod runs;
pub mod serve;
