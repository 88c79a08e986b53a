//! `ward serve` - run the local HTTP gateway.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use ward_core::WorkspaceRoot;
use ward_gateway::Gateway;

/// Serve the gateway for the enclosing workspace until interrupted.
pub async fn run_serve(addr: SocketAddr) -> Result<()> {
    let ws = WorkspaceRoot::discover()?
        .ok_or_else(|| anyhow::anyhow!("not in a ward workspace (run `ward init` first)"))?;
    ws.ensure()?;

    Gateway::new(&ws, addr)
        .serve()
        .await
        .with_context(|| format!("serving gateway on {addr}"))
}
