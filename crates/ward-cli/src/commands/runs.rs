//! `ward runs replay` - print the audit trail for a run.

use anyhow::Result;
use serde_json::json;
use ward_core::WorkspaceRoot;
use ward_runlog::RunLog;

/// Replay all events recorded for a run, in timestamp order.
pub fn replay(ws: &WorkspaceRoot, run_id: &str, json_output: bool) -> Result<()> {
    let events = RunLog::for_workspace(ws).read_run(run_id)?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string(&json!({
                "run_id": run_id,
                "events": events,
            }))?
        );
        return Ok(());
    }

    if events.is_empty() {
        println!("No events found for run {run_id}");
        return Ok(());
    }

    println!("Run {run_id}");
    for event in &events {
        let ts = event
            .timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        println!(
            "  {ts}  {:<18} state={} decision={}",
            event.event_type, event.state, event.policy_decision
        );
        if !event.payload.is_empty() {
            println!("    payload: {}", serde_json::to_string(&event.payload)?);
        }
    }
    Ok(())
}
