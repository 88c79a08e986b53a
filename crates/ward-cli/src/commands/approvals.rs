//! `ward approvals ...` - inspect and decide approval requests.

use anyhow::Result;
use std::str::FromStr;
use ward_approvals::{ApprovalRequest, ApprovalStatus, ApprovalStore, DecideRequest, Verdict};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// List approval requests, optionally filtered by status.
pub fn list(store: &ApprovalStore, status: Option<&str>, json: bool) -> Result<()> {
    let filter = match status.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(ApprovalStatus::from_str(raw).map_err(anyhow::Error::msg)?),
        None => None,
    };
    let requests = store.list(filter)?;

    if json {
        println!("{}", serde_json::to_string(&requests)?);
        return Ok(());
    }
    if requests.is_empty() {
        println!("No approval requests found.");
        return Ok(());
    }

    println!(
        "{:<16}  {:<9}  {:<22}  {:<14}  {:<19}  COMMAND",
        "ID", "STATUS", "CLASS", "REQUESTED BY", "CREATED"
    );
    for req in &requests {
        println!(
            "{:<16}  {:<9}  {:<22}  {:<14}  {:<19}  {}",
            req.id,
            req.status,
            req.class,
            req.requested_by,
            req.created_at.format(TIME_FORMAT),
            req.command
        );
    }
    Ok(())
}

/// Show a single approval request.
pub fn show(store: &ApprovalStore, id: &str, json: bool) -> Result<()> {
    let req = store.get(id)?;
    if json {
        println!("{}", serde_json::to_string(&req)?);
        return Ok(());
    }
    print_request(&req);
    Ok(())
}

/// Record a verdict on a pending request.
pub fn decide(
    store: &ApprovalStore,
    id: &str,
    verdict: Verdict,
    approver: &str,
    reason: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut input = DecideRequest::new(id, verdict).with_approver(approver);
    if let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) {
        input = input.with_rationale(reason);
    }
    let updated = store.decide(input)?;

    if json {
        println!("{}", serde_json::to_string(&updated)?);
        return Ok(());
    }
    match verdict {
        Verdict::Approved => println!("Approved {}", updated.id),
        Verdict::Denied => println!("Denied {}", updated.id),
    }
    Ok(())
}

fn print_request(req: &ApprovalRequest) {
    println!("ID: {}", req.id);
    println!("Status: {}", req.status);
    println!("Class: {}", req.class);
    println!("Command: {}", req.command);
    println!("Requested by: {}", req.requested_by);
    if !req.decided_by.is_empty() {
        println!("Decided by: {}", req.decided_by);
    }
    if !req.decision_rationale.is_empty() {
        println!("Rationale: {}", req.decision_rationale);
    }
    println!("Created: {}", req.created_at.format(TIME_FORMAT));
    println!("Expires: {}", req.expires_at.format(TIME_FORMAT));
}
