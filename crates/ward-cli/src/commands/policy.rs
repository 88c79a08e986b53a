//! `ward policy eval` - evaluate a proposed command.

use anyhow::Result;
use ward_core::WorkspaceRoot;
use ward_policy::{EvalRequest, Evaluator, normalize_repo};

/// Evaluate policy for a command and print the outcome.
pub fn run_eval(
    agent: &str,
    repo: Option<&str>,
    command: Option<&str>,
    args: &[String],
    json: bool,
) -> Result<()> {
    let command = match command.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) => c.to_string(),
        None if !args.is_empty() => args.join(" "),
        None => anyhow::bail!("command is required via --cmd"),
    };

    let repo = match repo.map(str::trim).filter(|r| !r.is_empty()) {
        Some(r) => r.to_string(),
        None => std::env::current_dir()
            .map(|d| d.display().to_string())
            .unwrap_or_default(),
    };

    // Outside a workspace, evaluation still works with default rules.
    let evaluator = match WorkspaceRoot::discover()? {
        Some(ws) => Evaluator::load_or_default(ws.policy_path()),
        None => Evaluator::default(),
    };

    let result = evaluator.evaluate(
        &EvalRequest::new(command)
            .with_agent(agent.trim())
            .with_repo(normalize_repo(&repo))
            .with_requested_by("cli"),
    );

    if json {
        println!("{}", serde_json::to_string(&result)?);
        return Ok(());
    }

    println!("Decision: {}", result.decision);
    println!("Class: {}", result.class);
    if !result.reason.is_empty() {
        println!("Reason: {}", result.reason);
    }
    if let Some(rule_id) = &result.rule_id {
        println!("Rule: {rule_id}");
    }
    Ok(())
}
