//! Ward CLI - policy-gated command governance.
//!
//! Thin dispatch over the governance crates: evaluate policy for proposed
//! commands, manage approval requests, replay run audit trails, and serve
//! the local HTTP gateway.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use ward_core::WorkspaceRoot;

mod commands;

use commands::{approvals, init, policy, runs, serve};

/// Ward - policy-gated command governance
#[derive(Parser)]
#[command(name = "ward")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a workspace (creates the .ward/ control directory)
    Init,

    /// Evaluate command policy decisions
    Policy {
        #[command(subcommand)]
        command: PolicyCommands,
    },

    /// Manage approval requests for policy-gated commands
    Approvals {
        #[command(subcommand)]
        command: ApprovalCommands,
    },

    /// Inspect command run audit trails
    Runs {
        #[command(subcommand)]
        command: RunCommands,
    },

    /// Serve the local HTTP gateway
    Serve {
        /// Listen address
        #[arg(long, default_value = "127.0.0.1:7717")]
        addr: SocketAddr,
    },
}

#[derive(Subcommand)]
enum PolicyCommands {
    /// Evaluate policy for a command
    Eval {
        /// Agent identity to evaluate for
        #[arg(long, default_value = "dashboard")]
        agent: String,
        /// Repository/workspace path
        #[arg(long)]
        repo: Option<String>,
        /// Command to evaluate
        #[arg(long = "cmd")]
        command: Option<String>,
        /// Output JSON
        #[arg(long)]
        json: bool,
        /// Command words (alternative to --cmd)
        #[arg(trailing_var_arg = true)]
        args: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ApprovalCommands {
    /// List approval requests
    List {
        /// Filter by status (pending|approved|denied|expired|executed)
        #[arg(long)]
        status: Option<String>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a single approval request
    Show {
        /// Approval ID
        id: String,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Approve a pending request
    Approve {
        /// Approval ID
        id: String,
        /// Approver identity (defaults to $USER)
        #[arg(long = "by")]
        by: Option<String>,
        /// Approval rationale
        #[arg(long)]
        reason: Option<String>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Deny a pending request
    Deny {
        /// Approval ID
        id: String,
        /// Approver identity (defaults to $USER)
        #[arg(long = "by")]
        by: Option<String>,
        /// Denial rationale
        #[arg(long)]
        reason: Option<String>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum RunCommands {
    /// Replay audit events for a run ID
    Replay {
        /// Run ID to replay
        #[arg(long = "run-id")]
        run_id: Option<String>,
        /// Output JSON
        #[arg(long)]
        json: bool,
        /// Run ID (alternative to --run-id)
        #[arg(trailing_var_arg = true)]
        args: Vec<String>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve the enclosing workspace or fail with a hint.
fn workspace_required() -> Result<WorkspaceRoot> {
    WorkspaceRoot::discover()?
        .ok_or_else(|| anyhow::anyhow!("not in a ward workspace (run `ward init` first)"))
}

/// Approver identity: explicit flag, then `$USER`, then `operator`.
fn resolve_approver(by: Option<String>) -> String {
    by.map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .or_else(|| {
            std::env::var("USER")
                .ok()
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
        })
        .unwrap_or_else(|| "operator".to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Init => init::run_init(),
        Commands::Policy { command } => handle_policy(command),
        Commands::Approvals { command } => handle_approvals(command),
        Commands::Runs { command } => handle_runs(command),
        Commands::Serve { addr } => serve::run_serve(addr).await,
    }
}

fn handle_policy(command: PolicyCommands) -> Result<()> {
    match command {
        PolicyCommands::Eval {
            agent,
            repo,
            command,
            json,
            args,
        } => policy::run_eval(&agent, repo.as_deref(), command.as_deref(), &args, json),
    }
}

fn handle_approvals(command: ApprovalCommands) -> Result<()> {
    let store = ward_approvals::ApprovalStore::for_workspace(&workspace_required()?);

    match command {
        ApprovalCommands::List { status, json } => {
            approvals::list(&store, status.as_deref(), json)
        },
        ApprovalCommands::Show { id, json } => approvals::show(&store, &id, json),
        ApprovalCommands::Approve {
            id,
            by,
            reason,
            json,
        } => approvals::decide(
            &store,
            &id,
            ward_approvals::Verdict::Approved,
            &resolve_approver(by),
            reason.as_deref(),
            json,
        ),
        ApprovalCommands::Deny {
            id,
            by,
            reason,
            json,
        } => approvals::decide(
            &store,
            &id,
            ward_approvals::Verdict::Denied,
            &resolve_approver(by),
            reason.as_deref(),
            json,
        ),
    }
}

fn handle_runs(command: RunCommands) -> Result<()> {
    match command {
        RunCommands::Replay { run_id, json, args } => {
            let run_id = run_id
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .or_else(|| args.first().map(|a| a.trim()))
                .filter(|r| !r.is_empty())
                .ok_or_else(|| anyhow::anyhow!("run ID is required via --run-id"))?
                .to_string();
            runs::replay(&workspace_required()?, &run_id, json)
        },
    }
}
