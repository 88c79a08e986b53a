//! `ward init` - scaffold the workspace control directory.

use anyhow::{Context, Result};
use ward_core::WorkspaceRoot;

/// Create `.ward/` in the current directory with a starter policy document.
pub fn run_init() -> Result<()> {
    let cwd = std::env::current_dir().context("resolving current directory")?;
    let ws = WorkspaceRoot::from_path(&cwd);
    let existed = ws.control_dir().is_dir();
    ws.ensure()
        .with_context(|| format!("creating {}", ws.control_dir().display()))?;

    let policy_path = ws.policy_path();
    if !policy_path.exists() {
        let starter = serde_json::json!({
            "version": 1,
            "rules": [],
        });
        std::fs::write(&policy_path, format!("{starter:#}\n"))
            .with_context(|| format!("writing {}", policy_path.display()))?;
        println!("Created {}", policy_path.display());
    }

    if existed {
        println!("Workspace already initialized at {}", ws.root().display());
    } else {
        println!("Initialized ward workspace at {}", ws.root().display());
    }
    Ok(())
}
