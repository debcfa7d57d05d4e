//! # Validate Command Implementation
//!
//! Runs the full fail-fast verification of on-disk reality against the
//! persisted record and reports the first violation. Exits non-zero on
//! any violation so the command can gate CI and pre-commit hooks.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use remote_sync::manager::StateManager;

/// Verify every tracked file against the recorded state
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Root directory holding the state document.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs) -> Result<()> {
    let manager = StateManager::new(&args.root);
    manager
        .load()
        .with_context(|| format!("failed to load state from {}", args.root.display()))?;

    manager
        .validate_local_state()
        .context("local state validation failed")?;

    let tracked = manager.snapshot()?.remote_text_files.len();
    println!("State valid: {} tracked file(s) match their records.", tracked);
    Ok(())
}
