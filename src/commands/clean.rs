//! # Clean Command Implementation
//!
//! Deletes managed files under the root that the state no longer
//! references. Each removal is reported as it happens, so interrupting or
//! failing mid-run still shows what was deleted before the abort.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use remote_sync::cancel::CancelToken;
use remote_sync::manager::StateManager;
use remote_sync::output::OutputConfig;
use remote_sync::report::ConsoleReporter;

/// Delete managed files the state no longer references
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Root directory holding the state document.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,
}

/// Execute the `clean` command.
pub fn execute(args: CleanArgs, output: &OutputConfig) -> Result<()> {
    let reporter = Arc::new(ConsoleReporter::new(output.clone()));
    let manager = StateManager::with_reporter(&args.root, reporter);
    manager
        .load()
        .with_context(|| format!("failed to load state from {}", args.root.display()))?;

    let removed = manager
        .cleanup_orphaned_files(&CancelToken::new())
        .context("cleanup aborted")?;

    if removed.is_empty() {
        println!("No orphaned files found.");
    } else {
        println!("Removed {} orphaned file(s).", removed.len());
    }
    Ok(())
}
