//! # Status Command Implementation
//!
//! Prints a summary of the persisted state: how many files are tracked,
//! how many carry local patches, which repositories contributed, and
//! whether the on-disk tree still matches the recorded hashes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use remote_sync::manager::StateManager;

/// Show a summary of the tracked state and its consistency
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Root directory holding the state document.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,
}

/// Execute the `status` command.
pub fn execute(args: StatusArgs) -> Result<()> {
    let manager = StateManager::new(&args.root);
    manager
        .load()
        .with_context(|| format!("failed to load state from {}", args.root.display()))?;

    let state = manager.snapshot()?;
    let patched = state.remote_text_files.iter().filter(|f| f.patched).count();

    println!("State: {}", manager.state_path().display());
    println!("Last updated: {}", state.last_updated.to_rfc3339());
    println!(
        "Tracked files: {} ({} patched)",
        state.remote_text_files.len(),
        patched
    );
    println!("Generated files: {}", state.generated_files.len());
    println!("Repositories: {}", state.repositories.len());
    for repository in &state.repositories {
        println!("  {} @ {}", repository.name, repository.release.r#ref);
    }
    if let Some(fingerprint) = manager.config_hash()? {
        println!("Config fingerprint: {}", fingerprint);
    }

    if manager.is_consistent() {
        println!("Consistency: ok");
    } else {
        println!("Consistency: drift detected (run 'remote-sync validate' for details)");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_status_on_empty_root() {
        let temp = TempDir::new().unwrap();
        let args = StatusArgs {
            root: temp.path().to_path_buf(),
        };
        // No state document: load is a no-op and status prints the empty record
        execute(args).unwrap();
    }
}
