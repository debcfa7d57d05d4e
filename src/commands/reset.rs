//! # Reset Command Implementation
//!
//! Wipes the persisted state record back to empty and saves it. Tracked
//! files on disk are left untouched; only the bookkeeping is discarded,
//! which makes every managed file an orphan for a subsequent `clean`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use remote_sync::manager::StateManager;

/// Wipe the persisted state record
#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Root directory holding the state document.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,
}

/// Execute the `reset` command.
pub fn execute(args: ResetArgs) -> Result<()> {
    let manager = StateManager::new(&args.root);
    manager.reset()?;
    manager
        .save()
        .with_context(|| format!("failed to save state to {}", args.root.display()))?;

    println!("State reset: {}", manager.state_path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    use remote_sync::source::StaticSourceFile;
    use tempfile::TempDir;

    #[test]
    fn test_reset_empties_record_keeps_files() {
        let temp = TempDir::new().unwrap();
        let manager = StateManager::new(temp.path());
        let source = StaticSourceFile::new("upstream/templates", "v1", "x.txt", "Hello");
        manager
            .put_remote_text_file(&source, Path::new("x.copy.txt"))
            .unwrap();
        manager.save().unwrap();

        execute(ResetArgs {
            root: temp.path().to_path_buf(),
        })
        .unwrap();

        // File untouched, record empty
        assert!(temp.path().join("x.copy.txt").exists());
        let fresh = StateManager::new(temp.path());
        fresh.load().unwrap();
        assert!(fresh.snapshot().unwrap().remote_text_files.is_empty());

        // State document exists and parses
        assert!(fs::metadata(fresh.state_path()).unwrap().len() > 0);
    }
}
