//! # File-Change Notifications
//!
//! Structured notifications describing what a mutating state operation did
//! to the local tree. The engine emits one notification per touched file,
//! independent of whether the operation also returns an error, so batch
//! callers retain visibility into partial progress even when the overall
//! operation ultimately fails.
//!
//! The engine itself never renders output; consumers implement
//! [`Reporter`]. [`NullReporter`] discards everything (the default),
//! [`MemoryReporter`] collects changes for assertions in tests, and
//! [`ConsoleReporter`] renders one line per change for the CLI.

use std::path::PathBuf;
use std::sync::Mutex;

use crate::output::OutputConfig;

/// What happened to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChangeKind {
    Added,
    Updated,
    Deleted,
    Skipped,
    Error,
}

/// A single file-change notification.
#[derive(Debug, Clone)]
pub struct FileChange {
    pub kind: FileChangeKind,
    pub path: PathBuf,
    pub description: Option<String>,
    pub error: Option<String>,
}

impl FileChange {
    pub fn new(kind: FileChangeKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
            description: None,
            error: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

/// Consumer of file-change notifications.
pub trait Reporter: Send + Sync {
    fn report(&self, change: &FileChange);
}

/// Discards every notification. The engine default.
#[derive(Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&self, _change: &FileChange) {}
}

/// Collects notifications in memory, for test assertions.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    changes: Mutex<Vec<FileChange>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the collected changes so far.
    pub fn changes(&self) -> Vec<FileChange> {
        self.changes.lock().expect("reporter lock poisoned").clone()
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, change: &FileChange) {
        self.changes
            .lock()
            .expect("reporter lock poisoned")
            .push(change.clone());
    }
}

/// Renders one line per change on stdout, color-aware.
#[derive(Debug)]
pub struct ConsoleReporter {
    config: OutputConfig,
}

impl ConsoleReporter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    fn prefix(&self, kind: FileChangeKind) -> console::StyledObject<&'static str> {
        let styled = match kind {
            FileChangeKind::Added => console::style("+").green(),
            FileChangeKind::Updated => console::style("~").yellow(),
            FileChangeKind::Deleted => console::style("-").red(),
            FileChangeKind::Skipped => console::style("=").dim(),
            FileChangeKind::Error => console::style("!").red().bold(),
        };
        // Forced both ways so the flag wins over console's TTY detection;
        // `always` must survive piped stdout.
        styled.force_styling(self.config.use_color)
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, change: &FileChange) {
        let mut line = format!("{} {}", self.prefix(change.kind), change.path.display());
        if let Some(description) = &change.description {
            line.push_str(&format!(" ({})", description));
        }
        if let Some(error) = &change.error {
            line.push_str(&format!(": {}", error));
        }
        println!("{}", line);
    }
}
