//! # Remote Sync State Library
//!
//! Core state and drift-detection engine for the `remote-sync` tool, which
//! copies files from remote repositories into a local tree and applies
//! text substitutions. The library keeps a persisted, content-hash-
//! addressed record of every managed file, distinguishes pristine copies
//! from locally patched ones, validates on-disk reality against the
//! record, and cleans up files the state no longer references.
//!
//! ## Quick Example
//!
//! ```
//! use std::path::Path;
//! use remote_sync::manager::{Modification, StateManager};
//! use remote_sync::source::StaticSourceFile;
//!
//! let root = tempfile::tempdir().unwrap();
//! let manager = StateManager::new(root.path());
//!
//! // Track a pristine copy of remote content
//! let source = StaticSourceFile::new("upstream/templates", "v1.2.3", "x.txt", "Hello World");
//! manager
//!     .put_remote_text_file(&source, Path::new("x.copy.txt"))
//!     .unwrap();
//!
//! // Patch it locally; the original bytes stay recoverable
//! manager
//!     .apply_modification(
//!         Path::new("x.copy.txt"),
//!         &Modification { from: "World".into(), to: "Universe".into() },
//!     )
//!     .unwrap();
//! assert_eq!(
//!     manager.raw_remote_content(Path::new("x.copy.txt")).unwrap(),
//!     b"Hello World"
//! );
//!
//! // Persist, then verify disk still matches the record
//! manager.save().unwrap();
//! assert!(manager.is_consistent());
//! ```
//!
//! ## Core Concepts
//!
//! - **State Record (`model`)**: the persisted JSON aggregate of tracked
//!   files, repositories, generated files, and archives, plus the managed
//!   file-name markers (`.copy.` / `.patch.`).
//! - **State Manager (`manager`)**: load/save/put/validate/cleanup over
//!   the record, behind one read-write lock.
//! - **File Store (`fileops`) and Hasher (`hash`)**: on-disk primitives,
//!   including atomic writes for the state document.
//! - **Lock File (`lockfile`)**: an advisory exclusive-create sentinel
//!   serializing saves across processes.
//! - **Patch Helpers (`patch`)**: compressed snapshots of pre-modification
//!   content, literal substitution, and the diagnostic diff.
//! - **Collaborator Seams (`source`, `report`)**: traits for the remote
//!   content provider, explicit resolver injection, the opaque config
//!   snapshot, and structured file-change notifications.
//!
//! The per-file lifecycle is Absent → Pristine (put) → Patched
//! (modification, one-way) → Absent (cleanup or reset). Network fetching,
//! CLI parsing, and config-format parsing live outside this library.

pub mod cancel;
pub mod error;
pub mod fileops;
pub mod hash;
pub mod lockfile;
pub mod manager;
pub mod model;
pub mod output;
pub mod patch;
pub mod report;
pub mod source;

#[cfg(test)]
mod model_proptest;
