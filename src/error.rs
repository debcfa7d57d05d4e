//! # Error Handling
//!
//! Centralized error handling for the `remote-sync` state engine, built on
//! `thiserror`. The `Error` enum covers every anticipated failure mode of
//! the persistence and drift-detection paths, each variant carrying enough
//! context (path, operation, expected/actual hashes) to diagnose a failure
//! without a debugger.
//!
//! The taxonomy mirrors how callers are expected to react:
//!
//! - `InvalidPath` — a managed-file naming-convention violation; the caller
//!   passed a path the engine will never track.
//! - `NotFound` — a tracked file, patch sibling, or state reference is
//!   missing on disk.
//! - `ContentMismatch` — recorded hash and on-disk hash diverge (drift).
//! - `SchemaMismatch` — the persisted document was written by a different
//!   engine version; there is no migration path.
//! - `LockHeld` — another process holds the save sentinel.
//! - `NotPatched` / `MissingPatchInfo` — patch-content queries against files
//!   that were never patched, or whose patch record is incomplete.
//! - `Cancelled` — the caller's cancellation token fired mid-operation.
//! - `Serialization`, `Io`, `Json`, `LockPoisoned` — ambient failures.
//!
//! The `Result<T>` alias is used throughout the library.

use thiserror::Error;

/// Main error type for remote-sync state operations
#[derive(Error, Debug)]
pub enum Error {
    /// A local path does not follow the managed-file naming convention.
    ///
    /// Tracked files must embed one of the recognized markers in their file
    /// name; see [`crate::model::PRISTINE_MARKER`] and
    /// [`crate::model::PATCHED_MARKER`].
    #[error("Invalid managed path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    /// A tracked file, patch sibling, or other referenced file is missing.
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// The on-disk content hash no longer matches the recorded hash.
    #[error("Content mismatch for '{path}': recorded {recorded}, actual {actual}")]
    ContentMismatch {
        path: String,
        recorded: String,
        actual: String,
    },

    /// The persisted state document carries an unsupported schema version.
    #[error("State schema mismatch: expected {expected}, found {found}")]
    SchemaMismatch { expected: String, found: String },

    /// The save sentinel already exists; another save is mid-flight.
    #[error("State lock held: {path}")]
    LockHeld { path: String },

    /// A patch-content query was made against a file that was never patched.
    #[error("File is not patched: {path}")]
    NotPatched { path: String },

    /// A file is marked patched but its patch record is absent.
    #[error("Missing patch info for patched file: {path}")]
    MissingPatchInfo { path: String },

    /// The caller's cancellation token fired before the operation finished.
    #[error("Operation cancelled: {operation}")]
    Cancelled { operation: String },

    /// An error occurred during serialization or snapshot encoding.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// A mutex or read-write lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing or serialization error, wrapped from `serde_json`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True when the error represents a missing file rather than a harder
    /// I/O failure. Used by best-effort paths that treat absence as data.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound { .. } => true,
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
