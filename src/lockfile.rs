//! # Lock File Protocol
//!
//! Advisory cross-process locking around state persistence. The lock is a
//! zero-byte sentinel created with exclusive-create semantics beside the
//! state document; a second acquirer fails with [`Error::LockHeld`] while
//! the sentinel exists.
//!
//! The guard releases the sentinel on `Drop`, so the lock is released on
//! every exit path of the protected operation, including error returns and
//! panics that unwind.
//!
//! ## Limitations
//!
//! Purely advisory and single-host: processes that do not participate in
//! the protocol are not excluded, and a crashed process (or `panic = "abort"`
//! build) leaves a stale sentinel that must be removed manually. There is
//! no automatic recovery.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Error, Result};

/// Suffix appended to the state document path to form the sentinel path.
pub const LOCK_SUFFIX: &str = ".lock";

/// RAII guard over the exclusive-create sentinel file.
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
}

impl LockGuard {
    /// Acquire the lock guarding the given state document.
    ///
    /// Creates `<state_path>.lock` with exclusive-create semantics. Fails
    /// with [`Error::LockHeld`] when the sentinel already exists and
    /// [`Error::Io`] for any other failure.
    pub fn acquire(state_path: &Path) -> Result<Self> {
        let path = sentinel_path(state_path);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => {
                debug!("acquired state lock at {}", path.display());
                Ok(LockGuard { path })
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Err(Error::LockHeld {
                path: path.display().to_string(),
            }),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// The sentinel path held by this guard.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // Removal failure is unrecoverable here; the stale sentinel then
        // requires manual cleanup, same as after a crash.
        if let Err(e) = std::fs::remove_file(&self.path) {
            debug!(
                "failed to remove state lock {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

/// Sentinel path for a given state document path.
pub fn sentinel_path(state_path: &Path) -> PathBuf {
    let mut s = state_path.as_os_str().to_os_string();
    s.push(LOCK_SUFFIX);
    PathBuf::from(s)
}
