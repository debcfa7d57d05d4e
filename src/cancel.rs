//! Cooperative cancellation for long-running state operations

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cheaply cloneable cancellation flag.
///
/// Operations that can run long (the orphan-cleanup directory walk in
/// particular) poll the token periodically and abort with
/// [`crate::error::Error::Cancelled`] once it fires. Cancellation is
/// cooperative; an already-issued filesystem call still runs to
/// completion.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent; there is no un-cancel.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
