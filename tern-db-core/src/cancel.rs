//! Cooperative cancellation for long-running scans.
//!
//! The executor hands every operator a [`CancellationToken`]; BFS frontier
//! expansion and sorted-range scans poll it once per outer loop iteration
//! and unwind with [`Error::Cancelled`](crate::Error::Cancelled). Inner
//! loops stay poll-free so the hot path is branch-cheap.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Shared cancellation flag, cheap to clone and poll.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. All clones observe the flag.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// True once `cancel` has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Poll point for loops: `Err(Cancelled)` once cancellation is requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}
