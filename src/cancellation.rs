//! Cooperative run cancellation
//!
//! The engine polls the token between gaps during rationale enrichment, so
//! cancellation never interrupts an in-flight request and already-produced
//! results stay intact. Tokens are cheap to clone; all clones observe the
//! same state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Thread-safe cancellation token
///
/// Wraps an `Arc<AtomicBool>`; cloning shares the cancellation state.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new non-cancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once `cancel()` has been called on any clone
    ///
    /// Uses `Ordering::SeqCst` so cancellation is visible across threads.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Request cancellation; idempotent
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}
