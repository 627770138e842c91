//! Cancellation signal shared between a controller and its running loop.
//!
//! The controller owns the signal and re-arms it before every start; the
//! loop only observes it. Two levels exist:
//! - stop: cooperative, checked by the runner between iterations
//! - abort: also wakes the runner mid-iteration at its next suspension point

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct SignalState {
    stop: AtomicBool,
    abort: AtomicBool,
    notify: Notify,
}

/// One-shot, re-armable stop signal.
///
/// Clones share state. Every controller creates its own signal, so
/// cancelling one controller never touches another's loop.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    state: Arc<SignalState>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that no further iteration begins.
    pub fn cancel(&self) {
        self.state.stop.store(true, Ordering::SeqCst);
    }

    /// Request cancellation and interrupt the in-flight iteration.
    pub fn abort(&self) {
        self.state.stop.store(true, Ordering::SeqCst);
        self.state.abort.store(true, Ordering::SeqCst);
        self.state.notify.notify_waiters();
    }

    /// Re-arm the signal for a new run.
    pub fn clear(&self) {
        self.state.stop.store(false, Ordering::SeqCst);
        self.state.abort.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.stop.load(Ordering::SeqCst)
    }

    pub fn is_aborted(&self) -> bool {
        self.state.abort.load(Ordering::SeqCst)
    }

    /// Resolves once `abort` has been called.
    pub async fn aborted(&self) {
        loop {
            // Register before checking the flag so a concurrent abort is not missed.
            let notified = self.state.notify.notified();
            if self.is_aborted() {
                return;
            }
            notified.await;
        }
    }

    /// True when both handles point at the same signal.
    pub fn same_as(&self, other: &CancelSignal) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}
