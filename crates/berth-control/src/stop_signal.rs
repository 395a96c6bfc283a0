use crate::StopGuard;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;

/// One-shot cancellation primitive shared by the accept loop, the signal
/// handler and the coordinator's main path.
///
/// Unlike a bare broadcast channel, a fired signal stays observable: guards
/// created after `trigger` return from `wait` immediately.
#[derive(Clone, Debug)]
pub struct StopSignal {
    tx: broadcast::Sender<()>,
    triggered: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a receiver for stop notifications
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Fire the signal. Idempotent.
    pub fn trigger(&self) {
        if self.triggered.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.tx.send(());
    }

    /// Check if the signal has fired (non-blocking)
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Convenience method to create a guard
    pub fn guard(&self) -> StopGuard {
        StopGuard::new(self)
    }

    pub(crate) fn triggered_flag(&self) -> Arc<AtomicBool> {
        self.triggered.clone()
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}
