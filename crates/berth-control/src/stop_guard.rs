use crate::StopSignal;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;

/// Helper for observing a [`StopSignal`] from an async task.
pub struct StopGuard {
    triggered: Arc<AtomicBool>,
    rx: broadcast::Receiver<()>,
}

impl StopGuard {
    pub fn new(signal: &StopSignal) -> Self {
        Self {
            triggered: signal.triggered_flag(),
            rx: signal.subscribe(),
        }
    }

    /// Wait for the signal to fire. Returns immediately if it already has.
    pub async fn wait(&mut self) {
        if self.triggered.load(Ordering::SeqCst) {
            return;
        }
        let _ = self.rx.recv().await;
    }

    /// Poll for the signal (non-blocking)
    pub fn poll_stopped(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }
}
