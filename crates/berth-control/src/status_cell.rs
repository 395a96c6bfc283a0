use crate::RunningStatus;

use std::sync::Arc;

use log::info;
use tokio::sync::watch;

/// Publishes [`RunningStatus`] transitions to any number of observers.
///
/// Transitions are forward-only: a request to move to an earlier or equal
/// status is ignored, so racing callers can each announce the same
/// transition without undoing one another.
#[derive(Clone, Debug)]
pub struct StatusCell {
    tx: Arc<watch::Sender<RunningStatus>>,
}

impl StatusCell {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(RunningStatus::Unknown);
        Self { tx: Arc::new(tx) }
    }

    pub fn get(&self) -> RunningStatus {
        *self.tx.borrow()
    }

    /// Move to `next` if it is a forward transition. Returns whether the
    /// status actually changed.
    pub fn advance(&self, next: RunningStatus) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if next > *current {
                *current = next;
                true
            } else {
                false
            }
        });

        if changed {
            info!("Running status is now {next}");
        }

        changed
    }

    /// Receiver for awaiting or reading status transitions.
    pub fn subscribe(&self) -> watch::Receiver<RunningStatus> {
        self.tx.subscribe()
    }
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new()
    }
}
