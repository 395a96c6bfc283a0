mod lifecycle;
mod stop_signal;

use crate::{RunningStatus, ServiceHandle};

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use berth_config::ServerConfig;
use tokio::sync::watch;

/// Config pointing at loopback with an OS-assigned control port, so tests
/// never collide on a fixed port.
pub(crate) fn test_config() -> ServerConfig {
    ServerConfig {
        host_name: String::from("127.0.0.1"),
        port: 8080,
        control_port: 0,
        shutdown_timeout_ms: 500,
        ..ServerConfig::default()
    }
}

/// ServiceHandle double recording how often it was stopped and, optionally,
/// what the running status was at the moment `stop` ran.
#[derive(Debug)]
pub(crate) struct RecordingService {
    pub(crate) stop_calls: AtomicUsize,
    pub(crate) stop_now_calls: AtomicUsize,
    pub(crate) status_at_stop: Mutex<Option<RunningStatus>>,
    observed: Option<watch::Receiver<RunningStatus>>,
}

impl RecordingService {
    pub(crate) fn new() -> Self {
        Self {
            stop_calls: AtomicUsize::new(0),
            stop_now_calls: AtomicUsize::new(0),
            status_at_stop: Mutex::new(None),
            observed: None,
        }
    }

    pub(crate) fn observing(status: watch::Receiver<RunningStatus>) -> Self {
        Self {
            observed: Some(status),
            ..Self::new()
        }
    }

    pub(crate) fn stops(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ServiceHandle for RecordingService {
    async fn stop(&self, _timeout: Duration) {
        if let Some(status) = &self.observed {
            *self.status_at_stop.lock().unwrap() = Some(*status.borrow());
        }
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
    }

    async fn stop_now(&self) {
        self.stop_now_calls.fetch_add(1, Ordering::SeqCst);
    }
}
