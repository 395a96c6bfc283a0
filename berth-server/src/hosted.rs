use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use berth_control::{ControlError, HostedService, ServiceHandle, StopSignal};
use log::{info, warn};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use url::Url;

/// The hosted-service side of the runner: an axum application served at the
/// configured bind address, mounted under the base URI's path prefix.
pub struct AxumService {
    bind_addr: String,
    app: Router,
}

impl AxumService {
    pub fn new(bind_addr: String, app: Router) -> Self {
        Self { bind_addr, app }
    }
}

#[async_trait]
impl HostedService for AxumService {
    async fn start(&self, base_uri: &Url) -> berth_control::Result<Arc<dyn ServiceHandle>> {
        let listener = TcpListener::bind(&self.bind_addr).await.map_err(|e| {
            ControlError::service(format!("failed to bind {}: {e}", self.bind_addr))
        })?;

        // Mount under the configured path prefix, if any.
        let app = match base_uri.path() {
            "/" => self.app.clone(),
            prefix => Router::new().nest(prefix.trim_end_matches('/'), self.app.clone()),
        };

        let stop = StopSignal::new();
        let mut shutdown = stop.guard();
        let server = axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.wait().await });
        let task = tokio::spawn(server.into_future());

        info!("Hosted service listening on {}", self.bind_addr);

        Ok(Arc::new(AxumHandle {
            stop,
            task: Mutex::new(Some(task)),
        }))
    }
}

/// Stop-handle over the serve task.
///
/// Both stop flavors are idempotent and race-safe: whichever caller takes
/// the task handle performs the teardown, everyone else finds it gone.
#[derive(Debug)]
pub struct AxumHandle {
    stop: StopSignal,
    task: Mutex<Option<JoinHandle<std::io::Result<()>>>>,
}

#[async_trait]
impl ServiceHandle for AxumHandle {
    async fn stop(&self, timeout_bound: Duration) {
        self.stop.trigger();

        let task = self.task.lock().await.take();
        let Some(task) = task else { return };

        let force = task.abort_handle();
        match timeout(timeout_bound, task).await {
            Ok(Ok(Ok(()))) => info!("Hosted service drained"),
            Ok(Ok(Err(e))) => warn!("Hosted service ended with an error: {e}"),
            Ok(Err(e)) => warn!("Hosted service task failed: {e}"),
            Err(_) => {
                warn!("Drain bound of {timeout_bound:?} elapsed, terminating hosted service");
                force.abort();
            }
        }
    }

    async fn stop_now(&self) {
        self.stop.trigger();

        if let Some(task) = self.task.lock().await.take() {
            task.abort();
        }
    }
}
