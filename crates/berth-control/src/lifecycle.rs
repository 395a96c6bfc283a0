use crate::{
    ControlError, DEFAULT_DRAIN_TIMEOUT, HostedService, RemoteShutdownClient, Result,
    RunningStatus, ServiceHandle, ShutdownController, StatusCell, StopSignal,
};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use berth_config::ServerConfig;
use log::{error, info, warn};
use tokio::sync::watch;
use url::Url;

/// Opens the served URI for the operator. External collaborator seam; every
/// failure is logged and swallowed.
pub trait BrowserLauncher: Send + Sync {
    fn open(&self, uri: &Url) -> std::io::Result<()>;
}

/// Sequences a zero-downtime takeover of the configured host/port pair:
/// tell any prior occupant to vacate and wait for it, start the hosted
/// service, arm the control channel with the service's stop path, then
/// publish `Enabled`.
pub struct LifecycleCoordinator {
    config: ServerConfig,
    status: StatusCell,
    process_stop: StopSignal,
    drain_timeout: Duration,
    browser: Option<Box<dyn BrowserLauncher>>,
}

impl LifecycleCoordinator {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            status: StatusCell::new(),
            process_stop: StopSignal::new(),
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
            browser: None,
        }
    }

    pub fn with_browser_launcher(mut self, launcher: Box<dyn BrowserLauncher>) -> Self {
        self.browser = Some(launcher);
        self
    }

    /// Bound on draining the hosted service at shutdown (distinct from the
    /// configured wait for a prior instance).
    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    /// Receiver usable before `start`, e.g. to wire a health endpoint.
    pub fn subscribe_status(&self) -> watch::Receiver<RunningStatus> {
        self.status.subscribe()
    }

    /// Signal the instance at the configured control address and wait for it
    /// to vacate, without starting anything. Returns whether the port went
    /// quiet within the configured bound.
    pub async fn stop_existing(&self) -> Result<bool> {
        let remote = RemoteShutdownClient::from_config(&self.config);
        remote
            .clear_prior_instance(self.config.shutdown_timeout())
            .await
    }

    /// Run the startup sequence and hand back the running instance.
    ///
    /// A prior occupant that cannot be confirmed gone never blocks the new
    /// instance, and neither does a taken control port (the instance then
    /// runs without remote shutdown). Callers typically follow up with
    /// [`RunningServer::wait_for_stop`] to keep the process alive.
    pub async fn start(self, service: &dyn HostedService) -> Result<RunningServer> {
        self.status.advance(RunningStatus::Starting);

        // Best effort: a prior instance we cannot reach must not stop us
        // from taking over the berth.
        let remote = RemoteShutdownClient::from_config(&self.config);
        match remote
            .clear_prior_instance(self.config.shutdown_timeout())
            .await
        {
            Ok(true) => info!("Control port {} is free", self.config.control_addr()),
            Ok(false) => warn!(
                "Prior instance at {} still reachable after {}ms, starting anyway",
                self.config.control_addr(),
                self.config.shutdown_timeout_ms
            ),
            Err(e) => warn!("Could not confirm prior instance shutdown: {e}"),
        }

        let base_uri = self.config.base_uri()?;
        let handle = service.start(&base_uri).await?;
        info!("Application started at {base_uri}");

        let stop_path = Arc::new(StopPath {
            service: handle,
            status: self.status.clone(),
            process_stop: self.process_stop.clone(),
            drain_timeout: self.drain_timeout,
            engaged: AtomicBool::new(false),
        });

        let controller = Arc::new(
            ShutdownController::new(&self.config, self.status.clone(), self.process_stop.clone())
                .with_drain_timeout(self.drain_timeout),
        );
        match controller
            .start(Arc::clone(&stop_path) as Arc<dyn ServiceHandle>)
            .await
        {
            Ok(()) => {}
            Err(e @ ControlError::Bind { .. }) => {
                warn!("{e}; remote shutdown unavailable for this instance");
            }
            Err(e) => return Err(e),
        }

        // Every shutdown trigger funnels into the same stop path, the
        // process signal included.
        let signal_stop = Arc::clone(&stop_path);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
                    signal_stop.run().await;
                }
                Err(e) => error!("Failed to listen for SIGINT: {e}"),
            }
        });

        if self.config.open_browser {
            match &self.browser {
                Some(launcher) => match launcher.open(&base_uri) {
                    Ok(()) => info!("Opened browser at {base_uri}"),
                    Err(e) => warn!("Could not open browser at {base_uri}: {e}"),
                },
                None => warn!("open_browser is set but no browser launcher was provided"),
            }
        }

        self.status.advance(RunningStatus::Enabled);

        Ok(RunningServer {
            base_uri,
            status: self.status,
            process_stop: self.process_stop,
            stop_path,
            controller,
        })
    }
}

/// A started instance: the hosted service, its control channel and the
/// process-level stop signal.
pub struct RunningServer {
    base_uri: Url,
    status: StatusCell,
    process_stop: StopSignal,
    stop_path: Arc<StopPath>,
    controller: Arc<ShutdownController>,
}

impl RunningServer {
    pub fn base_uri(&self) -> &Url {
        &self.base_uri
    }

    pub fn status(&self) -> RunningStatus {
        self.status.get()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<RunningStatus> {
        self.status.subscribe()
    }

    pub fn controller(&self) -> &ShutdownController {
        &self.controller
    }

    /// Block until some trigger (control channel, signal, local call) has
    /// finished shutting the instance down.
    pub async fn wait_for_stop(&self) {
        let mut guard = self.process_stop.guard();
        guard.wait().await;
    }

    /// Shut down *this* instance: drain the hosted service within the bound
    /// and release the process. Same idempotent path the control channel and
    /// the signal handler use.
    pub async fn shutdown_this(&self) {
        self.stop_path.run().await;
    }
}

/// The one idempotent stop sequence every trigger funnels into.
#[derive(Debug)]
struct StopPath {
    service: Arc<dyn ServiceHandle>,
    status: StatusCell,
    process_stop: StopSignal,
    drain_timeout: Duration,
    engaged: AtomicBool,
}

impl StopPath {
    async fn run(&self) {
        // Losers of this race return immediately; the winner drains.
        if self.engaged.swap(true, Ordering::SeqCst) {
            return;
        }

        self.status.advance(RunningStatus::Restricted);
        self.service.stop(self.drain_timeout).await;
        self.status.advance(RunningStatus::Disabled);
        self.process_stop.trigger();
    }
}

#[async_trait]
impl ServiceHandle for StopPath {
    async fn stop(&self, _timeout: Duration) {
        self.run().await;
    }

    async fn stop_now(&self) {
        if self.engaged.swap(true, Ordering::SeqCst) {
            return;
        }

        self.service.stop_now().await;
        self.status.advance(RunningStatus::Disabled);
        self.process_stop.trigger();
    }
}
