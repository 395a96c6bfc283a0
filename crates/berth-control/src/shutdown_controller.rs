use crate::{
    ACCEPT_TIMEOUT, ControlChannelState, ControlError, DEFAULT_DRAIN_TIMEOUT, LOCK_TIMEOUT, Result,
    RunningStatus, SHUTDOWN_TOKEN, ServiceHandle, StatusCell, StopGuard, StopSignal,
};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Listens on the control port and translates the shutdown token into
/// termination of the hosted service.
///
/// The accept loop runs as its own task and exclusively owns the listening
/// socket; `start`/`stop` coordinate with it through a [`StopSignal`] and a
/// bounded-wait lock around the task handle and channel state. A controller
/// is single-use: once stopped it cannot be restarted.
pub struct ShutdownController {
    control_addr: String,
    drain_timeout: Duration,
    status: StatusCell,
    process_stop: StopSignal,
    loop_stop: StopSignal,
    inner: Arc<Mutex<ControllerInner>>,
}

pub(crate) struct ControllerInner {
    state: ControlChannelState,
    accept_task: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
}

impl ShutdownController {
    /// `status` receives the RESTRICTED/DISABLED transitions of a
    /// token-triggered shutdown; `process_stop` fires once that shutdown has
    /// completed so the embedding process can exit.
    pub fn new(
        config: &berth_config::ServerConfig,
        status: StatusCell,
        process_stop: StopSignal,
    ) -> Self {
        Self {
            control_addr: config.control_addr(),
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
            status,
            process_stop,
            loop_stop: StopSignal::new(),
            inner: Arc::new(Mutex::new(ControllerInner {
                state: ControlChannelState::NotStarted,
                accept_task: None,
                local_addr: None,
            })),
        }
    }

    /// Bound on draining the hosted service when the token arrives.
    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    /// Bind the control port and launch the accept loop.
    ///
    /// Returns immediately once the loop is running; `service` is captured
    /// for the eventual shutdown. Fails with [`ControlError::AlreadyStarted`]
    /// if the controller is or was ever running, and with
    /// [`ControlError::Bind`] if the control port is taken - callers treat
    /// the latter as a degraded mode, not a fatal condition.
    pub async fn start(&self, service: Arc<dyn ServiceHandle>) -> Result<()> {
        let mut inner = self.lock("start").await?;

        if inner.state != ControlChannelState::NotStarted {
            return Err(ControlError::AlreadyStarted);
        }

        let listener = TcpListener::bind(&self.control_addr)
            .await
            .map_err(|source| ControlError::Bind {
                addr: self.control_addr.clone(),
                source,
            })?;

        let local_addr = listener.local_addr().ok();
        inner.local_addr = local_addr;
        inner.state = ControlChannelState::Listening;

        let accept_loop = AcceptLoop {
            listener,
            service,
            status: self.status.clone(),
            process_stop: self.process_stop.clone(),
            inner: Arc::clone(&self.inner),
            drain_timeout: self.drain_timeout,
        };
        let cancel = self.loop_stop.guard();
        inner.accept_task = Some(tokio::spawn(accept_loop.run(cancel)));

        match local_addr {
            Some(addr) => info!("Control channel accepting connections on {addr}"),
            None => info!("Control channel accepting connections on {}", self.control_addr),
        }

        Ok(())
    }

    /// Stop the control channel (not the hosted service).
    ///
    /// Signals the accept loop, which closes the listening socket it owns
    /// when it exits. Idempotent: stopping a never-started or already
    /// stopped controller is a no-op.
    pub async fn stop(&self) -> Result<()> {
        let mut inner = self.lock("stop").await?;

        if inner.accept_task.take().is_none() {
            return Ok(());
        }

        if inner.state == ControlChannelState::Listening {
            inner.state = ControlChannelState::StopRequested;
        }
        drop(inner);

        self.loop_stop.trigger();
        Ok(())
    }

    pub async fn state(&self) -> Result<ControlChannelState> {
        Ok(self.lock("state").await?.state)
    }

    /// Actual bound address of the control socket (useful when the
    /// configured control port is 0 and the OS picked one).
    pub async fn local_addr(&self) -> Result<Option<SocketAddr>> {
        Ok(self.lock("local_addr").await?.local_addr)
    }

    async fn lock(&self, operation: &'static str) -> Result<MutexGuard<'_, ControllerInner>> {
        timeout(LOCK_TIMEOUT, self.inner.lock())
            .await
            .map_err(|_| ControlError::lock_timeout(operation))
    }

    #[cfg(test)]
    pub(crate) async fn lock_unbounded(&self) -> MutexGuard<'_, ControllerInner> {
        self.inner.lock().await
    }
}

struct AcceptLoop {
    listener: TcpListener,
    service: Arc<dyn ServiceHandle>,
    status: StatusCell,
    process_stop: StopSignal,
    inner: Arc<Mutex<ControllerInner>>,
    drain_timeout: Duration,
}

impl AcceptLoop {
    async fn run(self, mut cancel: StopGuard) {
        loop {
            tokio::select! {
                _ = cancel.wait() => {
                    info!("Control channel stopped, terminating accept loop");
                    self.set_state(ControlChannelState::Stopped).await;
                    return;
                }
                accepted = timeout(ACCEPT_TIMEOUT, self.listener.accept()) => {
                    let (stream, peer) = match accepted {
                        // Bounded accept expired; go observe cancellation again.
                        Err(_) => continue,
                        Ok(Err(e)) => {
                            error!("Control channel accept failed, remote shutdown no longer available: {e}");
                            self.set_state(ControlChannelState::Stopped).await;
                            return;
                        }
                        Ok(Ok(conn)) => conn,
                    };

                    match read_for_token(stream, peer).await {
                        Ok(true) => {
                            info!("Shutdown command received from {peer}");
                            self.trigger_shutdown().await;
                            return;
                        }
                        Ok(false) => {}
                        Err(e) => {
                            error!("Control connection from {peer} failed, remote shutdown no longer available: {e}");
                            self.set_state(ControlChannelState::Stopped).await;
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Token received: drain the hosted service within the bound, then let
    /// the embedding process know it can exit. This is the only place the
    /// control channel touches the hosted service.
    async fn trigger_shutdown(&self) {
        self.set_state(ControlChannelState::StopRequested).await;
        self.status.advance(RunningStatus::Restricted);

        self.service.stop(self.drain_timeout).await;

        self.status.advance(RunningStatus::Disabled);
        self.set_state(ControlChannelState::Stopped).await;
        self.process_stop.trigger();
    }

    async fn set_state(&self, state: ControlChannelState) {
        match timeout(LOCK_TIMEOUT, self.inner.lock()).await {
            Ok(mut inner) => inner.state = state,
            Err(_) => error!("Controller lock unavailable while recording state {state}"),
        }
    }
}

/// Read from a control connection until the accumulated bytes equal the
/// shutdown token, can no longer become it, or the peer goes away.
///
/// Recognition is incremental so the token split across any number of
/// writes still matches; no framing delimiter exists on this channel.
async fn read_for_token(mut stream: TcpStream, peer: SocketAddr) -> std::io::Result<bool> {
    let mut received: Vec<u8> = Vec::with_capacity(SHUTDOWN_TOKEN.len());
    let mut chunk = [0u8; 64];

    loop {
        let read = match timeout(ACCEPT_TIMEOUT, stream.read(&mut chunk)).await {
            Err(_) => {
                warn!("Control connection from {peer} went silent, dropping it");
                return Ok(false);
            }
            Ok(Err(e)) => return Err(e),
            Ok(Ok(0)) => {
                info!("Control connection from {peer} closed without a recognized command");
                return Ok(false);
            }
            Ok(Ok(n)) => n,
        };

        received.extend_from_slice(&chunk[..read]);

        if received.as_slice() == SHUTDOWN_TOKEN {
            // Anything the peer still has in flight is ignored.
            return Ok(true);
        }

        if !SHUTDOWN_TOKEN.starts_with(received.as_slice()) {
            return drain_unrecognized(stream, peer).await;
        }
    }
}

/// The buffer can no longer match; read until the peer closes, then drop
/// the connection without action.
async fn drain_unrecognized(mut stream: TcpStream, peer: SocketAddr) -> std::io::Result<bool> {
    let mut chunk = [0u8; 256];

    loop {
        match timeout(ACCEPT_TIMEOUT, stream.read(&mut chunk)).await {
            Err(_) | Ok(Ok(0)) => {
                info!("Unrecognized control command from {peer}, ignored");
                return Ok(false);
            }
            Ok(Err(e)) => return Err(e),
            Ok(Ok(_)) => {}
        }
    }
}
