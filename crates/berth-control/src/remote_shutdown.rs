use crate::{ControlError, PROBE_CONNECT_TIMEOUT, PROBE_INTERVAL, Result, SHUTDOWN_TOKEN};

use std::io::ErrorKind;
use std::time::Duration;

use log::{debug, info};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::{Instant, sleep, timeout};

/// Signals a prior instance on its control port and waits for it to vacate.
///
/// Connection refused is never an error here: it is the normal answer when
/// no prior instance exists.
pub struct RemoteShutdownClient {
    addr: String,
}

impl RemoteShutdownClient {
    pub fn new(host_name: &str, control_port: u16) -> Self {
        Self {
            addr: format!("{host_name}:{control_port}"),
        }
    }

    pub fn from_config(config: &berth_config::ServerConfig) -> Self {
        Self::new(&config.host_name, config.control_port)
    }

    /// Send the shutdown token over a short-lived connection.
    ///
    /// Returns `Ok(())` both when the token was delivered and when nothing
    /// was listening.
    pub async fn send_shutdown(&self) -> Result<()> {
        let mut stream = match self.connect().await? {
            Some(stream) => stream,
            None => {
                debug!("No prior instance listening at {}", self.addr);
                return Ok(());
            }
        };

        stream
            .write_all(SHUTDOWN_TOKEN)
            .await
            .map_err(|source| ControlError::Probe {
                addr: self.addr.clone(),
                source,
            })?;

        // Half-close so the peer sees the full write even if it reads lazily.
        let _ = stream.shutdown().await;

        info!("Shutdown token sent to {}", self.addr);
        Ok(())
    }

    /// Whether something is accepting connections on the control port.
    pub async fn probe(&self) -> Result<bool> {
        Ok(self.connect().await?.is_some())
    }

    /// Poll until the control port stops accepting connections or
    /// `timeout_bound` elapses. Returns `true` as soon as the port is quiet,
    /// `false` if the deadline passed with the port still reachable - the
    /// caller decides whether that is acceptable.
    ///
    /// Probes are spaced by a short fixed delay; the prior instance needs
    /// wall-clock time to finish draining.
    pub async fn wait_for_shutdown(&self, timeout_bound: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout_bound;
        let mut first = true;

        loop {
            if !first {
                sleep(PROBE_INTERVAL).await;
            }
            first = false;

            if !self.probe().await? {
                debug!("Control port {} is quiet", self.addr);
                return Ok(true);
            }

            if Instant::now() >= deadline {
                info!(
                    "Prior instance at {} still reachable after {timeout_bound:?}",
                    self.addr
                );
                return Ok(false);
            }
        }
    }

    /// Signal a prior instance and wait for it to vacate - the full
    /// notify-before-bind handshake of a redeploy.
    pub async fn clear_prior_instance(&self, timeout_bound: Duration) -> Result<bool> {
        self.send_shutdown().await?;
        self.wait_for_shutdown(timeout_bound).await
    }

    /// Bounded connect. `Ok(None)` on connection refused, [`ControlError::Probe`]
    /// on anything else that goes wrong (including the connect bound expiring).
    async fn connect(&self) -> Result<Option<TcpStream>> {
        match timeout(PROBE_CONNECT_TIMEOUT, TcpStream::connect(&self.addr)).await {
            Ok(Ok(stream)) => Ok(Some(stream)),
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => Ok(None),
            Ok(Err(source)) => Err(ControlError::Probe {
                addr: self.addr.clone(),
                source,
            }),
            Err(_) => Err(ControlError::Probe {
                addr: self.addr.clone(),
                source: std::io::Error::new(
                    ErrorKind::TimedOut,
                    format!("connect not answered within {PROBE_CONNECT_TIMEOUT:?}"),
                ),
            }),
        }
    }
}
