use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_CONTROL_PORT, DEFAULT_HOST_NAME, DEFAULT_PORT,
    DEFAULT_SHUTDOWN_TIMEOUT_MS,
};

use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// Host/port identity of one server instance. Constructed once at process
/// start and read-only afterwards; the control channel and the hosted-service
/// factory both share it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host_name: String,
    /// Port the hosted application listens on
    pub port: u16,
    /// Dedicated port the shutdown control channel listens on (when running)
    /// or that a shutdown token is sent to (when replacing a prior instance)
    pub control_port: u16,
    /// Path the hosted application is mounted under ("" = server root)
    pub path_prefix: String,
    /// Bound on waiting for a prior instance to vacate, in milliseconds
    pub shutdown_timeout_ms: u64,
    /// Open a web browser at the base URI after startup (development convenience)
    pub open_browser: bool,
    /// Only signal the instance at host_name:control_port and exit; do not
    /// start a new instance
    pub stop_only: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host_name: String::from(DEFAULT_HOST_NAME),
            port: DEFAULT_PORT,
            control_port: DEFAULT_CONTROL_PORT,
            path_prefix: String::new(),
            shutdown_timeout_ms: DEFAULT_SHUTDOWN_TIMEOUT_MS,
            open_browser: false,
            stop_only: false,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.port == 0 {
            return Err(ConfigError::server("server port must be nonzero"));
        }

        if self.control_port == 0 {
            return Err(ConfigError::server("control port must be nonzero"));
        }

        // The control channel and the hosted service cannot share a socket.
        if self.control_port == self.port {
            return Err(ConfigError::server(format!(
                "control_port must be distinct from port, both are {}",
                self.port
            )));
        }

        Ok(())
    }

    /// URI the hosted application will be reachable at, given the host name,
    /// port and path prefix. An empty prefix collapses to the server root;
    /// stray slashes and whitespace in the prefix are normalized away.
    pub fn base_uri(&self) -> ConfigErrorResult<Url> {
        let prefix = self.path_prefix.trim().trim_matches('/');

        let uri = if prefix.is_empty() {
            format!("http://{}:{}/", self.host_name, self.port)
        } else {
            format!("http://{}:{}/{}/", self.host_name, self.port, prefix)
        };

        Url::parse(&uri).map_err(|source| ConfigError::BaseUri { uri, source })
    }

    /// Bind address of the hosted application as `host:port`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host_name, self.port)
    }

    /// Address of the control channel as `host:port`.
    pub fn control_addr(&self) -> String {
        format!("{}:{}", self.host_name, self.control_port)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}
