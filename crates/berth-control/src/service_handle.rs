use crate::Result;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

/// Stop-handle for a running hosted service.
///
/// Implementations must be idempotent and race-safe: the control-channel
/// task, an external stop request and the process signal handler may all
/// call these concurrently.
#[async_trait]
pub trait ServiceHandle: Send + Sync + std::fmt::Debug {
    /// Drain in-flight work for up to `timeout`, then forcibly terminate
    /// whatever remains.
    async fn stop(&self, timeout: Duration);

    /// Terminate immediately without draining.
    async fn stop_now(&self);
}

/// Seam to the external request-handling framework: given the base URI,
/// start serving and hand back a stop-handle.
#[async_trait]
pub trait HostedService: Send + Sync {
    async fn start(&self, base_uri: &Url) -> Result<Arc<dyn ServiceHandle>>;
}
