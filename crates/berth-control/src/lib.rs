pub mod control_state;
pub mod error;
pub mod lifecycle;
pub mod remote_shutdown;
pub mod running_status;
pub mod service_handle;
pub mod shutdown_controller;
pub mod status_cell;
pub mod stop_guard;
pub mod stop_signal;

pub use control_state::ControlChannelState;
pub use error::{ControlError, Result};
pub use lifecycle::{BrowserLauncher, LifecycleCoordinator, RunningServer};
pub use remote_shutdown::RemoteShutdownClient;
pub use running_status::RunningStatus;
pub use service_handle::{HostedService, ServiceHandle};
pub use shutdown_controller::ShutdownController;
pub use status_cell::StatusCell;
pub use stop_guard::StopGuard;
pub use stop_signal::StopSignal;

use std::time::Duration;

/// The one command the control channel understands: exactly these eight
/// ASCII bytes, no length prefix, no terminator.
pub const SHUTDOWN_TOKEN: &[u8] = b"SHUTDOWN";

/// Bound on a single accept call so the loop periodically observes
/// cancellation; doubles as the per-connection read deadline.
const ACCEPT_TIMEOUT: Duration = Duration::from_secs(5);

/// Bound on acquiring the controller lock; expiry is a fatal condition at
/// the call site.
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Bound on a single probe connect attempt.
const PROBE_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

/// Delay between probes while waiting for a prior instance to vacate.
const PROBE_INTERVAL: Duration = Duration::from_millis(50);

/// Default bound on draining the hosted service at shutdown.
const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[cfg(test)]
mod tests;
