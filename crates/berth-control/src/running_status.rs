/// Externally observable lifecycle of a hosted instance.
///
/// Transitions only move forward: `Starting` at coordinator invocation,
/// `Enabled` once the hosted service and control channel are both live,
/// `Restricted` while a graceful drain is in progress, `Disabled` terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunningStatus {
    Unknown,
    Starting,
    Enabled,
    Restricted,
    Disabled,
}

impl RunningStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunningStatus::Disabled)
    }
}

impl std::fmt::Display for RunningStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunningStatus::Unknown => "UNKNOWN",
            RunningStatus::Starting => "STARTING",
            RunningStatus::Enabled => "ENABLED",
            RunningStatus::Restricted => "RESTRICTED",
            RunningStatus::Disabled => "DISABLED",
        };
        write!(f, "{name}")
    }
}
