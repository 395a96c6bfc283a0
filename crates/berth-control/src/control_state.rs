/// State of the control channel itself.
///
/// `NotStarted` → `Listening` on a successful bind, `Listening` →
/// `StopRequested` on token receipt or an external stop call,
/// `StopRequested` → `Stopped` once teardown completes. `Stopped` is
/// terminal; a controller is never restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlChannelState {
    NotStarted,
    Listening,
    StopRequested,
    Stopped,
}

impl std::fmt::Display for ControlChannelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ControlChannelState::NotStarted => "not started",
            ControlChannelState::Listening => "listening",
            ControlChannelState::StopRequested => "stop requested",
            ControlChannelState::Stopped => "stopped",
        };
        write!(f, "{name}")
    }
}
