use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum ControlError {
    #[error("Config error: {0}")]
    Config(#[from] berth_config::ConfigError),

    #[error("Control channel is already started")]
    AlreadyStarted,

    #[error("Failed to bind control port at {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to obtain controller lock within 5s during {operation} {location}")]
    LockTimeout {
        operation: &'static str,
        location: ErrorLocation,
    },

    #[error("Probe of {addr} failed unexpectedly: {source}")]
    Probe {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Hosted service error: {message}")]
    Service { message: String },
}

impl ControlError {
    #[track_caller]
    pub(crate) fn lock_timeout(operation: &'static str) -> Self {
        ControlError::LockTimeout {
            operation,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Create a hosted-service error
    pub fn service<S: Into<String>>(message: S) -> Self {
        ControlError::Service {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ControlError>;
