use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Config error: {0}")]
    Config(#[from] berth_config::ConfigError),

    #[error("Control error: {0}")]
    Control(#[from] berth_control::ControlError),

    #[error("Logger error: {message}")]
    Logger { message: String },

    #[error("Resolution error: {message} {location}")]
    Resolve {
        message: String,
        location: ErrorLocation,
    },
}

impl ServerError {
    /// Create a container-resolution error
    #[track_caller]
    pub fn resolve<S: Into<String>>(message: S) -> Self {
        ServerError::Resolve {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
