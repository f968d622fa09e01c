use whiteboard_core::error::CoreError;
use whiteboard_core::error::config::ConfigError;
use whiteboard_core::error::crossbar::CrossbarError;
use whiteboard_core::error::protocol::ProtocolError;
use whiteboard_core::error::session::SessionStoreError;

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error;

/// Errors surfaced by the console front end.
///
/// Core errors are kept whole as the source; the location is where the
/// console code hit them.
#[derive(Debug, Error)]
pub enum WhiteboardError {
    /// Error from this App
    #[error("Whiteboard Error: {message} {location}")]
    Whiteboard {
        message: String,
        location: ErrorLocation,
    },

    /// Error from whiteboard-core (config, crossbar, session store, machine)
    #[error("Core Error: {source} {location}")]
    Core {
        #[source]
        source: CoreError,
        location: ErrorLocation,
    },

    /// Incomplete or unreadable credentials
    #[error("Credentials Error: {message} {location}")]
    Credentials {
        message: String,
        location: ErrorLocation,
    },

    /// Operator typed something that is not a command
    #[error("Command Error: {message} {location}")]
    Command {
        message: String,
        location: ErrorLocation,
    },
}

impl From<CoreError> for WhiteboardError {
    #[track_caller]
    fn from(error: CoreError) -> Self {
        WhiteboardError::Core {
            source: error,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConfigError> for WhiteboardError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        WhiteboardError::from(CoreError::from(error))
    }
}

impl From<CrossbarError> for WhiteboardError {
    #[track_caller]
    fn from(error: CrossbarError) -> Self {
        WhiteboardError::from(CoreError::from(error))
    }
}

impl From<SessionStoreError> for WhiteboardError {
    #[track_caller]
    fn from(error: SessionStoreError) -> Self {
        WhiteboardError::from(CoreError::from(error))
    }
}

impl From<ProtocolError> for WhiteboardError {
    #[track_caller]
    fn from(error: ProtocolError) -> Self {
        WhiteboardError::from(CoreError::from(error))
    }
}
