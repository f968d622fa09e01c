use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

/// Inbound data that could not be turned into a whiteboard event.
///
/// Shape errors are swallowed by the state machine; only an explicit error
/// status is escalated to a session reset.
#[derive(Debug, ThisError)]
pub enum ProtocolError {
    #[error("Payload Parse Error: {message} {location}")]
    Parse {
        message: String,
        location: ErrorLocation,
    },

    #[error("Payload Shape Error: {message} {location}")]
    Shape {
        message: String,
        location: ErrorLocation,
    },

    #[error("Machine Stopped Error: {message} {location}")]
    MachineStopped {
        message: String,
        location: ErrorLocation,
    },
}

impl From<serde_json::Error> for ProtocolError {
    #[track_caller]
    fn from(error: serde_json::Error) -> Self {
        ProtocolError::Parse {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
