use crate::error::crossbar::CrossbarError;

use common::ErrorLocation;

use std::io::Error as IoError;
use std::panic::Location;

use thiserror::Error as ThisError;

/// Failure of a best-effort side effect. Logged, never propagated into the
/// protocol state.
#[derive(Debug, ThisError)]
pub enum EffectError {
    #[error("Call Placement Error: {source} {location}")]
    CallPlacement {
        #[source]
        source: CrossbarError,
        location: ErrorLocation,
    },

    #[error("Alert Player Error: {message} {location}")]
    AlertPlayer {
        message: String,
        location: ErrorLocation,
    },
}

impl From<CrossbarError> for EffectError {
    #[track_caller]
    fn from(error: CrossbarError) -> Self {
        EffectError::CallPlacement {
            source: error,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<IoError> for EffectError {
    #[track_caller]
    fn from(error: IoError) -> Self {
        EffectError::AlertPlayer {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
