use common::ErrorLocation;

use thiserror::Error as ThisError;

/// Malformed stroke or zone data reaching the validator.
///
/// This is a contract violation by the caller, never a classification: a corrupt
/// inbound stroke must not be reported as a safe rejection.
#[derive(Debug, ThisError)]
pub enum GeometryError {
    #[error("Empty Stroke Error: {message} {location}")]
    EmptyStroke {
        message: String,
        location: ErrorLocation,
    },

    #[error("Non-Finite Coordinate Error: point {index} is ({x}, {y}) {location}")]
    NonFiniteCoordinate {
        index: usize,
        x: f64,
        y: f64,
        location: ErrorLocation,
    },

    #[error("Invalid Zone Error: {message} {location}")]
    InvalidZone {
        message: String,
        location: ErrorLocation,
    },
}
