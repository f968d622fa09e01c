use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CrossbarError {
    #[error("HTTP Error: {message} {location}")]
    Http {
        message: String,
        location: ErrorLocation,
    },

    #[error("JSON Error: {message} {location}")]
    Json {
        message: String,
        location: ErrorLocation,
    },

    #[error("URL Parse Error: {message} {location}")]
    UrlParse {
        message: String,
        location: ErrorLocation,
    },

    /// Non-2xx response. `message` is the body's own `message` field, shown to
    /// the operator as-is.
    #[error("Rejected ({status}): {message} {location}")]
    Rejected {
        status: HttpStatusCode,
        message: String,
        location: ErrorLocation,
    },
}

impl CrossbarError {
    /// Text for the operator's status line.
    pub fn operator_message(&self) -> String {
        match self {
            CrossbarError::Http { message, .. }
            | CrossbarError::Json { message, .. }
            | CrossbarError::UrlParse { message, .. }
            | CrossbarError::Rejected { message, .. } => message.clone(),
        }
    }
}

impl From<url::ParseError> for CrossbarError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        CrossbarError::UrlParse {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<reqwest::Error> for CrossbarError {
    #[track_caller]
    fn from(error: reqwest::Error) -> Self {
        CrossbarError::Http {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for CrossbarError {
    #[track_caller]
    fn from(error: serde_json::Error) -> Self {
        CrossbarError::Json {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
