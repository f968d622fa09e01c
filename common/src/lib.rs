//! Shared leaf types for the whiteboard workspace.
//!
//! Nothing in here knows about strokes, zones or sockets. These are the
//! small pieces every other crate leans on:
//!
//! - [`ErrorLocation`]: where an error was raised, captured with `#[track_caller]`
//! - [`RedactedSecret`]: passwords and auth tokens that never reach a log line
//! - [`HttpStatusCode`]: status classification for crossbar responses

pub mod error;
pub mod http_status;
pub mod redacted_secret;

#[cfg(test)]
mod tests;

pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use http_status::HttpStatusCode;
pub use redacted_secret::RedactedSecret;
