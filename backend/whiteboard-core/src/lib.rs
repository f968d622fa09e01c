pub mod channel;
pub mod config;
pub mod crossbar;
pub mod effects;
pub mod error;
pub mod geometry;
pub mod protocol;
pub mod render;
pub mod session;

#[cfg(test)]
mod tests;

/// Event category the collaboration server tags whiteboard events with.
pub const COLLAB_EVENT_CATEGORY: &str = "collabazoo";
/// Subscription binding for all whiteboard events on an account.
pub const COLLAB_SUBSCRIBE_BINDING: &str = const_format::concatcp!(COLLAB_EVENT_CATEGORY, ".event");
/// Outbound action name for whiteboard commands (e.g. `clear`).
pub const COLLAB_COMMAND_ACTION: &str = COLLAB_EVENT_CATEGORY;

pub const DEFAULT_CROSSBAR_URL: &str = "https://localhost:8443/v2/";
pub const DEFAULT_REALTIME_URL: &str = "wss://localhost:5555";
pub const DEFAULT_QUICKCALL_EXTENSION: &str = "1003";
