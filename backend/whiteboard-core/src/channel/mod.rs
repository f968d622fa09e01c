//! The single realtime connection to the collaboration endpoint.
//!
//! [`RealtimeChannel`] owns at most one websocket at a time and reports what
//! happens on it as [`ChannelEvent`]s pushed into one ordered queue. It holds
//! no application state: subscription, session and reset logic belong to the
//! protocol machine, which also drops events from superseded connections by
//! comparing [`ConnectionId`]s.
//!
//! # Contract
//!
//! - At most one `Opened` per connect
//! - Exactly one terminal `Closed` per connect, including after a
//!   `TransportError` and when the connection never came up
//! - Events of one connection arrive in transport order
//! - Nothing is emitted for a connection once [`RealtimeChannel::close`] returns

mod event;
pub(crate) mod realtime;

pub use event::{ChannelEvent, ChannelEventKind, ConnectionId};
pub use realtime::{RealtimeChannel, SendOutcome};
