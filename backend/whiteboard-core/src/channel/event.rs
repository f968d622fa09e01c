use std::fmt::{Display, Formatter, Result as FormatResult};

use uuid::Uuid;

/// Identity of one `connect` call. Events are stamped with it so a stale
/// connection's late events can be told apart from the current one's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for ConnectionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEventKind {
    Opened,
    /// Terminal. Carries `"<code>"` or `"<code> (<reason>)"`, or the connect failure.
    Closed(String),
    /// Raw text frame, not yet parsed.
    Message(String),
    TransportError(String),
}

impl ChannelEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            ChannelEventKind::Opened => "Opened",
            ChannelEventKind::Closed(_) => "Closed",
            ChannelEventKind::Message(_) => "Message",
            ChannelEventKind::TransportError(_) => "TransportError",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEvent {
    pub connection: ConnectionId,
    pub kind: ChannelEventKind,
}
