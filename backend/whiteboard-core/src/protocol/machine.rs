//! Session and channel state, and the reaction to every input.
//!
//! ```text
//!   LoggedOut --Authenticate(session)--> Connected (channel Connecting)
//!   Connected --Opened--> Connected (channel Connected, subscribe sent)
//!   Connected --Message--> Connected (draw / clear / ignored / swallowed)
//!   Connected --error status | TransportError | Closed | Logout--> LoggedOut
//! ```
//!
//! Every channel event is checked against the connection the machine is
//! currently waiting on; events from any other connection are discarded.

use crate::channel::{ChannelEvent, ChannelEventKind, ConnectionId, RealtimeChannel};
use crate::effects::{AudioAlert, CallPlacement, SideEffects};
use crate::geometry::{Policy, Verdict};
use crate::protocol::wire::{
    self, CLEAR_COMMAND, CollabCommandData, CollabCommandPayload, DrawEvent, Inbound,
    SUBSCRIBE_ACTION, SubscribeData, SubscribePayload,
};
use crate::render::{self, OperatorView};
use crate::session::Session;
use crate::{COLLAB_COMMAND_ACTION, COLLAB_SUBSCRIBE_BINDING};

use std::sync::Arc;

use log::{debug, error, info, warn};
use url::Url;

const SIGNED_OUT_MESSAGE: &str = "Signed out";

/// Where the machine connects and what it subscribes to.
#[derive(Debug, Clone)]
pub struct MachineSettings {
    pub endpoint: Url,
    pub binding: String,
}

impl MachineSettings {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            binding: COLLAB_SUBSCRIBE_BINDING.to_string(),
        }
    }
}

/// Operator-side inputs.
#[derive(Debug, Clone)]
pub enum Command {
    Authenticate(Session),
    /// Ask the server to clear everyone's surface.
    ClearSurface,
    Logout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Disconnected,
    Connecting(ConnectionId),
    Connected(ConnectionId),
}

impl ChannelState {
    fn connection(&self) -> Option<ConnectionId> {
        match self {
            ChannelState::Disconnected => None,
            ChannelState::Connecting(id) | ChannelState::Connected(id) => Some(*id),
        }
    }
}

pub struct ProtocolStateMachine<V, C, A> {
    channel: RealtimeChannel,
    channel_state: ChannelState,
    session: Option<Session>,
    settings: MachineSettings,
    policy: Arc<Policy>,
    view: V,
    effects: SideEffects<C, A>,
}

impl<V, C, A> ProtocolStateMachine<V, C, A>
where
    V: OperatorView,
    C: CallPlacement,
    A: AudioAlert,
{
    pub fn new(
        channel: RealtimeChannel,
        settings: MachineSettings,
        policy: Arc<Policy>,
        view: V,
        effects: SideEffects<C, A>,
    ) -> Self {
        Self {
            channel,
            channel_state: ChannelState::Disconnected,
            session: None,
            settings,
            policy,
            view,
            effects,
        }
    }

    /// `Connected` iff a session is held and its channel is the live one.
    pub fn state(&self) -> SessionState {
        match self.channel_state {
            ChannelState::Disconnected => SessionState::LoggedOut,
            ChannelState::Connecting(_) | ChannelState::Connected(_) => SessionState::Connected,
        }
    }

    pub fn channel_state(&self) -> ChannelState {
        self.channel_state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Authenticate(session) => self.start_session(session).await,
            Command::ClearSurface => self.request_clear(),
            Command::Logout => {
                if self.state() == SessionState::Connected {
                    info!("Operator signed out");
                    self.reset(SIGNED_OUT_MESSAGE).await;
                }
            }
        }
    }

    pub async fn handle_channel_event(&mut self, event: ChannelEvent) {
        let ChannelEvent { connection, kind } = event;

        if self.channel_state.connection() != Some(connection) {
            debug!(
                "Discarding {} from stale connection {connection}",
                kind.name()
            );
            return;
        }

        match kind {
            ChannelEventKind::Opened => self.on_opened(connection),
            ChannelEventKind::Message(raw) => self.on_message(&raw).await,
            ChannelEventKind::TransportError(detail) => {
                warn!("Transport error on connection {connection}: {detail}");
                self.reset(&format!("WebSocket error: {detail}")).await;
            }
            ChannelEventKind::Closed(reason) => {
                self.reset(&format!("WebSocket closed: {reason}")).await;
            }
        }
    }

    /// Close the channel without touching the view. Used when the machine stops.
    pub async fn shutdown(&mut self) {
        self.channel.close().await;
        self.channel_state = ChannelState::Disconnected;
        self.session = None;
    }

    async fn start_session(&mut self, session: Session) {
        if self.session.is_some() {
            info!("New session replaces the current one");
            self.channel.close().await;
        }

        let connection = self.channel.connect(&self.settings.endpoint);
        info!(
            "Session for account {} started on connection {connection}",
            session.account_id
        );

        self.session = Some(session);
        self.channel_state = ChannelState::Connecting(connection);

        self.view.clear_status();
        self.view.show_whiteboard();
        render::draw_policy_overlay(&mut self.view, &self.policy);
    }

    fn on_opened(&mut self, connection: ConnectionId) {
        self.channel_state = ChannelState::Connected(connection);

        let Some(session) = &self.session else {
            return;
        };

        let payload = SubscribePayload {
            auth_token: session.auth_token.expose(),
            data: SubscribeData {
                account_id: &session.account_id,
                binding: &self.settings.binding,
            },
        };

        match self.channel.send(SUBSCRIBE_ACTION, &payload) {
            Ok(outcome) => info!(
                "Subscribed to '{}' on connection {connection}: {outcome:?}",
                self.settings.binding
            ),
            Err(e) => error!("Failed to encode subscribe command: {e}"),
        }
    }

    async fn on_message(&mut self, raw: &str) {
        if !matches!(self.channel_state, ChannelState::Connected(_)) {
            debug!("Ignoring message received before the channel opened");
            return;
        }

        match wire::parse_inbound(raw) {
            Ok(Inbound::ErrorStatus(data)) => {
                warn!("Server reported an error: {data}");
                self.reset(&format!("Server error: {data}")).await;
            }
            Ok(Inbound::Draw(draw)) => self.on_draw(draw),
            Ok(Inbound::Clear) => {
                self.view.clear_surface();
                render::draw_policy_overlay(&mut self.view, &self.policy);
            }
            Ok(Inbound::Ignored { category, name }) => {
                debug!("Ignoring event {category}/{name}");
            }
            Err(e) => warn!("Dropping malformed message: {e}"),
        }
    }

    fn on_draw(&mut self, draw: DrawEvent) {
        let stroke = draw.into_stroke();

        let verdict = match self.policy.classify(&stroke) {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!("Dropping unclassifiable stroke: {e}");
                return;
            }
        };

        debug!(
            "Stroke of {} points judged {verdict:?}",
            stroke.points.len()
        );
        render::draw_stroke(&mut self.view, &stroke, verdict);

        match verdict {
            Verdict::Valid => self.trigger_call(),
            Verdict::Invalid => self.trigger_alert(),
        }
    }

    fn trigger_call(&self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        let calls = Arc::clone(&self.effects.calls);

        tokio::spawn(async move {
            if let Err(e) = calls.place_call(session).await {
                error!("Call placement failed: {e}");
            }
        });
    }

    fn trigger_alert(&self) {
        let alerts = Arc::clone(&self.effects.alerts);

        tokio::spawn(async move {
            if let Err(e) = alerts.play_alert().await {
                error!("Alert playback failed: {e}");
            }
        });
    }

    /// Goes out only while the channel is open; otherwise the channel drops it.
    fn request_clear(&self) {
        let payload = CollabCommandPayload {
            data: CollabCommandData {
                account_id: self.session.as_ref().map(|s| s.account_id.as_str()),
                command: CLEAR_COMMAND,
            },
        };

        match self.channel.send(COLLAB_COMMAND_ACTION, &payload) {
            Ok(outcome) => debug!("Clear request: {outcome:?}"),
            Err(e) => error!("Failed to encode clear command: {e}"),
        }
    }

    /// Drop to `LoggedOut`: discard the channel and session, back to the login view.
    async fn reset(&mut self, message: &str) {
        info!("Session ended: {message}");

        self.channel_state = ChannelState::Disconnected;
        self.session = None;

        self.view.hide_whiteboard();
        self.view.show_login();
        self.view.set_status(message);

        self.channel.close().await;
    }
}
