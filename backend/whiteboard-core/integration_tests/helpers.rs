//! Test helpers for whiteboard integration tests.
//!
//! - A loopback websocket server standing in for the realtime endpoint
//! - A recording [`OperatorView`] and recording side effects
//! - A harness that feeds channel events to a machine one at a time

use whiteboard_core::channel::{ChannelEvent, RealtimeChannel};
use whiteboard_core::effects::{AudioAlert, CallPlacement, SideEffects};
use whiteboard_core::error::effects::EffectError;
use whiteboard_core::geometry::{DEFAULT_POLICY, Point};
use whiteboard_core::protocol::{Command, MachineSettings, ProtocolStateMachine};
use whiteboard_core::render::OperatorView;
use whiteboard_core::session::Session;

use common::RedactedSecret;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{WebSocketStream, accept_async};
use url::Url;

/// Upper bound on any single wait in these tests.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to listen before concluding nothing is coming.
pub const QUIET_PERIOD: Duration = Duration::from_millis(200);

pub const TEST_ACCOUNT_ID: &str = "acct-1";
pub const TEST_OWNER_ID: &str = "user-7";
pub const TEST_AUTH_TOKEN: &str = "token-abc";

pub fn test_session() -> Session {
    Session::new(
        TEST_ACCOUNT_ID,
        TEST_OWNER_ID,
        RedactedSecret::new(TEST_AUTH_TOKEN),
    )
}

// ============================================================================
// Loopback realtime server
// ============================================================================

enum ServerFrame {
    Text(String),
    Close(u16, String),
}

/// Accepts websocket connections on 127.0.0.1 and hands each one to the test.
pub struct LoopbackServer {
    pub url: Url,
    connections: UnboundedReceiver<ServerSide>,
}

impl LoopbackServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind loopback server");
        let address = listener.local_addr().expect("Listener has no address");
        let url = Url::parse(&format!("ws://{address}")).expect("Loopback URL should parse");

        let (connections_tx, connections) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let connections_tx = connections_tx.clone();
                tokio::spawn(async move {
                    if let Ok(ws) = accept_async(stream).await {
                        let _ = connections_tx.send(ServerSide::serve(ws));
                    }
                });
            }
        });

        Self { url, connections }
    }

    /// Next accepted connection. Panics if none arrives in time.
    pub async fn accept(&mut self) -> ServerSide {
        tokio::time::timeout(TEST_TIMEOUT, self.connections.recv())
            .await
            .expect("Timed out waiting for a client connection")
            .expect("Loopback server stopped")
    }

    /// True if no client connected during the quiet period.
    pub async fn no_connection(&mut self) -> bool {
        tokio::time::timeout(QUIET_PERIOD, self.connections.recv())
            .await
            .is_err()
    }
}

/// Server end of one connection.
///
/// A background task keeps reading so close handshakes complete even while
/// the test is not looking at the connection.
pub struct ServerSide {
    inbound: UnboundedReceiver<String>,
    outbound: UnboundedSender<ServerFrame>,
}

impl ServerSide {
    fn serve(mut ws: WebSocketStream<TcpStream>) -> Self {
        let (inbound_tx, inbound) = mpsc::unbounded_channel();
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<ServerFrame>();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    frame = ws.next() => match frame {
                        Some(Ok(Message::Text(text))) => {
                            let _ = inbound_tx.send(text.as_str().to_owned());
                        }
                        Some(Ok(_)) => {}
                        Some(Err(_)) | None => break,
                    },
                    command = outbound_rx.recv() => match command {
                        Some(ServerFrame::Text(text)) => {
                            if ws.send(Message::Text(text.into())).await.is_err() {
                                break;
                            }
                        }
                        Some(ServerFrame::Close(code, reason)) => {
                            let frame = CloseFrame {
                                code: CloseCode::from(code),
                                reason: reason.into(),
                            };
                            let _ = ws.close(Some(frame)).await;
                        }
                        // Test dropped its end: vanish without a close frame
                        None => break,
                    },
                }
            }
        });

        Self { inbound, outbound }
    }

    pub fn push(&self, value: &Value) {
        self.push_raw(&value.to_string());
    }

    pub fn push_raw(&self, text: &str) {
        self.outbound
            .send(ServerFrame::Text(text.to_string()))
            .expect("Server connection already finished");
    }

    pub fn close(&self, code: u16, reason: &str) {
        self.outbound
            .send(ServerFrame::Close(code, reason.to_string()))
            .expect("Server connection already finished");
    }

    /// Next text frame from the client, decoded as JSON.
    pub async fn recv_json(&mut self) -> Value {
        let text = tokio::time::timeout(TEST_TIMEOUT, self.inbound.recv())
            .await
            .expect("Timed out waiting for a client frame")
            .expect("Client connection finished without sending a frame");
        serde_json::from_str(&text).expect("Client frame was not JSON")
    }

    /// True if the client sent nothing during the quiet period.
    pub async fn silent(&mut self) -> bool {
        matches!(
            tokio::time::timeout(QUIET_PERIOD, self.inbound.recv()).await,
            Err(_) | Ok(None)
        )
    }
}

// ============================================================================
// Channel events
// ============================================================================

pub async fn next_event(events: &mut UnboundedReceiver<ChannelEvent>) -> ChannelEvent {
    tokio::time::timeout(TEST_TIMEOUT, events.recv())
        .await
        .expect("Timed out waiting for a channel event")
        .expect("Channel event queue closed")
}

pub async fn no_event(events: &mut UnboundedReceiver<ChannelEvent>) -> bool {
    tokio::time::timeout(QUIET_PERIOD, events.recv())
        .await
        .is_err()
}

/// A ws:// URL on which nothing is listening.
pub async fn unused_endpoint() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind throwaway listener");
    let address = listener.local_addr().expect("Listener has no address");
    drop(listener);
    Url::parse(&format!("ws://{address}")).expect("URL should parse")
}

/// A ws:// URL whose listener accepts TCP but never answers the upgrade, so
/// every connection stays in its handshake until the client gives up.
pub async fn stalled_endpoint() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stalled listener");
    let address = listener.local_addr().expect("Listener has no address");

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    Url::parse(&format!("ws://{address}")).expect("URL should parse")
}

/// Upper bound on tearing down a connection that never opened.
pub const PROMPT_TEARDOWN: Duration = Duration::from_secs(1);

// ============================================================================
// Recording view and side effects
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    ShowWhiteboard,
    HideWhiteboard,
    ShowLogin,
    Status(String),
    ClearStatus,
    Draw {
        points: Vec<Point>,
        width: f64,
        color: &'static str,
    },
    ClearSurface,
}

/// Records every call; clones share one log.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    log: Arc<Mutex<Vec<ViewEvent>>>,
}

impl RecordingView {
    pub fn events(&self) -> Vec<ViewEvent> {
        self.log.lock().expect("view log poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.log.lock().expect("view log poisoned").len()
    }

    /// Events recorded after the first `skip`.
    pub fn events_since(&self, skip: usize) -> Vec<ViewEvent> {
        self.events().into_iter().skip(skip).collect()
    }

    pub fn last_status(&self) -> Option<String> {
        self.events().into_iter().rev().find_map(|event| match event {
            ViewEvent::Status(message) => Some(message),
            _ => None,
        })
    }

    fn record(&self, event: ViewEvent) {
        self.log.lock().expect("view log poisoned").push(event);
    }
}

impl OperatorView for RecordingView {
    fn show_whiteboard(&mut self) {
        self.record(ViewEvent::ShowWhiteboard);
    }

    fn hide_whiteboard(&mut self) {
        self.record(ViewEvent::HideWhiteboard);
    }

    fn show_login(&mut self) {
        self.record(ViewEvent::ShowLogin);
    }

    fn set_status(&mut self, message: &str) {
        self.record(ViewEvent::Status(message.to_string()));
    }

    fn clear_status(&mut self) {
        self.record(ViewEvent::ClearStatus);
    }

    fn draw(&mut self, points: &[Point], width: f64, color: &'static str) {
        self.record(ViewEvent::Draw {
            points: points.to_vec(),
            width,
            color,
        });
    }

    fn clear_surface(&mut self) {
        self.record(ViewEvent::ClearSurface);
    }
}

pub struct RecordingCalls {
    placed: UnboundedSender<Session>,
}

impl CallPlacement for RecordingCalls {
    async fn place_call(&self, session: Session) -> Result<(), EffectError> {
        let _ = self.placed.send(session);
        Ok(())
    }
}

pub struct RecordingAlerts {
    played: UnboundedSender<()>,
}

impl AudioAlert for RecordingAlerts {
    async fn play_alert(&self) -> Result<(), EffectError> {
        let _ = self.played.send(());
        Ok(())
    }
}

// ============================================================================
// Machine harness
// ============================================================================

pub type TestMachine = ProtocolStateMachine<RecordingView, RecordingCalls, RecordingAlerts>;

pub struct Harness {
    pub machine: TestMachine,
    pub events: UnboundedReceiver<ChannelEvent>,
    pub view: RecordingView,
    pub calls: UnboundedReceiver<Session>,
    pub alerts: UnboundedReceiver<()>,
}

impl Harness {
    pub fn new(endpoint: Url) -> Self {
        let (machine, events, view, calls, alerts) = build_machine(endpoint);
        Self {
            machine,
            events,
            view,
            calls,
            alerts,
        }
    }

    /// Deliver the next channel event to the machine and return a copy of it.
    pub async fn pump(&mut self) -> ChannelEvent {
        let event = next_event(&mut self.events).await;
        self.machine.handle_channel_event(event.clone()).await;
        event
    }

    /// Authenticate, accept the connection and deliver its `Opened`.
    pub async fn login(&mut self, server: &mut LoopbackServer) -> ServerSide {
        self.machine
            .handle_command(Command::Authenticate(test_session()))
            .await;
        let side = server.accept().await;
        self.pump().await;
        side
    }

    pub async fn call_placed(&mut self) -> Option<Session> {
        tokio::time::timeout(TEST_TIMEOUT, self.calls.recv())
            .await
            .ok()
            .flatten()
    }

    pub async fn alert_played(&mut self) -> bool {
        matches!(
            tokio::time::timeout(TEST_TIMEOUT, self.alerts.recv()).await,
            Ok(Some(()))
        )
    }

    pub async fn no_effects(&mut self) -> bool {
        let calls = tokio::time::timeout(QUIET_PERIOD, self.calls.recv()).await.is_err();
        let alerts = tokio::time::timeout(QUIET_PERIOD, self.alerts.recv()).await.is_err();
        calls && alerts
    }
}

/// A machine wired to recording doubles, plus the receivers a test needs.
pub fn build_machine(
    endpoint: Url,
) -> (
    TestMachine,
    UnboundedReceiver<ChannelEvent>,
    RecordingView,
    UnboundedReceiver<Session>,
    UnboundedReceiver<()>,
) {
    let (channel, events) = RealtimeChannel::new();
    let view = RecordingView::default();
    let (placed, calls) = mpsc::unbounded_channel();
    let (played, alerts) = mpsc::unbounded_channel();

    let machine = ProtocolStateMachine::new(
        channel,
        MachineSettings::new(endpoint),
        Arc::new((*DEFAULT_POLICY).clone()),
        view.clone(),
        SideEffects::new(RecordingCalls { placed }, RecordingAlerts { played }),
    );

    (machine, events, view, calls, alerts)
}
