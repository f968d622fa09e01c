use whiteboard::console_view::{ConsoleView, Screen};

use whiteboard_core::channel::{ChannelEventKind, RealtimeChannel};
use whiteboard_core::crossbar::CrossbarClient;
use whiteboard_core::effects::{QuickCall, SideEffects, SoundCommand};
use whiteboard_core::geometry::DEFAULT_POLICY;
use whiteboard_core::protocol::{Command, MachineSettings, ProtocolStateMachine, SessionState};
use whiteboard_core::session::Session;

use common::RedactedSecret;

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use url::Url;

// ============================================================================
// Integration tests for the console view driven by the real machine
// ============================================================================

async fn unreachable_endpoint() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind throwaway listener");
    let address = listener.local_addr().expect("Listener has no address");
    drop(listener);
    Url::parse(&format!("ws://{address}")).expect("URL should parse")
}

/// **VALUE**: With production view and side effects wired in, a connection that
/// cannot be opened returns the console to the login screen with the reason.
///
/// **WHY THIS MATTERS**: This is what an operator sees when the realtime
/// endpoint is down; it must not look like a live whiteboard.
///
/// **BUG THIS CATCHES**: Would catch the console view and the machine
/// disagreeing on which calls mean "logged out".
#[tokio::test]
async fn given_unreachable_endpoint_when_authenticated_then_console_returns_to_login() {
    // GIVEN: A machine with the console view and real effects
    let endpoint = unreachable_endpoint().await;
    let crossbar = CrossbarClient::new("http://127.0.0.1:9/v2/").expect("URL should parse");
    let (channel, mut events) = RealtimeChannel::new();
    let mut machine = ProtocolStateMachine::new(
        channel,
        MachineSettings::new(endpoint),
        Arc::new((*DEFAULT_POLICY).clone()),
        ConsoleView::new(false),
        SideEffects::new(QuickCall::new(crossbar, "1003"), SoundCommand::default()),
    );

    // WHEN: Authenticating
    let session = Session::new("acct-1", "user-7", RedactedSecret::new("token"));
    machine.handle_command(Command::Authenticate(session)).await;

    // THEN: The whiteboard with its four zone outlines is shown while connecting
    assert_eq!(machine.view().screen(), Screen::Whiteboard);
    assert_eq!(machine.view().strokes_on_surface(), 4);

    // WHEN: The connect failure arrives
    let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("Timed out waiting for channel event")
        .expect("Event queue closed");
    assert!(matches!(event.kind, ChannelEventKind::Closed(_)));
    machine.handle_channel_event(event).await;

    // THEN
    assert_eq!(machine.state(), SessionState::LoggedOut);
    assert_eq!(machine.view().screen(), Screen::Login);
    let status = machine.view().status().expect("status set");
    assert!(status.starts_with("WebSocket closed: connect failed"), "{status}");
}
