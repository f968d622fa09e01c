use crate::helpers::{
    Harness, LoopbackServer, PROMPT_TEARDOWN, TEST_ACCOUNT_ID, TEST_AUTH_TOKEN, TEST_TIMEOUT,
    ViewEvent, build_machine, stalled_endpoint, test_session,
};

use whiteboard_core::channel::{ChannelEvent, ChannelEventKind};
use whiteboard_core::geometry::Point;
use whiteboard_core::protocol::{self, ChannelState, Command, SessionState};
use whiteboard_core::render::{ACCEPTED_COLOR, REJECTED_COLOR};

use serde_json::{Value, json};
use tokio::time::Instant;

fn draw_event(points: Value) -> Value {
    json!({
        "status": "success",
        "data": {
            "event_category": "collabazoo",
            "event_name": "draw",
            "rgb": "#000000",
            "points": points,
            "point_size": 4
        }
    })
}

/// Colours of every draw call, overlay outlines included.
fn draw_colors(events: &[ViewEvent]) -> Vec<&'static str> {
    events
        .iter()
        .filter_map(|event| match event {
            ViewEvent::Draw { color, .. } => Some(*color),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Session lifecycle
// ============================================================================

/// **VALUE**: Verifies the subscribe frame sent on Opened carries the session's
/// token, account and the configured binding.
///
/// **WHY THIS MATTERS**: Without a correct subscribe the server never forwards
/// draw events and the whiteboard silently does nothing.
#[tokio::test]
async fn given_authenticated_session_when_channel_opens_then_subscribe_is_sent() {
    // GIVEN: A machine and a loopback endpoint
    let mut server = LoopbackServer::start().await;
    let mut harness = Harness::new(server.url.clone());

    // WHEN: Authenticating and delivering Opened
    let mut side = harness.login(&mut server).await;

    // THEN: The server receives exactly the subscribe command
    assert_eq!(
        side.recv_json().await,
        json!({
            "action": "subscribe",
            "auth_token": TEST_AUTH_TOKEN,
            "data": {"account_id": TEST_ACCOUNT_ID, "binding": "collabazoo.event"}
        })
    );
    assert_eq!(harness.machine.state(), SessionState::Connected);
    assert!(matches!(harness.machine.channel_state(), ChannelState::Connected(_)));

    // AND: The whiteboard is shown with the zone overlay
    let events = harness.view.events();
    assert!(events.contains(&ViewEvent::ShowWhiteboard));
    assert_eq!(draw_colors(&events).len(), 4, "Two targets and two obstacles outlined");
}

/// **VALUE**: An error-status frame ends the session without drawing anything.
///
/// **WHY THIS MATTERS**: The server reports a bad token this way. Staying on the
/// whiteboard would show a live-looking surface that never receives strokes.
///
/// **BUG THIS CATCHES**: Would catch the error frame being treated as a
/// malformed event and swallowed.
#[tokio::test]
async fn given_connected_when_error_status_received_then_logged_out_with_login_shown() {
    // GIVEN: A connected session
    let mut server = LoopbackServer::start().await;
    let mut harness = Harness::new(server.url.clone());
    let mut side = harness.login(&mut server).await;
    side.recv_json().await;
    let before = harness.view.len();

    // WHEN: The server answers with an error status
    side.push(&json!({"status": "error", "data": {"message": "invalid auth token"}}));
    harness.pump().await;

    // THEN: The machine is logged out and the login view is back
    assert_eq!(harness.machine.state(), SessionState::LoggedOut);
    assert_eq!(harness.machine.channel_state(), ChannelState::Disconnected);
    assert!(harness.machine.session().is_none());

    let events = harness.view.events_since(before);
    assert!(events.contains(&ViewEvent::HideWhiteboard));
    assert!(events.contains(&ViewEvent::ShowLogin));
    assert!(draw_colors(&events).is_empty(), "Nothing drawn for an error frame");
    assert_eq!(
        harness.view.last_status().as_deref(),
        Some(r#"Server error: {"message":"invalid auth token"}"#)
    );
    assert!(harness.no_effects().await);
}

/// **VALUE**: A clear requested while logged out sends nothing and opens nothing.
#[tokio::test]
async fn given_logged_out_when_clear_requested_then_no_frame_and_no_connection() {
    // GIVEN
    let mut server = LoopbackServer::start().await;
    let mut harness = Harness::new(server.url.clone());

    // WHEN
    harness.machine.handle_command(Command::ClearSurface).await;

    // THEN
    assert_eq!(harness.machine.state(), SessionState::LoggedOut);
    assert!(server.no_connection().await);
    assert!(harness.view.events().is_empty());
}

#[tokio::test]
async fn given_connected_when_clear_requested_then_clear_command_is_sent() {
    // GIVEN
    let mut server = LoopbackServer::start().await;
    let mut harness = Harness::new(server.url.clone());
    let mut side = harness.login(&mut server).await;
    side.recv_json().await;

    // WHEN
    harness.machine.handle_command(Command::ClearSurface).await;

    // THEN
    assert_eq!(
        side.recv_json().await,
        json!({"action": "collabazoo", "data": {"account_id": TEST_ACCOUNT_ID, "command": "clear"}})
    );
}

/// **VALUE**: A clear event from the server wipes the surface and redraws the
/// zone overlay.
///
/// **BUG THIS CATCHES**: Would catch the overlay disappearing after the first
/// clear, leaving drawers without their targets.
#[tokio::test]
async fn given_connected_when_clear_event_received_then_surface_cleared_and_overlay_redrawn() {
    // GIVEN
    let mut server = LoopbackServer::start().await;
    let mut harness = Harness::new(server.url.clone());
    let side = harness.login(&mut server).await;
    let before = harness.view.len();

    // WHEN
    side.push(&json!({"data": {"event_category": "collabazoo", "event_name": "clear"}}));
    harness.pump().await;

    // THEN
    let events = harness.view.events_since(before);
    assert_eq!(events.first(), Some(&ViewEvent::ClearSurface));
    assert_eq!(draw_colors(&events).len(), 4);
    assert_eq!(harness.machine.state(), SessionState::Connected);
}

#[tokio::test]
async fn given_connected_when_server_closes_then_logged_out_with_close_reason() {
    // GIVEN
    let mut server = LoopbackServer::start().await;
    let mut harness = Harness::new(server.url.clone());
    let side = harness.login(&mut server).await;

    // WHEN
    side.close(4001, "session replaced");
    let event = harness.pump().await;

    // THEN
    assert!(matches!(event.kind, ChannelEventKind::Closed(_)));
    assert_eq!(harness.machine.state(), SessionState::LoggedOut);
    assert_eq!(
        harness.view.last_status().as_deref(),
        Some("WebSocket closed: 4001 (session replaced)")
    );
}

#[tokio::test]
async fn given_connected_when_operator_logs_out_then_channel_closed_and_login_shown() {
    // GIVEN
    let mut server = LoopbackServer::start().await;
    let mut harness = Harness::new(server.url.clone());
    let mut side = harness.login(&mut server).await;
    side.recv_json().await;

    // WHEN
    harness.machine.handle_command(Command::Logout).await;

    // THEN
    assert_eq!(harness.machine.state(), SessionState::LoggedOut);
    assert!(harness.view.events().contains(&ViewEvent::ShowLogin));
    assert_eq!(harness.view.last_status().as_deref(), Some("Signed out"));
    assert!(side.silent().await, "Nothing but the close handshake after logout");
}

/// **VALUE**: A transport error on the live connection ends the session, and
/// the Closed that follows it is not acted on a second time.
///
/// **WHY THIS MATTERS**: A broken socket usually reports both an error and a
/// close. The operator should land on the login view once, with the error as
/// the reason, not have it overwritten by the close.
#[tokio::test]
async fn given_connected_when_transport_error_then_logged_out_and_trailing_closed_discarded() {
    // GIVEN
    let mut server = LoopbackServer::start().await;
    let mut harness = Harness::new(server.url.clone());
    let _side = harness.login(&mut server).await;
    let ChannelState::Connected(connection) = harness.machine.channel_state() else {
        panic!("Expected an open channel after login");
    };
    let before = harness.view.len();

    // WHEN
    harness
        .machine
        .handle_channel_event(ChannelEvent {
            connection,
            kind: ChannelEventKind::TransportError("connection reset".to_string()),
        })
        .await;

    // THEN
    assert_eq!(harness.machine.state(), SessionState::LoggedOut);
    assert!(harness.machine.session().is_none());
    assert!(harness.view.events_since(before).contains(&ViewEvent::ShowLogin));
    assert_eq!(
        harness.view.last_status().as_deref(),
        Some("WebSocket error: connection reset")
    );

    // AND: The trailing Closed from the same connection changes nothing
    let after_error = harness.view.len();
    harness
        .machine
        .handle_channel_event(ChannelEvent {
            connection,
            kind: ChannelEventKind::Closed("1006 (connection reset)".to_string()),
        })
        .await;
    assert_eq!(harness.view.len(), after_error);
    assert_eq!(harness.machine.state(), SessionState::LoggedOut);
}

/// **VALUE**: Logging out while the handshake is still pending returns to the
/// login view straight away.
///
/// **WHY THIS MATTERS**: The machine handles commands and channel events on one
/// task. A logout that waits on an unresponsive server holds up every later
/// command, and the handle keeps reporting Connected meanwhile.
///
/// **BUG THIS CATCHES**: Would catch teardown of a not-yet-open connection
/// waiting for a close handshake that can never happen.
#[tokio::test]
async fn given_pending_handshake_when_operator_logs_out_then_logged_out_promptly() {
    // GIVEN: A session whose channel never opens
    let endpoint = stalled_endpoint().await;
    let mut harness = Harness::new(endpoint);
    harness
        .machine
        .handle_command(Command::Authenticate(test_session()))
        .await;
    assert!(matches!(harness.machine.channel_state(), ChannelState::Connecting(_)));
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    // WHEN
    let started = Instant::now();
    harness.machine.handle_command(Command::Logout).await;
    let elapsed = started.elapsed();

    // THEN
    assert!(elapsed < PROMPT_TEARDOWN, "Logout took {elapsed:?}");
    assert_eq!(harness.machine.state(), SessionState::LoggedOut);
    assert_eq!(harness.view.last_status().as_deref(), Some("Signed out"));

    // AND: The abandoned connection's Closed is discarded
    let stale = harness.pump().await;
    assert!(matches!(stale.kind, ChannelEventKind::Closed(_)));
    assert_eq!(harness.view.last_status().as_deref(), Some("Signed out"));
}

/// **VALUE**: Signing in again while the first handshake hangs starts the new
/// connection without waiting on the old one.
#[tokio::test]
async fn given_pending_handshake_when_reauthenticating_then_new_connection_starts_promptly() {
    // GIVEN
    let endpoint = stalled_endpoint().await;
    let mut harness = Harness::new(endpoint);
    harness
        .machine
        .handle_command(Command::Authenticate(test_session()))
        .await;
    let ChannelState::Connecting(first) = harness.machine.channel_state() else {
        panic!("Expected a pending connection");
    };

    // WHEN
    let started = Instant::now();
    harness
        .machine
        .handle_command(Command::Authenticate(test_session()))
        .await;
    let elapsed = started.elapsed();

    // THEN
    assert!(elapsed < PROMPT_TEARDOWN, "Re-authentication took {elapsed:?}");
    let ChannelState::Connecting(second) = harness.machine.channel_state() else {
        panic!("Expected the new connection to be pending");
    };
    assert_ne!(first, second);

    // AND: The first connection's Closed leaves the new session alone
    let stale = harness.pump().await;
    assert_eq!(stale.connection, first);
    assert_eq!(harness.machine.state(), SessionState::Connected);
    assert_eq!(harness.machine.channel_state(), ChannelState::Connecting(second));
}

// ============================================================================
// Draw events
// ============================================================================

/// **VALUE**: A stroke joining both targets is drawn in the accepted colour and
/// places a call with the active session.
///
/// **WHY THIS MATTERS**: This is the one path that makes a phone ring.
#[tokio::test]
async fn given_valid_stroke_when_draw_received_then_drawn_accepted_and_call_placed() {
    // GIVEN
    let mut server = LoopbackServer::start().await;
    let mut harness = Harness::new(server.url.clone());
    let side = harness.login(&mut server).await;
    let before = harness.view.len();

    // WHEN
    side.push(&draw_event(json!([[150, 100], [200, 100], [1400, 800]])));
    harness.pump().await;

    // THEN
    assert_eq!(
        harness.view.events_since(before),
        vec![ViewEvent::Draw {
            points: vec![
                Point::new(150.0, 100.0),
                Point::new(200.0, 100.0),
                Point::new(1400.0, 800.0)
            ],
            width: 4.0,
            color: ACCEPTED_COLOR,
        }]
    );

    let session = harness.call_placed().await.expect("A call should be placed");
    assert_eq!(session, test_session());
}

/// **VALUE**: A stroke crossing an obstacle is drawn in the rejected colour and
/// plays the alert instead of calling.
///
/// **BUG THIS CATCHES**: Would catch rejected strokes being hidden, or both
/// effects firing.
#[tokio::test]
async fn given_stroke_through_obstacle_when_draw_received_then_drawn_rejected_and_alert_played() {
    // GIVEN
    let mut server = LoopbackServer::start().await;
    let mut harness = Harness::new(server.url.clone());
    let side = harness.login(&mut server).await;
    let before = harness.view.len();

    // WHEN
    side.push(&draw_event(json!([[150, 100], [700, 500], [1400, 800]])));
    harness.pump().await;

    // THEN
    assert_eq!(draw_colors(&harness.view.events_since(before)), vec![REJECTED_COLOR]);
    assert!(harness.alert_played().await);
    assert!(
        tokio::time::timeout(std::time::Duration::from_millis(200), harness.calls.recv())
            .await
            .is_err(),
        "No call for a rejected stroke"
    );
}

/// **VALUE**: Malformed frames are dropped and the session carries on.
///
/// **WHY THIS MATTERS**: One bad drawer client must not log the operator out.
#[tokio::test]
async fn given_connected_when_malformed_message_received_then_state_unchanged() {
    // GIVEN
    let mut server = LoopbackServer::start().await;
    let mut harness = Harness::new(server.url.clone());
    let side = harness.login(&mut server).await;
    let before = harness.view.len();

    // WHEN: Invalid JSON, then a draw with no points
    side.push_raw("{not json");
    harness.pump().await;
    side.push(&json!({"data": {"event_category": "collabazoo", "event_name": "draw"}}));
    harness.pump().await;

    // THEN
    assert_eq!(harness.machine.state(), SessionState::Connected);
    assert_eq!(harness.view.len(), before);

    // AND: The next valid draw is still handled
    side.push(&draw_event(json!([[150, 100], [1400, 800]])));
    harness.pump().await;
    assert_eq!(draw_colors(&harness.view.events_since(before)), vec![ACCEPTED_COLOR]);
}

#[tokio::test]
async fn given_connected_when_unrelated_event_received_then_ignored() {
    // GIVEN
    let mut server = LoopbackServer::start().await;
    let mut harness = Harness::new(server.url.clone());
    let side = harness.login(&mut server).await;
    let before = harness.view.len();

    // WHEN
    side.push(&json!({"data": {"event_category": "call", "event_name": "CHANNEL_ANSWER"}}));
    harness.pump().await;

    // THEN
    assert_eq!(harness.view.len(), before);
    assert_eq!(harness.machine.state(), SessionState::Connected);
    assert!(harness.no_effects().await);
}

// ============================================================================
// Stale connections
// ============================================================================

/// **VALUE**: Events from a connection the machine already dropped are ignored,
/// including its Closed arriving after a new session started.
///
/// **WHY THIS MATTERS**: Logout then quick re-login is routine. If the first
/// connection's late Closed were honoured it would log the new session out.
///
/// **BUG THIS CATCHES**: Would catch the machine acting on any event while
/// Connected instead of checking which connection it came from.
#[tokio::test]
async fn given_relogin_when_old_connection_events_arrive_then_they_are_ignored() {
    // GIVEN: A first session that receives one draw, captured for replay
    let mut server = LoopbackServer::start().await;
    let mut harness = Harness::new(server.url.clone());
    let first_side = harness.login(&mut server).await;
    first_side.push(&draw_event(json!([[150, 100], [1400, 800]])));
    let stale_draw = harness.pump().await;
    assert!(harness.call_placed().await.is_some());

    // WHEN: The operator logs out and straight back in
    harness.machine.handle_command(Command::Logout).await;
    harness
        .machine
        .handle_command(Command::Authenticate(test_session()))
        .await;
    let _second_side = server.accept().await;

    // THEN: The first connection's Closed is discarded
    let stale_closed = harness.pump().await;
    assert_ne!(stale_closed.connection, stale_draw.connection);
    assert!(matches!(stale_closed.kind, ChannelEventKind::Closed(_)));
    assert_eq!(harness.machine.state(), SessionState::Connected);

    let opened = harness.pump().await;
    assert_eq!(opened.kind, ChannelEventKind::Opened);
    assert_eq!(harness.machine.channel_state(), ChannelState::Connected(opened.connection));

    // AND: Replaying the first connection's draw does nothing
    let before = harness.view.len();
    harness.machine.handle_channel_event(stale_draw).await;
    assert_eq!(harness.view.len(), before);
    assert!(harness.no_effects().await);
}

// ============================================================================
// Actor
// ============================================================================

/// **VALUE**: The spawned machine publishes state changes through its handle.
///
/// **WHY THIS MATTERS**: The console front end decides whether to forget the
/// stored session by watching this state.
#[tokio::test]
async fn given_spawned_machine_when_session_ends_then_handle_observes_logged_out() {
    // GIVEN
    let mut server = LoopbackServer::start().await;
    let (machine, events, _view, _calls, _alerts) = build_machine(server.url.clone());
    let (handle, task) = protocol::spawn(machine, events);
    let mut state = handle.watch_state();
    assert_eq!(handle.state(), SessionState::LoggedOut);

    // WHEN: Authenticating
    handle.authenticate(test_session()).expect("machine running");
    let mut side = server.accept().await;
    side.recv_json().await;

    // THEN
    tokio::time::timeout(TEST_TIMEOUT, state.wait_for(|s| *s == SessionState::Connected))
        .await
        .expect("Timed out waiting for Connected")
        .expect("State sender dropped");

    // WHEN: The server closes the connection
    side.close(1000, "bye");

    // THEN
    tokio::time::timeout(TEST_TIMEOUT, state.wait_for(|s| *s == SessionState::LoggedOut))
        .await
        .expect("Timed out waiting for LoggedOut")
        .expect("State sender dropped");

    // AND: Dropping the handle stops the machine
    drop(handle);
    tokio::time::timeout(TEST_TIMEOUT, task)
        .await
        .expect("Machine task did not stop")
        .expect("Machine task panicked");
}

#[tokio::test]
async fn given_stopped_machine_when_sending_command_then_returns_machine_stopped() {
    // GIVEN
    let server = LoopbackServer::start().await;
    let (machine, events, _view, _calls, _alerts) = build_machine(server.url.clone());
    let (handle, task) = protocol::spawn(machine, events);
    task.abort();
    let _ = task.await;

    // WHEN
    let result = handle.clear();

    // THEN
    assert!(result.is_err(), "Commands to a stopped machine must fail");
}
