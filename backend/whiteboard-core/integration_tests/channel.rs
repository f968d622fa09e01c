use crate::helpers::{
    LoopbackServer, PROMPT_TEARDOWN, QUIET_PERIOD, next_event, no_event, stalled_endpoint,
    unused_endpoint,
};

use whiteboard_core::channel::{ChannelEventKind, RealtimeChannel, SendOutcome};

use serde_json::json;
use tokio::time::Instant;

// ============================================================================
// RealtimeChannel event contract
// Opened precedes every Message, exactly one Closed ends a connection
// ============================================================================

/// **VALUE**: Verifies the basic lifecycle: Opened, messages in order, then a
/// single Closed carrying the server's code and reason.
///
/// **WHY THIS MATTERS**: The protocol machine subscribes on Opened and resets on
/// Closed. Missing or duplicated lifecycle events leave it waiting forever or
/// resetting a session that was just replaced.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Messages are delivered before Opened
/// - A server close produces no Closed, or two of them
/// - The close reason loses its code or text
#[tokio::test]
async fn given_open_connection_when_server_closes_then_emits_closed_once_with_reason() {
    // GIVEN: A channel connected to the loopback server
    let mut server = LoopbackServer::start().await;
    let (mut channel, mut events) = RealtimeChannel::new();
    let id = channel.connect(&server.url);
    let side = server.accept().await;

    let opened = next_event(&mut events).await;
    assert_eq!(opened.connection, id);
    assert_eq!(opened.kind, ChannelEventKind::Opened);
    assert!(channel.is_open());

    // WHEN: The server sends two messages and closes
    side.push_raw("first");
    side.push_raw("second");
    side.close(1008, "token expired");

    // THEN: Messages arrive in order, then one Closed, then nothing
    assert_eq!(next_event(&mut events).await.kind, ChannelEventKind::Message("first".into()));
    assert_eq!(next_event(&mut events).await.kind, ChannelEventKind::Message("second".into()));

    let closed = next_event(&mut events).await;
    assert_eq!(closed.connection, id);
    assert_eq!(closed.kind, ChannelEventKind::Closed("1008 (token expired)".into()));

    assert!(no_event(&mut events).await, "No events after Closed");
    assert!(!channel.is_open());
}

/// **VALUE**: A connection that never opens reports Closed only.
///
/// **BUG THIS CATCHES**: Would catch a failed connect being reported as Opened,
/// or as a TransportError with no Closed, which would leave the machine stuck
/// in Connecting.
#[tokio::test]
async fn given_unreachable_endpoint_when_connecting_then_only_closed_is_emitted() {
    // GIVEN: Nothing listening
    let endpoint = unused_endpoint().await;
    let (mut channel, mut events) = RealtimeChannel::new();

    // WHEN: Connecting
    let id = channel.connect(&endpoint);

    // THEN: Closed is the first and only event
    let event = next_event(&mut events).await;
    assert_eq!(event.connection, id);
    match event.kind {
        ChannelEventKind::Closed(reason) => {
            assert!(reason.starts_with("connect failed"), "Unexpected reason: {reason}")
        }
        other => panic!("Expected Closed, got {other:?}"),
    }
    assert!(no_event(&mut events).await);
}

/// **VALUE**: Sending before the handshake completes drops the command.
///
/// **WHY THIS MATTERS**: Commands are best-effort. Queuing them would replay a
/// stale clear on a connection opened much later.
#[tokio::test]
async fn given_channel_not_open_when_sending_then_command_is_dropped() {
    // GIVEN: A channel that has never connected
    let (channel, _events) = RealtimeChannel::new();

    // WHEN
    let outcome = channel
        .send("collabazoo", &json!({"data": {"command": "clear"}}))
        .expect("payload should encode");

    // THEN
    assert_eq!(outcome, SendOutcome::Dropped);
}

#[tokio::test]
async fn given_open_channel_when_sending_then_server_receives_frame() {
    // GIVEN
    let mut server = LoopbackServer::start().await;
    let (mut channel, mut events) = RealtimeChannel::new();
    channel.connect(&server.url);
    let mut side = server.accept().await;
    assert_eq!(next_event(&mut events).await.kind, ChannelEventKind::Opened);

    // WHEN
    let outcome = channel
        .send("collabazoo", &json!({"data": {"command": "clear"}}))
        .expect("payload should encode");

    // THEN
    assert_eq!(outcome, SendOutcome::Sent);
    assert_eq!(
        side.recv_json().await,
        json!({"action": "collabazoo", "data": {"command": "clear"}})
    );
}

/// **VALUE**: After `close()` returns, the closed connection has emitted its one
/// Closed and nothing else follows.
///
/// **BUG THIS CATCHES**: Would catch a late Closed from the torn-down task
/// arriving after the machine already started a new session.
#[tokio::test]
async fn given_open_channel_when_closed_by_client_then_single_closed_and_silence() {
    // GIVEN
    let mut server = LoopbackServer::start().await;
    let (mut channel, mut events) = RealtimeChannel::new();
    let id = channel.connect(&server.url);
    let _side = server.accept().await;
    assert_eq!(next_event(&mut events).await.kind, ChannelEventKind::Opened);

    // WHEN
    channel.close().await;

    // THEN
    let closed = next_event(&mut events).await;
    assert_eq!(closed.connection, id);
    assert!(matches!(closed.kind, ChannelEventKind::Closed(_)));
    assert!(no_event(&mut events).await);
    assert_eq!(channel.current_connection(), None);
}

/// **VALUE**: A second connect supersedes the first, and the two connections'
/// events carry different ids.
///
/// **WHY THIS MATTERS**: Ids are how the machine tells stale events from live
/// ones. Reused ids would let an old connection's Closed end the new session.
#[tokio::test]
async fn given_live_connection_when_connecting_again_then_events_carry_distinct_ids() {
    // GIVEN
    let mut server = LoopbackServer::start().await;
    let (mut channel, mut events) = RealtimeChannel::new();
    let first = channel.connect(&server.url);
    let _first_side = server.accept().await;
    assert_eq!(next_event(&mut events).await.connection, first);

    // WHEN
    let second = channel.connect(&server.url);
    let _second_side = server.accept().await;

    // THEN: First closes, second opens, in either order
    assert_ne!(first, second);
    assert_eq!(channel.current_connection(), Some(second));

    let mut first_closed = false;
    let mut second_opened = false;
    for _ in 0..2 {
        let event = next_event(&mut events).await;
        match (&event.kind, event.connection) {
            (ChannelEventKind::Closed(_), id) if id == first => first_closed = true,
            (ChannelEventKind::Opened, id) if id == second => second_opened = true,
            other => panic!("Unexpected event {other:?}"),
        }
    }
    assert!(first_closed && second_opened);
}

/// **VALUE**: Closing a connection whose handshake is still pending returns at
/// once and queues its one Closed.
///
/// **WHY THIS MATTERS**: The protocol machine closes the channel inline on
/// logout and re-login. A server that accepts TCP but never answers the
/// upgrade must not stall every command behind the teardown.
///
/// **BUG THIS CATCHES**: Would catch `close()` asking the connection task to
/// close and then waiting out the teardown timeout, when that task is stuck
/// in the handshake and never reads the request.
#[tokio::test]
async fn given_pending_handshake_when_closed_by_client_then_returns_promptly_with_closed() {
    // GIVEN: A connection stuck in its handshake
    let endpoint = stalled_endpoint().await;
    let (mut channel, mut events) = RealtimeChannel::new();
    let id = channel.connect(&endpoint);
    assert!(no_event(&mut events).await, "Handshake should still be pending");
    assert!(!channel.is_open());

    // WHEN
    let started = Instant::now();
    channel.close().await;
    let elapsed = started.elapsed();

    // THEN
    assert!(elapsed < PROMPT_TEARDOWN, "close() took {elapsed:?}");
    assert_eq!(channel.current_connection(), None);

    let closed = next_event(&mut events).await;
    assert_eq!(closed.connection, id);
    assert!(matches!(closed.kind, ChannelEventKind::Closed(_)));
    assert!(no_event(&mut events).await, "No events after Closed");
}

/// **VALUE**: Superseding a connection that never opened ends it promptly with
/// a single Closed under its old id.
#[tokio::test]
async fn given_pending_handshake_when_connecting_again_then_old_connection_closed_promptly() {
    // GIVEN
    let endpoint = stalled_endpoint().await;
    let (mut channel, mut events) = RealtimeChannel::new();
    let first = channel.connect(&endpoint);

    // WHEN
    let second = channel.connect(&endpoint);

    // THEN: Only the first connection reports, and well before any timeout
    let closed = tokio::time::timeout(PROMPT_TEARDOWN, events.recv())
        .await
        .expect("Superseded connection was not closed promptly")
        .expect("Channel event queue closed");
    assert_eq!(closed.connection, first);
    assert!(matches!(closed.kind, ChannelEventKind::Closed(_)));

    assert_eq!(channel.current_connection(), Some(second));
    tokio::time::sleep(QUIET_PERIOD).await;
    assert!(events.try_recv().is_err(), "Second connection is still pending");
}
