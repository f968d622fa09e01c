// Unit tests for command framing and close descriptions

use crate::channel::realtime::{describe_close, encode_command};
use crate::error::channel::ChannelError;

use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

fn decode(frame: &str) -> Value {
    serde_json::from_str(frame).expect("frame should be JSON")
}

/// **VALUE**: Verifies the action is merged into the payload's top level.
///
/// **WHY THIS MATTERS**: The server routes on the top-level `action` field; a
/// nested or missing action means the subscribe is silently ignored.
#[test]
fn given_object_payload_when_encoded_then_action_is_top_level_field() {
    let frame = encode_command("subscribe", &json!({"auth_token": "t", "data": {"binding": "b"}}))
        .expect("object payload should encode");

    assert_eq!(
        decode(&frame),
        json!({"action": "subscribe", "auth_token": "t", "data": {"binding": "b"}})
    );
}

#[test]
fn given_payload_with_action_field_when_encoded_then_argument_wins() {
    let frame = encode_command("collabazoo", &json!({"action": "other"})).expect("should encode");

    assert_eq!(decode(&frame)["action"], "collabazoo");
}

#[test]
fn given_unit_payload_when_encoded_then_only_action_is_sent() {
    let frame = encode_command("ping", &()).expect("unit payload should encode");

    assert_eq!(decode(&frame), json!({"action": "ping"}));
}

#[test]
fn given_array_payload_when_encoded_then_returns_encode_error() {
    let result = encode_command("subscribe", &json!([1, 2]));

    assert!(matches!(result, Err(ChannelError::Encode { .. })));
}

#[test]
fn given_close_frame_with_reason_when_described_then_code_and_reason_shown() {
    let frame = CloseFrame {
        code: CloseCode::Policy,
        reason: "token expired".into(),
    };

    assert_eq!(describe_close(Some(&frame)), "1008 (token expired)");
}

#[test]
fn given_close_frame_without_reason_when_described_then_only_code_shown() {
    let frame = CloseFrame {
        code: CloseCode::Normal,
        reason: "".into(),
    };

    assert_eq!(describe_close(Some(&frame)), "1000");
}

#[test]
fn given_no_close_frame_when_described_then_no_status_code_shown() {
    assert_eq!(describe_close(None), "1005");
}
