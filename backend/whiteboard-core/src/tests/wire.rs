// Unit tests for inbound frame parsing

use crate::error::protocol::ProtocolError;
use crate::geometry::Point;
use crate::protocol::wire::{Inbound, parse_inbound};

use serde_json::json;

/// **VALUE**: Verifies a draw event from the collaboration category is parsed
/// with both the snake_case and the camelCase field names drawers emit.
///
/// **WHY THIS MATTERS**: Drawing clients disagree on `point_size` vs `pointSize`;
/// rejecting either would silently drop strokes.
#[test]
fn given_draw_event_when_parsed_then_returns_points_and_width() {
    for size_field in ["point_size", "pointSize"] {
        // GIVEN
        let raw = json!({
            "status": "success",
            "data": {
                "event_category": "collabazoo",
                "event_name": "draw",
                "rgb": "#ff0000",
                "points": [[150, 100], [1400, 800]],
                size_field: 6
            }
        })
        .to_string();

        // WHEN
        let inbound = parse_inbound(&raw).expect("draw should parse");

        // THEN
        let Inbound::Draw(draw) = inbound else {
            panic!("Expected Draw, got {inbound:?}");
        };
        let stroke = draw.into_stroke();
        assert_eq!(stroke.points, vec![Point::new(150.0, 100.0), Point::new(1400.0, 800.0)]);
        assert_eq!(stroke.width, 6.0);
    }
}

#[test]
fn given_clear_event_when_parsed_then_returns_clear() {
    let raw = r#"{"data":{"event_category":"collabazoo","event_name":"clear"}}"#;

    assert!(matches!(parse_inbound(raw), Ok(Inbound::Clear)));
}

/// **VALUE**: A frame with `status: "error"` is reported as such regardless of
/// what its data looks like.
///
/// **BUG THIS CATCHES**: Would catch the envelope check running first and
/// turning an auth failure into a swallowed "missing event_category" error,
/// which would leave the operator on a dead whiteboard.
#[test]
fn given_error_status_when_parsed_then_returns_error_status_with_data() {
    let raw = r#"{"status":"error","data":{"message":"invalid auth token"}}"#;

    let inbound = parse_inbound(raw).expect("error frame should parse");

    match inbound {
        Inbound::ErrorStatus(data) => assert_eq!(data, json!({"message": "invalid auth token"})),
        other => panic!("Expected ErrorStatus, got {other:?}"),
    }
}

#[test]
fn given_other_category_when_parsed_then_returns_ignored() {
    let raw = r#"{"data":{"event_category":"call","event_name":"CHANNEL_CREATE"}}"#;

    match parse_inbound(raw) {
        Ok(Inbound::Ignored { category, name }) => {
            assert_eq!(category, "call");
            assert_eq!(name, "CHANNEL_CREATE");
        }
        other => panic!("Expected Ignored, got {other:?}"),
    }
}

#[test]
fn given_unknown_collab_event_when_parsed_then_returns_ignored() {
    let raw = r#"{"data":{"event_category":"collabazoo","event_name":"wave"}}"#;

    assert!(matches!(parse_inbound(raw), Ok(Inbound::Ignored { .. })));
}

#[test]
fn given_invalid_json_when_parsed_then_returns_parse_error() {
    let result = parse_inbound("{not json");

    assert!(matches!(result, Err(ProtocolError::Parse { .. })));
}

#[test]
fn given_missing_event_name_when_parsed_then_returns_shape_error() {
    let raw = r#"{"data":{"event_category":"collabazoo"}}"#;

    assert!(matches!(parse_inbound(raw), Err(ProtocolError::Shape { .. })));
}

#[test]
fn given_draw_without_points_when_parsed_then_returns_shape_error() {
    let raw = r#"{"data":{"event_category":"collabazoo","event_name":"draw","point_size":4}}"#;

    assert!(matches!(parse_inbound(raw), Err(ProtocolError::Shape { .. })));
}
