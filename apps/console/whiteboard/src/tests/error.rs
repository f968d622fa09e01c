// Unit tests for error module
// Tests location tracking through the From conversions

use crate::error::WhiteboardError;

use whiteboard_core::error::CoreError;
use whiteboard_core::error::protocol::ProtocolError;

use common::ErrorLocation;

use std::error::Error;
use std::panic::Location;

/// **VALUE**: Core errors converted with `?` are kept whole as the source and
/// record the console call site.
///
/// **WHY THIS MATTERS**: The console prints these on exit; without the inner
/// message the operator sees "Core Error" and nothing else.
///
/// **BUG THIS CATCHES**: Would catch `#[track_caller]` being dropped from the
/// From impl, which would point every location into error.rs of this crate's
/// conversion code instead of the `?` site.
#[test]
fn given_protocol_error_when_converted_then_message_kept_and_location_is_caller() {
    // GIVEN
    let inner = ProtocolError::MachineStopped {
        message: "Machine task stopped".to_string(),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN
    let converted = WhiteboardError::from(inner);
    let expected_line = line!() - 1;

    // THEN
    match &converted {
        WhiteboardError::Core { source, location } => {
            assert!(matches!(source, CoreError::Protocol(ProtocolError::MachineStopped { .. })));
            assert!(converted.to_string().contains("Machine task stopped"));
            assert!(location.file.ends_with("error.rs"));
            assert_eq!(location.line, expected_line);
        }
        other => panic!("Expected Core, got {other:?}"),
    }
    assert!(converted.source().is_some(), "Core error should be the source");
}

#[test]
fn given_command_error_when_formatted_then_includes_variant_and_message() {
    let error = WhiteboardError::Command {
        message: "unknown command 'draw'".to_string(),
        location: ErrorLocation::from(Location::caller()),
    };

    let formatted = error.to_string();

    assert!(formatted.starts_with("Command Error: unknown command 'draw'"));
}
