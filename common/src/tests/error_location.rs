// Unit tests for ErrorLocation

use crate::ErrorLocation;

use std::panic::Location;

#[track_caller]
fn capture() -> ErrorLocation {
    ErrorLocation::from(Location::caller())
}

/// **VALUE**: Verifies the location is taken from the `#[track_caller]` caller.
///
/// **WHY THIS MATTERS**: Every error in the workspace relies on this to point at
/// the `?` site instead of the helper that built the error.
#[test]
fn given_track_caller_helper_when_captured_then_points_at_call_site() {
    // GIVEN / WHEN
    let expected_line = line!() + 1;
    let location = capture();

    // THEN
    assert!(location.file.ends_with("error_location.rs"));
    assert_eq!(location.line, expected_line);
}

#[test]
fn given_location_when_displayed_then_bracketed_file_line_column() {
    let location = ErrorLocation {
        file: "src/channel/realtime.rs",
        line: 42,
        column: 7,
    };

    assert_eq!(location.to_string(), "[src/channel/realtime.rs:42:7]");
}
