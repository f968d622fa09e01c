use whiteboard_core::error::CoreError;
use whiteboard_core::error::crossbar::CrossbarError;
use whiteboard_core::error::geometry::GeometryError;
use whiteboard_core::error::protocol::ProtocolError;
use whiteboard_core::geometry::Zone;
use whiteboard_core::protocol::wire::parse_inbound;

use common::{ErrorLocation, HttpStatusCode};

use std::error::Error;
use std::panic::Location;

/// **VALUE**: Verifies errors raised through `#[track_caller]` constructors point
/// at the calling code, not at the library internals.
///
/// **WHY THIS MATTERS**: A bad policy zone is reported at startup; the location
/// should say which load call tripped it.
///
/// **BUG THIS CATCHES**: Would catch `#[track_caller]` being dropped from
/// `Zone::new`, which would make every location point into geometry/mod.rs.
#[test]
fn given_inverted_zone_when_formatted_then_location_is_the_caller() {
    // GIVEN
    let error = Zone::new(5.0, 1.0, 0.0, 1.0).expect_err("bounds are inverted");

    // WHEN
    let formatted = error.to_string();

    // THEN
    assert!(formatted.contains("Invalid Zone Error"));
    assert!(formatted.contains("inverted bounds"));
    assert!(formatted.contains("error.rs"), "Location should be this file: {formatted}");
}

#[test]
#[track_caller]
fn given_rejected_error_when_formatted_then_includes_status_message_and_location() {
    // GIVEN
    let error = CrossbarError::Rejected {
        status: HttpStatusCode(401),
        message: "invalid credentials".to_string(),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN
    let formatted = format!("{error}");

    // THEN
    assert!(formatted.contains("Rejected (401)"));
    assert!(formatted.contains("invalid credentials"));
    assert!(formatted.contains("error.rs"));
}

#[test]
fn given_invalid_json_when_parsed_then_error_converts_to_core_error() {
    // GIVEN
    let error = parse_inbound("[").expect_err("not an event frame");
    assert!(matches!(error, ProtocolError::Parse { .. }));

    // WHEN
    let core: CoreError = error.into();

    // THEN: Transparent wrapper keeps the inner message
    assert!(core.to_string().starts_with("Payload Parse Error"));
}

#[test]
fn given_empty_stroke_error_when_wrapped_then_source_chain_is_transparent() {
    // GIVEN
    let error = GeometryError::EmptyStroke {
        message: "stroke has no points".to_string(),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN
    let core = CoreError::from(error);

    // THEN
    assert!(core.to_string().contains("stroke has no points"));
    assert!(core.source().is_none());
}
