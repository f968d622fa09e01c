// Unit tests for the console rendering of the operator view

use crate::console_view::{ConsoleView, Screen, describe_polyline};

use whiteboard_core::geometry::Point;
use whiteboard_core::render::OperatorView;

#[test]
fn given_new_view_when_created_then_login_screen_without_status() {
    let view = ConsoleView::new(false);

    assert_eq!(view.screen(), Screen::Login);
    assert_eq!(view.status(), None);
}

/// **VALUE**: The view tracks screen, status and surface contents the way the
/// machine drives them.
#[test]
fn given_view_when_session_cycle_applied_then_state_follows() {
    // GIVEN
    let mut view = ConsoleView::new(false);

    // WHEN: A session opens and draws two outlines
    view.clear_status();
    view.show_whiteboard();
    view.draw(&[Point::new(0.0, 0.0), Point::new(1.0, 1.0)], 4.0, "green");
    view.draw(&[Point::new(2.0, 2.0)], 4.0, "pink");

    // THEN
    assert_eq!(view.screen(), Screen::Whiteboard);
    assert_eq!(view.strokes_on_surface(), 2);

    // WHEN: The surface is cleared and the session ends
    view.clear_surface();
    view.hide_whiteboard();
    view.show_login();
    view.set_status("WebSocket closed: 1000");

    // THEN
    assert_eq!(view.strokes_on_surface(), 0);
    assert_eq!(view.screen(), Screen::Login);
    assert_eq!(view.status(), Some("WebSocket closed: 1000"));
}

#[test]
fn given_points_when_described_then_bounding_box_shown() {
    let points = [
        Point::new(150.0, 100.0),
        Point::new(1400.0, 800.0),
        Point::new(700.0, 50.0),
    ];

    assert_eq!(describe_polyline(&points), "3 points in (150,50)..(1400,800)");
    assert_eq!(describe_polyline(&[]), "0 points");
}
