// Unit and property tests for the geometry validator
// The validator is pure, so everything here runs without a runtime

use crate::error::geometry::GeometryError;
use crate::geometry::{
    DEFAULT_POLICY, Point, Stroke, TargetZones, Verdict, Zone, any_point_in_zone,
    classify_stroke, contains,
};

use proptest::prelude::*;

fn stroke(points: &[[f64; 2]]) -> Stroke {
    Stroke::new(points.iter().copied().map(Point::from).collect(), 4.0)
}

fn square(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Zone {
    Zone::new(min_x, max_x, min_y, max_y).expect("valid test zone")
}

// ============================================
// contains / any_point_in_zone
// ============================================

/// **VALUE**: Verifies all four edges and corners count as inside.
///
/// **WHY THIS MATTERS**: Strokes that land exactly on a zone boundary must be hits,
/// otherwise pixel rounding on the drawing device turns into random rejections.
///
/// **BUG THIS CATCHES**: Would catch `<` sneaking in where `<=` belongs.
#[test]
fn given_point_on_edge_when_contains_called_then_returns_true() {
    let zone = square(150.0, 250.0, 60.0, 160.0);

    for point in [
        Point::new(150.0, 100.0),
        Point::new(250.0, 100.0),
        Point::new(200.0, 60.0),
        Point::new(200.0, 160.0),
        Point::new(150.0, 60.0),
        Point::new(250.0, 160.0),
    ] {
        assert!(contains(&zone, point), "{point:?} should be inside");
    }

    assert!(!contains(&zone, Point::new(149.999, 100.0)));
    assert!(!contains(&zone, Point::new(200.0, 160.001)));
}

#[test]
fn given_no_points_when_any_point_in_zone_called_then_returns_false() {
    let zone = square(0.0, 10.0, 0.0, 10.0);

    assert!(!any_point_in_zone(&zone, &[]));
}

/// **VALUE**: Verifies a zone built from the closed five-vertex polygon used in
/// policy files reduces to its bounding box.
///
/// **BUG THIS CATCHES**: Would catch min/max mixups when vertices are listed
/// clockwise from the top-right corner.
#[test]
fn given_closed_polygon_when_from_polygon_called_then_returns_bounding_box() {
    let vertices: Vec<Point> = [[1470.0, 820.0], [1470.0, 720.0], [1370.0, 720.0], [1370.0, 820.0], [1470.0, 820.0]]
        .into_iter()
        .map(Point::from)
        .collect();

    let zone = Zone::from_polygon(&vertices).expect("polygon should convert");

    assert_eq!(zone, square(1370.0, 1470.0, 720.0, 820.0));
    assert_eq!(zone.outline()[0], zone.outline()[4], "outline should be closed");
}

#[test]
fn given_inverted_bounds_when_zone_new_called_then_returns_invalid_zone() {
    let result = Zone::new(10.0, 0.0, 0.0, 10.0);

    assert!(matches!(result, Err(GeometryError::InvalidZone { .. })));
}

#[test]
fn given_empty_polygon_when_from_polygon_called_then_returns_invalid_zone() {
    let result = Zone::from_polygon(&[]);

    assert!(matches!(result, Err(GeometryError::InvalidZone { .. })));
}

// ============================================
// classify_stroke: scenarios
// ============================================

/// **VALUE**: The stroke from the bottom target to the top target that avoids
/// both obstacles is accepted.
///
/// **WHY THIS MATTERS**: This is the success path that places a call.
#[test]
fn given_stroke_touching_both_targets_when_classified_then_valid() {
    let stroke = stroke(&[[150.0, 100.0], [200.0, 100.0], [1400.0, 800.0]]);

    let verdict = DEFAULT_POLICY.classify(&stroke).expect("stroke is well formed");

    assert_eq!(verdict, Verdict::Valid);
}

/// **VALUE**: One point inside an obstacle rejects the stroke even though both
/// targets are touched.
///
/// **BUG THIS CATCHES**: Would catch obstacles being checked with "all points"
/// instead of "any point", or target coverage short-circuiting the obstacle check.
#[test]
fn given_stroke_through_obstacle_when_classified_then_invalid() {
    let stroke = stroke(&[[150.0, 100.0], [700.0, 500.0], [1400.0, 800.0]]);

    let verdict = DEFAULT_POLICY.classify(&stroke).expect("stroke is well formed");

    assert_eq!(verdict, Verdict::Invalid);
}

#[test]
fn given_stroke_missing_one_target_when_classified_then_invalid() {
    let stroke = stroke(&[[150.0, 100.0], [400.0, 300.0]]);

    let verdict = DEFAULT_POLICY.classify(&stroke).expect("stroke is well formed");

    assert_eq!(verdict, Verdict::Invalid);
}

/// **VALUE**: An empty stroke is an explicit error, not a rejection.
///
/// **WHY THIS MATTERS**: A corrupt inbound message must not be reported as a
/// safe rejection (which would play the alert and look like a real judgement).
#[test]
fn given_empty_stroke_when_classified_then_returns_error() {
    let result = DEFAULT_POLICY.classify(&Stroke::new(Vec::new(), 4.0));

    assert!(matches!(result, Err(GeometryError::EmptyStroke { .. })));
}

#[test]
fn given_nan_coordinate_when_classified_then_returns_error_with_index() {
    let stroke = Stroke::new(
        vec![Point::new(150.0, 100.0), Point::new(f64::NAN, 3.0)],
        4.0,
    );

    let result = DEFAULT_POLICY.classify(&stroke);

    match result {
        Err(GeometryError::NonFiniteCoordinate { index, .. }) => assert_eq!(index, 1),
        other => panic!("Expected NonFiniteCoordinate, got {other:?}"),
    }
}

#[test]
fn given_no_obstacles_when_classified_then_only_targets_matter() {
    let targets = TargetZones {
        first: square(0.0, 10.0, 0.0, 10.0),
        second: square(90.0, 100.0, 90.0, 100.0),
    };

    let verdict = classify_stroke(&stroke(&[[10.0, 10.0], [90.0, 90.0]]), &targets, &[])
        .expect("stroke is well formed");

    assert_eq!(verdict, Verdict::Valid);
}

// ============================================
// classify_stroke: properties
// ============================================

fn zone_strategy() -> impl Strategy<Value = Zone> {
    (-1000.0..1000.0f64, 0.0..500.0f64, -1000.0..1000.0f64, 0.0..500.0f64).prop_map(
        |(min_x, width, min_y, height)| square(min_x, min_x + width, min_y, min_y + height),
    )
}

fn point_strategy() -> impl Strategy<Value = Point> {
    (-2000.0..2000.0f64, -2000.0..2000.0f64).prop_map(|(x, y)| Point::new(x, y))
}

proptest! {
    #[test]
    fn prop_every_corner_is_inside(zone in zone_strategy()) {
        for corner in zone.outline() {
            prop_assert!(contains(&zone, corner));
        }
    }

    #[test]
    fn prop_verdict_ignores_point_order(
        points in prop::collection::vec(point_strategy(), 1..40)
            .prop_flat_map(|points| (Just(points.clone()), Just(points).prop_shuffle()))
    ) {
        let (original, shuffled) = points;

        let first = DEFAULT_POLICY.classify(&Stroke::new(original, 4.0)).unwrap();
        let second = DEFAULT_POLICY.classify(&Stroke::new(shuffled, 4.0)).unwrap();

        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_one_obstacle_point_flips_valid_to_invalid(
        extra in prop::collection::vec(point_strategy(), 0..20),
        slot in 0usize..22,
    ) {
        // Extra points stay clear of both obstacles so the base stroke is valid
        let clear: Vec<Point> = extra
            .into_iter()
            .filter(|p| DEFAULT_POLICY.obstacles().iter().all(|o| !contains(o, *p)))
            .collect();

        let mut points = vec![Point::new(200.0, 100.0), Point::new(1400.0, 800.0)];
        points.extend(clear);
        prop_assert_eq!(DEFAULT_POLICY.classify(&Stroke::new(points.clone(), 4.0)).unwrap(), Verdict::Valid);

        let index = slot % points.len();
        points.insert(index, Point::new(710.0, 510.0));
        prop_assert_eq!(DEFAULT_POLICY.classify(&Stroke::new(points, 4.0)).unwrap(), Verdict::Invalid);
    }
}
