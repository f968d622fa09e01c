//! Stroke classification against axis-aligned zones.
//!
//! Everything in here is a pure function of its inputs: no state, no I/O, no
//! logging. The protocol machine calls [`classify_stroke`] once per inbound
//! draw event and acts on the [`Verdict`].
//!
//! # Semantics
//!
//! - Zones are closed rectangles: a point exactly on an edge is inside.
//! - A stroke is [`Verdict::Valid`] when it touches both target zones and no
//!   obstacle zone. One obstacle hit invalidates the whole stroke.
//! - Point order never affects the verdict (only the drawing order).
//! - Empty strokes and non-finite coordinates are errors, not rejections.

pub mod policy;

pub use policy::{DEFAULT_POLICY, Policy, TargetZones};

use crate::error::geometry::GeometryError;

use common::ErrorLocation;

use std::panic::Location;

use serde::{Deserialize, Serialize};

/// A canvas coordinate. Travels on the wire as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

/// Axis-aligned rectangle, stored as its bounding box.
///
/// Invariant: `min_x <= max_x` and `min_y <= max_y`, all finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl Zone {
    /// Build a zone from explicit bounds.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidZone`] if a bound is not finite or a
    /// minimum exceeds its maximum.
    #[track_caller]
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Result<Self, GeometryError> {
        let bounds = [min_x, max_x, min_y, max_y];
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(GeometryError::InvalidZone {
                message: format!("non-finite bound in {bounds:?}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        if min_x > max_x || min_y > max_y {
            return Err(GeometryError::InvalidZone {
                message: format!(
                    "inverted bounds: x {min_x}..{max_x}, y {min_y}..{max_y}"
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Self::from_bounds(min_x, max_x, min_y, max_y))
    }

    /// Bounding box of a polygon, the canonical form of a zone.
    ///
    /// The polygon may be open or closed (first vertex repeated at the end).
    #[track_caller]
    pub fn from_polygon(vertices: &[Point]) -> Result<Self, GeometryError> {
        let Some(first) = vertices.first() else {
            return Err(GeometryError::InvalidZone {
                message: "polygon has no vertices".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
        for vertex in &vertices[1..] {
            min_x = min_x.min(vertex.x);
            max_x = max_x.max(vertex.x);
            min_y = min_y.min(vertex.y);
            max_y = max_y.max(vertex.y);
        }

        if let Some(bad) = vertices.iter().find(|v| !v.is_finite()) {
            return Err(GeometryError::InvalidZone {
                message: format!("non-finite vertex ({}, {})", bad.x, bad.y),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Self::from_bounds(min_x, max_x, min_y, max_y))
    }

    /// Built-in zones only; callers guarantee the invariant.
    pub(crate) const fn from_bounds(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Closed outline for drawing, starting and ending at the lower-left corner.
    pub fn outline(&self) -> [Point; 5] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.min_x, self.max_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.min_x, self.min_y),
        ]
    }
}

/// One continuous drawn path.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub points: Vec<Point>,
    /// Render thickness. Has no bearing on classification.
    pub width: f64,
}

impl Stroke {
    pub fn new(points: Vec<Point>, width: f64) -> Self {
        Self { points, width }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid,
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }
}

/// True iff `point` lies in `zone`, edges included.
pub fn contains(zone: &Zone, point: Point) -> bool {
    point.x >= zone.min_x && point.x <= zone.max_x && point.y >= zone.min_y && point.y <= zone.max_y
}

/// True iff at least one point lies in `zone`. False for no points.
pub fn any_point_in_zone(zone: &Zone, points: &[Point]) -> bool {
    points.iter().any(|point| contains(zone, *point))
}

/// Judge a stroke against the two targets and the obstacles.
///
/// # Errors
///
/// - [`GeometryError::EmptyStroke`] if the stroke has no points
/// - [`GeometryError::NonFiniteCoordinate`] if any coordinate is NaN or infinite
#[track_caller]
pub fn classify_stroke(
    stroke: &Stroke,
    targets: &TargetZones,
    obstacles: &[Zone],
) -> Result<Verdict, GeometryError> {
    validate_points(&stroke.points)?;

    let points = stroke.points.as_slice();
    let hits_obstacle = obstacles
        .iter()
        .any(|obstacle| any_point_in_zone(obstacle, points));
    if hits_obstacle {
        return Ok(Verdict::Invalid);
    }

    if any_point_in_zone(&targets.first, points) && any_point_in_zone(&targets.second, points) {
        Ok(Verdict::Valid)
    } else {
        Ok(Verdict::Invalid)
    }
}

#[track_caller]
fn validate_points(points: &[Point]) -> Result<(), GeometryError> {
    if points.is_empty() {
        return Err(GeometryError::EmptyStroke {
            message: "stroke has no points".to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    if let Some((index, point)) = points.iter().enumerate().find(|(_, p)| !p.is_finite()) {
        return Err(GeometryError::NonFiniteCoordinate {
            index,
            x: point.x,
            y: point.y,
            location: ErrorLocation::from(Location::caller()),
        });
    }

    Ok(())
}
