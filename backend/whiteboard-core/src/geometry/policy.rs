//! The fixed zone layout strokes are judged against.

use crate::error::geometry::GeometryError;
use crate::geometry::{Stroke, Verdict, Zone, classify_stroke};

use once_cell::sync::Lazy;

/// The two zones a valid stroke must touch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetZones {
    pub first: Zone,
    pub second: Zone,
}

/// Two targets plus any number of obstacles. Built once at startup and shared
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    targets: TargetZones,
    obstacles: Vec<Zone>,
}

/// Sample layout used when no `policy.toml` is present.
pub static DEFAULT_POLICY: Lazy<Policy> = Lazy::new(|| Policy {
    targets: TargetZones {
        first: Zone::from_bounds(150.0, 250.0, 60.0, 160.0),
        second: Zone::from_bounds(1370.0, 1470.0, 720.0, 820.0),
    },
    obstacles: vec![
        Zone::from_bounds(660.0, 760.0, 460.0, 560.0),
        Zone::from_bounds(1210.0, 1310.0, 590.0, 690.0),
    ],
});

impl Policy {
    pub fn new(targets: TargetZones, obstacles: Vec<Zone>) -> Self {
        Self { targets, obstacles }
    }

    pub fn targets(&self) -> &TargetZones {
        &self.targets
    }

    pub fn obstacles(&self) -> &[Zone] {
        &self.obstacles
    }

    #[track_caller]
    pub fn classify(&self, stroke: &Stroke) -> Result<Verdict, GeometryError> {
        classify_stroke(stroke, &self.targets, &self.obstacles)
    }
}
