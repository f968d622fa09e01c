use crate::error::config::ConfigError;
use crate::geometry::{DEFAULT_POLICY, Point, Policy, TargetZones, Zone};

use common::ErrorLocation;

use std::panic::Location;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

const POLICY_FILE_NAME: &str = "policy.toml";

/// A zone as written in `policy.toml`: its polygon vertices.
pub type PolygonConfig = Vec<[f64; 2]>;

/// `policy.toml`:
///
/// ```toml
/// targets = [
///     [[150, 60], [150, 160], [250, 160], [250, 60], [150, 60]],
///     [[1470, 820], [1470, 720], [1370, 720], [1370, 820], [1470, 820]],
/// ]
/// obstacles = [
///     [[660, 460], [660, 560], [760, 560], [760, 460], [660, 460]],
/// ]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyConfig {
    pub targets: Vec<PolygonConfig>,
    #[serde(default)]
    pub obstacles: Vec<PolygonConfig>,
}

impl PolicyConfig {
    /// Load policy.toml from the config directory.
    ///
    /// A missing file yields the built-in sample policy. A present but invalid
    /// file is an error: judging strokes against the wrong zones is worse than
    /// not starting.
    #[track_caller]
    pub fn load(config_dir: &Path) -> Result<Policy, ConfigError> {
        let location = ErrorLocation::from(Location::caller());
        let path = config_dir.join(POLICY_FILE_NAME);

        if !path.exists() {
            warn!(
                "No {} at {}, using the built-in sample policy",
                POLICY_FILE_NAME,
                path.display()
            );
            return Ok((*DEFAULT_POLICY).clone());
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
            location,
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: PolicyConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                location,
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let policy = config.into_policy()?;
        info!(
            "Policy loaded from {}: 2 targets, {} obstacles",
            path.display(),
            policy.obstacles().len()
        );
        Ok(policy)
    }

    /// Validate and reduce every polygon to its bounding box.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ValidationError`] unless there are exactly two targets
    /// - [`ConfigError::PolicyZone`] for an empty or non-finite polygon
    #[track_caller]
    pub fn into_policy(self) -> Result<Policy, ConfigError> {
        let location = ErrorLocation::from(Location::caller());
        let [first, second]: [PolygonConfig; 2] =
            self.targets.try_into().map_err(|targets: Vec<PolygonConfig>| {
                ConfigError::ValidationError {
                    location,
                    reason: format!("Expected exactly 2 target zones, found {}", targets.len()),
                }
            })?;

        let targets = TargetZones {
            first: zone_from_config(&first)?,
            second: zone_from_config(&second)?,
        };

        let obstacles = self
            .obstacles
            .iter()
            .map(|polygon| zone_from_config(polygon))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Policy::new(targets, obstacles))
    }
}

#[track_caller]
fn zone_from_config(polygon: &PolygonConfig) -> Result<Zone, ConfigError> {
    let location = ErrorLocation::from(Location::caller());
    let vertices: Vec<Point> = polygon.iter().copied().map(Point::from).collect();
    Zone::from_polygon(&vertices).map_err(|e| ConfigError::PolicyZone {
        location,
        source: e,
    })
}
