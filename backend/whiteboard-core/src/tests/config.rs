// Unit tests for config.json and policy.toml loading

use crate::config::{AppConfig, PolicyConfig};
use crate::error::config::ConfigError;
use crate::geometry::{DEFAULT_POLICY, Zone};

use tempfile::TempDir;

#[test]
fn given_missing_config_file_when_loaded_then_returns_defaults() {
    let dir = TempDir::new().expect("temp dir");

    let config = AppConfig::load(dir.path()).expect("missing file should yield defaults");

    assert_eq!(config, AppConfig::default());
    assert_eq!(config.server.binding, "collabazoo.event");
}

/// **VALUE**: Verifies save then load returns the same config, and that partial
/// files fall back to defaults per field.
///
/// **BUG THIS CATCHES**: Would catch a missing `#[serde(default)]` making an
/// older config.json without the `alert` section unreadable.
#[test]
fn given_partial_config_file_when_loaded_then_missing_fields_defaulted() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(
        dir.path().join("config.json"),
        r#"{"server": {"realtime_url": "ws://127.0.0.1:5555"}}"#,
    )
    .expect("write config");

    let config = AppConfig::load(dir.path()).expect("partial config should load");

    assert_eq!(config.server.realtime_url, "ws://127.0.0.1:5555");
    assert_eq!(config.server.quickcall_extension, "1003");
    assert_eq!(config.alert.player, None);
}

#[test]
fn given_saved_config_when_loaded_then_round_trips() {
    let dir = TempDir::new().expect("temp dir");
    let mut config = AppConfig::default();
    config.alert.player = Some("paplay".to_string());
    config.alert.args = vec!["/usr/share/sounds/alert.oga".to_string()];

    config.save(dir.path()).expect("save");
    let loaded = AppConfig::load(dir.path()).expect("load");

    assert_eq!(loaded, config);
    assert!(!dir.path().join("config.json.tmp").exists());
}

#[test]
fn given_http_realtime_url_when_validated_then_returns_validation_error() {
    let mut config = AppConfig::default();
    config.server.realtime_url = "https://localhost:5555".to_string();

    assert!(matches!(config.validate(), Err(ConfigError::ValidationError { .. })));
}

#[test]
fn given_corrupt_config_file_when_loaded_then_returns_parse_error() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join("config.json"), "{").expect("write config");

    assert!(matches!(AppConfig::load(dir.path()), Err(ConfigError::ParseError { .. })));
}

#[test]
fn given_missing_policy_file_when_loaded_then_returns_sample_policy() {
    let dir = TempDir::new().expect("temp dir");

    let policy = PolicyConfig::load(dir.path()).expect("missing file should yield sample");

    assert_eq!(policy, *DEFAULT_POLICY);
}

/// **VALUE**: Verifies polygons in policy.toml become bounding-box zones.
///
/// **WHY THIS MATTERS**: Deployments move the targets; a policy that loads but
/// maps to different rectangles would approve strokes nobody intended.
#[test]
fn given_policy_file_when_loaded_then_polygons_become_zones() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(
        dir.path().join("policy.toml"),
        r#"
targets = [
    [[0, 0], [0, 10], [10, 10], [10, 0], [0, 0]],
    [[90, 90], [90, 100], [100, 100], [100, 90]],
]
obstacles = [
    [[40, 40], [60, 60]],
]
"#,
    )
    .expect("write policy");

    let policy = PolicyConfig::load(dir.path()).expect("policy should load");

    assert_eq!(policy.targets().first, Zone::new(0.0, 10.0, 0.0, 10.0).unwrap());
    assert_eq!(policy.targets().second, Zone::new(90.0, 100.0, 90.0, 100.0).unwrap());
    assert_eq!(policy.obstacles(), &[Zone::new(40.0, 60.0, 40.0, 60.0).unwrap()]);
}

#[test]
fn given_three_targets_when_converted_then_returns_validation_error() {
    let square = vec![[0.0, 0.0], [1.0, 1.0]];
    let config = PolicyConfig {
        targets: vec![square.clone(), square.clone(), square],
        obstacles: Vec::new(),
    };

    assert!(matches!(config.into_policy(), Err(ConfigError::ValidationError { .. })));
}

#[test]
fn given_empty_obstacle_polygon_when_converted_then_returns_policy_zone_error() {
    let square = vec![[0.0, 0.0], [1.0, 1.0]];
    let config = PolicyConfig {
        targets: vec![square.clone(), square],
        obstacles: vec![Vec::new()],
    };

    assert!(matches!(config.into_policy(), Err(ConfigError::PolicyZone { .. })));
}

/// **VALUE**: Policy and endpoint errors are located at the caller's line.
///
/// **WHY THIS MATTERS**: Startup reports these before exiting; a location
/// inside config/ says nothing about which load tripped.
///
/// **BUG THIS CATCHES**: Would catch `#[track_caller]` being dropped from
/// `PolicyConfig::load`, or the location being taken inside a `map_err` closure.
#[test]
fn given_malformed_policy_file_when_loaded_then_error_location_is_the_caller() {
    // GIVEN
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join("policy.toml"), "targets = [[").expect("write policy");

    // WHEN
    let result = PolicyConfig::load(dir.path());
    let expected_line = line!() - 1;

    // THEN
    match result {
        Err(ConfigError::ParseError { location, .. }) => {
            assert!(location.file.ends_with("config.rs"));
            assert_eq!(location.line, expected_line);
        }
        other => panic!("Expected ParseError, got {other:?}"),
    }
}

#[test]
fn given_http_realtime_url_when_endpoint_requested_then_error_location_is_the_caller() {
    // GIVEN
    let mut config = AppConfig::default();
    config.server.realtime_url = "http://localhost:5555".to_string();

    // WHEN
    let result = config.realtime_endpoint();
    let expected_line = line!() - 1;

    // THEN
    match result {
        Err(ConfigError::ValidationError { location, .. }) => {
            assert!(location.file.ends_with("config.rs"));
            assert_eq!(location.line, expected_line);
        }
        other => panic!("Expected ValidationError, got {other:?}"),
    }
}
