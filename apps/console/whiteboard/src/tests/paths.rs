// Unit tests for config directory resolution

use crate::paths::{PathSource, resolve_config_paths};

use std::path::PathBuf;

#[test]
fn given_override_when_resolved_then_override_wins() {
    let paths = resolve_config_paths(
        Some("/srv/whiteboard".to_string()),
        Some(PathBuf::from("/home/op/.config")),
        Some("/home/op".to_string()),
    )
    .expect("override is enough");

    assert_eq!(paths.config_dir, PathBuf::from("/srv/whiteboard"));
    assert_eq!(paths.source, PathSource::EnvVar);
}

#[test]
fn given_empty_override_when_resolved_then_platform_dir_used() {
    let paths = resolve_config_paths(
        Some(String::new()),
        Some(PathBuf::from("/home/op/.config")),
        None,
    )
    .expect("platform dir is enough");

    assert_eq!(paths.config_dir, PathBuf::from("/home/op/.config/whiteboard"));
    assert_eq!(paths.source, PathSource::PlatformDefault);
}

#[test]
fn given_only_home_when_resolved_then_home_fallback_used() {
    let paths = resolve_config_paths(None, None, Some("/home/op".to_string()))
        .expect("home is enough");

    assert_eq!(paths.config_dir, PathBuf::from("/home/op/.config/whiteboard"));
    assert_eq!(paths.source, PathSource::HomeFallback);
}

#[test]
fn given_nothing_when_resolved_then_returns_error() {
    assert!(resolve_config_paths(None, None, None).is_err());
}
