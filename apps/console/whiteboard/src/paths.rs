//! Where the console keeps config.json, policy.toml, session.json and its log.
//!
//! Lookup order:
//! 1. WHITEBOARD_CONFIG_DIR environment variable (explicit override)
//! 2. Platform config directory via `dirs`, plus `whiteboard`
//! 3. `$HOME/.config/whiteboard`

use crate::error::WhiteboardError;

use common::ErrorLocation;

use std::env;
use std::fmt::{Display, Formatter, Result as FormatResult};
use std::panic::Location;
use std::path::PathBuf;

use log::{debug, info, warn};

pub const CONFIG_DIR_ENV: &str = "WHITEBOARD_CONFIG_DIR";

const APP_DIR_NAME: &str = "whiteboard";

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
    pub source: PathSource,
}

/// How the path was determined (for logging).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSource {
    EnvVar,
    PlatformDefault,
    HomeFallback,
}

impl Display for PathSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        match self {
            PathSource::EnvVar => write!(f, "{CONFIG_DIR_ENV}"),
            PathSource::PlatformDefault => write!(f, "platform default"),
            PathSource::HomeFallback => write!(f, "home fallback"),
        }
    }
}

/// Detect the config directory from the real environment.
pub fn detect_config_paths() -> Result<ConfigPaths, WhiteboardError> {
    resolve_config_paths(
        env::var(CONFIG_DIR_ENV).ok(),
        dirs::config_dir(),
        env::var("HOME").ok(),
    )
}

/// Pure lookup, given the override, platform directory and home directory.
///
/// # Errors
///
/// Returns [`WhiteboardError::Whiteboard`] if none of the three is available.
#[track_caller]
pub fn resolve_config_paths(
    override_dir: Option<String>,
    platform_dir: Option<PathBuf>,
    home: Option<String>,
) -> Result<ConfigPaths, WhiteboardError> {
    if let Some(custom_dir) = override_dir.filter(|dir| !dir.is_empty()) {
        let config_dir = PathBuf::from(custom_dir);
        info!("Using {CONFIG_DIR_ENV} override: {}", config_dir.display());
        return Ok(ConfigPaths {
            config_dir,
            source: PathSource::EnvVar,
        });
    }

    if let Some(platform_dir) = platform_dir {
        let config_dir = platform_dir.join(APP_DIR_NAME);
        debug!("Platform config dir: {}", config_dir.display());
        return Ok(ConfigPaths {
            config_dir,
            source: PathSource::PlatformDefault,
        });
    }

    if let Some(home) = home {
        let config_dir = PathBuf::from(home).join(".config").join(APP_DIR_NAME);
        warn!("Using home fallback path: {}", config_dir.display());
        return Ok(ConfigPaths {
            config_dir,
            source: PathSource::HomeFallback,
        });
    }

    Err(WhiteboardError::Whiteboard {
        message: format!("Cannot determine config directory; set {CONFIG_DIR_ENV}"),
        location: ErrorLocation::from(Location::caller()),
    })
}
