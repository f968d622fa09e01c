pub mod policy;

pub use policy::PolicyConfig;

use crate::error::config::ConfigError;
use crate::{
    COLLAB_SUBSCRIBE_BINDING, DEFAULT_CROSSBAR_URL, DEFAULT_QUICKCALL_EXTENSION,
    DEFAULT_REALTIME_URL,
};

use common::ErrorLocation;

use std::panic::Location;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use url::Url;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_VERSION: u32 = 1;

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Crossbar REST root, e.g. `https://host:8443/v2/`.
    #[serde(default = "default_crossbar_url")]
    pub crossbar_url: String,
    /// Realtime websocket endpoint, e.g. `wss://host:5555`.
    #[serde(default = "default_realtime_url")]
    pub realtime_url: String,
    #[serde(default = "default_binding")]
    pub binding: String,
    #[serde(default = "default_quickcall_extension")]
    pub quickcall_extension: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            crossbar_url: default_crossbar_url(),
            realtime_url: default_realtime_url(),
            binding: default_binding(),
            quickcall_extension: default_quickcall_extension(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AlertConfig {
    /// Player executable. `None` disables the audible alert.
    pub player: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub alert: AlertConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: ServerConfig::default(),
            alert: AlertConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_crossbar_url() -> String {
    DEFAULT_CROSSBAR_URL.to_string()
}
fn default_realtime_url() -> String {
    DEFAULT_REALTIME_URL.to_string()
}
fn default_binding() -> String {
    COLLAB_SUBSCRIBE_BINDING.to_string()
}
fn default_quickcall_extension() -> String {
    DEFAULT_QUICKCALL_EXTENSION.to_string()
}

// ============================================
// IMPLEMENTATION
// ============================================

impl AppConfig {
    /// Load config from {config_dir}/config.json.
    ///
    /// # Returns
    ///
    /// Returns `Ok(AppConfig)` if loaded successfully or defaults if file missing.
    /// Returns `Err(ConfigError)` if file exists but is corrupted/invalid.
    #[track_caller]
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let location = ErrorLocation::from(Location::caller());
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location,
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: AppConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {}", e);
            ConfigError::ParseError {
                location,
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/config.json using atomic write.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation, directory creation, serialization,
    /// write or rename fails.
    #[track_caller]
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let location = ErrorLocation::from(Location::caller());
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location,
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{}.tmp", CONFIG_FILE_NAME));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location,
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location,
            path: temp_path.clone(),
            source: e,
        })?;

        // Atomic rename (POSIX guarantees atomicity)
        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location,
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    #[track_caller]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let location = ErrorLocation::from(Location::caller());
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::ValidationError {
                location,
                reason: format!(
                    "Invalid version: {} (expected 1-{})",
                    self.version, CONFIG_VERSION
                ),
            });
        }

        let crossbar = parse_url("crossbar_url", &self.server.crossbar_url)?;
        if !matches!(crossbar.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError {
                location,
                reason: format!("crossbar_url must be http(s): {}", self.server.crossbar_url),
            });
        }

        self.realtime_endpoint()?;

        if self.server.binding.is_empty() {
            return Err(ConfigError::ValidationError {
                location,
                reason: "binding cannot be empty".to_string(),
            });
        }

        if self.server.quickcall_extension.is_empty() {
            return Err(ConfigError::ValidationError {
                location,
                reason: "quickcall_extension cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// The realtime endpoint as a `ws://` or `wss://` URL.
    #[track_caller]
    pub fn realtime_endpoint(&self) -> Result<Url, ConfigError> {
        let location = ErrorLocation::from(Location::caller());
        let url = parse_url("realtime_url", &self.server.realtime_url)?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(ConfigError::ValidationError {
                location,
                reason: format!("realtime_url must be ws(s): {}", self.server.realtime_url),
            });
        }
        Ok(url)
    }
}

#[track_caller]
fn parse_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    let location = ErrorLocation::from(Location::caller());
    Url::parse(value).map_err(|e| ConfigError::ValidationError {
        location,
        reason: format!("Invalid {field} '{value}': {e}"),
    })
}
