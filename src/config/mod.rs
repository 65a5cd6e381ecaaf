//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::TieringPolicy;

/// Largest page of run history a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Tracker behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Heroes always shown in tables and charts, even with no runs
    #[serde(default = "default_roster")]
    pub roster: Vec<String>,

    /// Runs per history page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Season used when a request does not name one
    #[serde(default)]
    pub default_season: i32,

    /// Patch stamped on new runs that do not name one
    #[serde(default)]
    pub current_patch: String,

    #[serde(default)]
    pub tiering: TieringPolicy,
}

fn default_roster() -> Vec<String> {
    ["Dooley", "Mak", "Pygmalien", "Vanessa", "Stelle", "Jules"]
        .iter()
        .map(|h| h.to_string())
        .collect()
}

fn default_page_size() -> u32 {
    8
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            roster: default_roster(),
            page_size: default_page_size(),
            default_season: 0,
            current_patch: String::new(),
            tiering: TieringPolicy::default(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub tracker: TrackerConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            server: ServerConfig::default(),
            tracker: TrackerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.tracker.page_size == 0 || self.tracker.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::ValidationError(format!(
                "Page size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        if self.tracker.roster.iter().any(|h| h.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "Roster entries must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
