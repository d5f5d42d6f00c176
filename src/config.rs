//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is read first, if present.

use crate::services::controller::ControllerConfig;
use chrono::{FixedOffset, Local, Offset, Utc};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Where workout data is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// JSON files under `data_dir`
    File,
    /// Process memory only, lost on restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::Invalid("STORAGE_BACKEND", other.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Page origin allowed by CORS
    pub frontend_url: String,
    /// Directory holding the storage slots
    pub data_dir: PathBuf,
    pub storage_backend: StorageBackend,
    /// Zoom level for the map view
    pub map_zoom: u8,
    /// User's local offset, used for calendar dates in descriptions
    pub utc_offset: FixedOffset,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: parse_var("PORT", 8080)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            storage_backend: match env::var("STORAGE_BACKEND") {
                Ok(value) => value.parse()?,
                Err(_) => StorageBackend::File,
            },
            map_zoom: parse_var("MAP_ZOOM", 13)?,
            utc_offset: parse_offset()?,
        })
    }

    /// In-memory config for tests.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            data_dir: PathBuf::from("data"),
            storage_backend: StorageBackend::Memory,
            map_zoom: 13,
            utc_offset: Utc.fix(),
        }
    }

    /// Settings handed to the workout controller.
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            map_zoom: self.map_zoom,
            utc_offset: self.utc_offset,
        }
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => Ok(value),
            Err(_) => Err(ConfigError::Invalid(name, raw)),
        },
        Err(_) => Ok(default),
    }
}

/// `UTC_OFFSET_MINUTES` east of UTC, defaulting to the host's local offset.
fn parse_offset() -> Result<FixedOffset, ConfigError> {
    let Ok(raw) = env::var("UTC_OFFSET_MINUTES") else {
        return Ok(Local::now().offset().fix());
    };
    raw.trim()
        .parse::<i32>()
        .ok()
        .and_then(|minutes| minutes.checked_mul(60))
        .and_then(FixedOffset::east_opt)
        .ok_or(ConfigError::Invalid("UTC_OFFSET_MINUTES", raw))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),
}
