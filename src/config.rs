//! Application Configuration
//!
//! This module provides configuration management for the application,
//! supporting a YAML configuration file with sensible defaults and
//! environment variable overrides.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use log::{info, warn};

use crate::error::{GalleryError, Result};
use crate::storage::config::StorageConfig;

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Object storage configuration
    pub storage: StorageConfig,
    /// Record collection configuration
    pub records: RecordsConfig,
    /// Upload limits
    pub uploads: UploadConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Record collection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecordsConfig {
    /// Directory holding comments.json, likes.json, users.json and messages.json
    pub data_dir: PathBuf,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

/// Upload limits and profile picture location
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_upload_bytes: usize,
    pub max_profile_picture_bytes: usize,
    pub profile_picture_dir: PathBuf,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 50 * 1024 * 1024,
            max_profile_picture_bytes: 5 * 1024 * 1024,
            profile_picture_dir: PathBuf::from("uploads/profile-pictures"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Path to log4rs configuration file
    pub config_file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            config_file: PathBuf::from("server_log.yaml"),
        }
    }
}

impl AppConfig {
    /// Load `config.yaml` from the working directory, use defaults if not
    /// found, then apply environment overrides
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            let config = Self::from_yaml(&content)?;
            info!("Loaded configuration from {}", path.display());
            config
        } else {
            warn!("Config file {} not found, using defaults", path.display());
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| GalleryError::Config(e.to_string()))
    }

    /// Override fields from the environment; see `StorageConfig::apply_env`
    /// for the storage variables
    pub fn apply_env(&mut self) {
        self.storage.apply_env();
        if let Ok(dir) = env::var("DATA_DIR") {
            if !dir.trim().is_empty() {
                info!("Using record data directory from environment: {}", dir);
                self.records.data_dir = PathBuf::from(dir);
            }
        }
    }
}
