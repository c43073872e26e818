//! Configuration management for rentbook.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::ids::DEFAULT_ID_LENGTH;
use crate::storage::{DEFAULT_GENERATION, DEFAULT_KEY_PREFIX};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "rentbook";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "rentbook.db";

/// Allowed characters in a key prefix or generation marker.
const KEY_SEGMENT_PATTERN: &str = r"^[A-Za-z0-9]+$";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `RENTBOOK_`)
/// 2. TOML config file at `~/.config/rentbook/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Dashboard configuration.
    pub dashboard: DashboardConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/rentbook/rentbook.db`
    pub database_path: Option<PathBuf>,
    /// Namespace prefix of collection keys.
    pub key_prefix: String,
    /// Generation marker of collection keys. Changing it starts afresh.
    pub generation: String,
    /// Length of generated record identifiers.
    pub id_length: usize,
}

/// Dashboard-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Share of gross income proposed for family support, in percent.
    pub allocation_percent: f64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            generation: DEFAULT_GENERATION.to_string(),
            id_length: DEFAULT_ID_LENGTH,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            allocation_percent: 10.0,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `RENTBOOK_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("RENTBOOK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let segment = Regex::new(KEY_SEGMENT_PATTERN)
            .map_err(|e| Error::internal(format!("bad key segment pattern: {e}")))?;

        for (name, value) in [
            ("key_prefix", &self.storage.key_prefix),
            ("generation", &self.storage.generation),
        ] {
            if !segment.is_match(value) {
                return Err(Error::ConfigValidation {
                    message: format!("{name} must be non-empty and alphanumeric, got '{value}'"),
                });
            }
        }

        if !(6..=32).contains(&self.storage.id_length) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "id_length must be between 6 and 32, got {}",
                    self.storage.id_length
                ),
            });
        }

        let percent = self.dashboard.allocation_percent;
        if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
            return Err(Error::ConfigValidation {
                message: format!("allocation_percent must be between 0 and 100, got {percent}"),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Proposed allocation as a fraction of income.
    #[must_use]
    pub fn allocation_ratio(&self) -> f64 {
        self.dashboard.allocation_percent / 100.0
    }
}
