//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::timeseries::MetaIndexPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub conversion: ConversionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Collection catalog configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

fn default_catalog_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("tsindex").join("catalog.json"))
        .unwrap_or_else(|| PathBuf::from("./tsindex_data/catalog.json"))
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

/// Index conversion configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversionConfig {
    /// Whether special index types are allowed on the metadata field
    #[serde(default)]
    pub meta_index_policy: MetaIndexPolicy,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("tsindex").join("config.toml")),
            Some(PathBuf::from("/etc/tsindex/config.toml")),
            Some(PathBuf::from("./tsindex.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        // Fall back to environment-only config
        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("TSINDEX_CATALOG_PATH") {
            self.catalog.path = PathBuf::from(path);
        }

        if let Ok(policy) = std::env::var("TSINDEX_META_INDEX_POLICY") {
            match policy.parse() {
                Ok(p) => self.conversion.meta_index_policy = p,
                Err(e) => tracing::warn!("Ignoring TSINDEX_META_INDEX_POLICY: {}", e),
            }
        }

        if let Ok(level) = std::env::var("TSINDEX_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("TSINDEX_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
///
/// The catalog path is written out resolved for this machine.
pub fn generate_default_config() -> String {
    let catalog_path = toml::Value::String(default_catalog_path().display().to_string());

    format!(
        r#"# tsindex Configuration
#
# Environment variables override these settings:
# - TSINDEX_CATALOG_PATH
# - TSINDEX_META_INDEX_POLICY
# - TSINDEX_LOG_LEVEL
# - TSINDEX_LOG_FORMAT

[catalog]
# JSON file holding collection options and index descriptors
path = {catalog_path}

[conversion]
# Index types allowed on the time-series metadata field:
# allow_special (text, hashed, geo, wildcard) or directions_only
meta_index_policy = "allow_special"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    )
}
