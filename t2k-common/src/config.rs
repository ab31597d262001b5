//! Configuration loading and dataset path resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the dataset location
pub const DATASET_ENV_VAR: &str = "T2K_DATASET_PATH";

/// Dataset location used when nothing else is configured
pub const DEFAULT_DATASET_PATH: &str = "data/songs.json";

/// Bootstrap configuration loaded from TOML file
///
/// Read once at startup. Every field is optional so a partial file is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Path to the songs dataset (relative or absolute)
    #[serde(default)]
    pub dataset_path: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML {:?}: {}", path, e)))
    }

    /// Load configuration, falling back to defaults
    ///
    /// With no explicit path the platform config file is tried. A missing file
    /// is silent; an unreadable or malformed one logs a warning. Neither stops
    /// startup.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(default_config_file) {
            Some(path) => path,
            None => {
                debug!("No config directory on this platform, using defaults");
                return Self::default();
            }
        };

        if !path.exists() {
            debug!("Config file {:?} not found, using defaults", path);
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }
}

/// Platform config file: `<config dir>/t2k/config.toml`
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("t2k").join("config.toml"))
}

/// Dataset path resolution, in priority order:
/// 1. Command-line argument
/// 2. `T2K_DATASET_PATH` environment variable
/// 3. `dataset_path` from the TOML config
/// 4. Compiled default (`data/songs.json`)
pub fn resolve_dataset_path(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATASET_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.dataset_path {
        return path.clone();
    }

    PathBuf::from(DEFAULT_DATASET_PATH)
}
