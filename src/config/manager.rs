//! Configuration manager for loading and saving configuration
//!
//! Missing or corrupt files never prevent a query: both fall back to defaults.
//! Saves go through a temporary file in the target directory followed by an
//! atomic rename.

use crate::config::models::ListerConfig;
use crate::error::{AppListerError, Result, StringError};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const APP_DIR: &str = "installed-apps";
const CONFIG_FILE: &str = "config.json";

/// Configuration manager
pub struct ConfigManager;

impl ConfigManager {
    /// Get the default path of the configuration file
    ///
    /// Resolution order: `%APPDATA%`, `$XDG_CONFIG_HOME`, `$HOME/.config`, current directory.
    pub fn get_config_path() -> PathBuf {
        let base = std::env::var_os("APPDATA")
            .or_else(|| std::env::var_os("XDG_CONFIG_HOME"))
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join(APP_DIR).join(CONFIG_FILE)
    }

    /// Load configuration from the default path
    pub fn load() -> Result<ListerConfig> {
        Self::load_from(&Self::get_config_path())
    }

    /// Load configuration from `path`
    ///
    /// If the file doesn't exist or is corrupt, returns the default configuration.
    pub fn load_from(path: &Path) -> Result<ListerConfig> {
        match Self::try_load_from(path) {
            Err(AppListerError::JsonError(e)) => {
                warn!("Failed to parse configuration, using defaults: {}", e);
                Ok(ListerConfig::default())
            }
            result => result,
        }
    }

    /// Load configuration from `path`, reporting a corrupt file as
    /// [`AppListerError::JsonError`]
    ///
    /// A missing file still yields the default configuration.
    pub fn try_load_from(path: &Path) -> Result<ListerConfig> {
        if !path.exists() {
            info!("Configuration file {} not found, using defaults", path.display());
            return Ok(ListerConfig::default());
        }

        let json = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Save configuration to `path` with an atomic write
    pub fn save_to(path: &Path, config: &ListerConfig) -> Result<()> {
        let config_dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(config_dir)?;

        let json = serde_json::to_string_pretty(config)?;
        let mut temp = tempfile::NamedTempFile::new_in(config_dir)?;
        temp.write_all(json.as_bytes())?;
        temp.persist(path).map_err(|e| {
            AppListerError::ConfigError(StringError::new(format!(
                "Failed to persist {}: {}",
                path.display(),
                e.error
            )))
        })?;

        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}
