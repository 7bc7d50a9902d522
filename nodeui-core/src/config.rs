use crate::color::Palette;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing the editor configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the config directory")]
    NoConfigDir,
    #[error("config I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Node editor configuration (persistent)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub palette: Palette,
    /// Width of the curve drawn while dragging from a socket
    pub preview_stroke_width: f64,
    /// Width of the node outline stroke
    pub outline_stroke_width: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            preview_stroke_width: 2.0,
            outline_stroke_width: 1.0,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load config from standard location
    /// Returns default config if file doesn't exist or is malformed
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load node editor config: {}; using defaults", e);
                Self::default()
            }
        }
    }

    pub fn try_load() -> Result<Self, ConfigError> {
        Self::try_load_from(&Self::config_path()?)
    }

    /// Load from an explicit path; a missing file yields the defaults
    pub fn try_load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Save config to standard location
    /// Logs error but doesn't block if save fails
    pub fn save(&self) {
        if let Err(e) = self.try_save() {
            log::warn!("Failed to save node editor config: {}", e);
        }
    }

    pub fn try_save(&self) -> Result<(), ConfigError> {
        self.try_save_to(&Self::config_path()?)
    }

    /// Save atomically (write to temp, then rename)
    pub fn try_save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, json)?;
        std::fs::rename(temp_path, path)?;

        Ok(())
    }

    /// Get cross-platform config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        use directories::ProjectDirs;

        let proj_dirs = ProjectDirs::from("", "", "nodeui").ok_or(ConfigError::NoConfigDir)?;
        Ok(proj_dirs.config_dir().join("config.json"))
    }
}
