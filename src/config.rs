use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub orientation: OrientationConfig,
    pub look: LookConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationConfig {
    /// Subscribe to device orientation on startup.
    pub enabled: bool,
    /// Offsets in degrees added to the raw sensor angles.
    pub alpha_offset_deg: f32,
    pub beta_offset_deg: f32,
    pub gamma_offset_deg: f32,
    /// Zero the device angles when orientation tracking is switched off.
    pub reset_on_disable: bool,
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            alpha_offset_deg: 0.0,
            beta_offset_deg: 0.0,
            gamma_offset_deg: 0.0,
            reset_on_disable: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookConfig {
    pub mouse_enabled: bool,
    pub touch_enabled: bool,
    pub pointer_lock_enabled: bool,
    pub reverse_mouse_drag: bool,
    pub reverse_touch_drag: bool,
    /// Radians per pixel of mouse movement.
    pub mouse_sensitivity: f32,
    /// Fraction of a full turn per canvas width of touch drag.
    pub touch_sensitivity: f32,
    pub device_orientation_tracking: bool,
    /// Start with the pose delegated to an immersive session.
    pub xr_mode: bool,
}

impl Default for LookConfig {
    fn default() -> Self {
        Self {
            mouse_enabled: true,
            touch_enabled: true,
            pointer_lock_enabled: false,
            reverse_mouse_drag: false,
            reverse_touch_drag: false,
            mouse_sensitivity: 0.002,
            touch_sensitivity: 0.5,
            device_orientation_tracking: true,
            xr_mode: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is not set.
    pub level: String,
    /// Daily-rolling log file (native only).
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl ControlsConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load config from disk, or return the defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(?path, "No config found, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        info!(?path, "Loaded config");
        Ok(config)
    }

    pub fn to_toml_string(&self) -> String {
        // Every field is a plain scalar or table, so serialization cannot fail
        toml::to_string_pretty(self).unwrap_or_default()
    }
}
