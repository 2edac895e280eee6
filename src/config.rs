use crate::core::{LatLng, RouteSelection};
use crate::playback::viewport::{DEFAULT_CENTER, DEFAULT_ZOOM};
use crate::playback::{PlaybackConfig, Viewport};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings file {path:?} is malformed: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no configuration directory available on this platform")]
    NoConfigDir,
}

/// Persistent application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// JSON document with the day buckets
    pub data_path: PathBuf,
    /// Selection loaded at startup
    pub selection: RouteSelection,
    pub tick_interval_ms: u64,
    pub animation_ms: u64,
    pub pan_ms: u64,
    pub frame_ms: u64,
    pub zoom: u8,
    pub default_center: LatLng,
    /// CSV file receiving the replay trace
    pub export_path: Option<PathBuf>,
    pub autoplay: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let playback = PlaybackConfig::default();
        Self {
            data_path: PathBuf::from("data/dummy-routes.json"),
            selection: RouteSelection::default(),
            tick_interval_ms: playback.tick_interval.as_millis() as u64,
            animation_ms: playback.animation_duration.as_millis() as u64,
            pan_ms: playback.pan_duration.as_millis() as u64,
            frame_ms: playback.frame_interval.as_millis() as u64,
            zoom: DEFAULT_ZOOM,
            default_center: DEFAULT_CENTER,
            export_path: None,
            autoplay: false,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("route-replay").join("settings.json"))
    }

    /// Load from the default location. A missing or unreadable file yields defaults.
    pub fn load() -> Self {
        let path = match Self::config_path() {
            Some(path) => path,
            None => return Self::default(),
        };
        if !path.exists() {
            debug!("No settings at {:?}, using defaults", path);
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Load from an explicit path
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save to the default location
    pub fn save(&self) -> Result<PathBuf, SettingsError> {
        let path = Self::config_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(io_err)
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            tick_interval: Duration::from_millis(self.tick_interval_ms.max(1)),
            animation_duration: Duration::from_millis(self.animation_ms),
            pan_duration: Duration::from_millis(self.pan_ms),
            frame_interval: Duration::from_millis(self.frame_ms.max(1)),
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.default_center, self.zoom, Duration::from_millis(self.pan_ms))
    }
}
