use anyhow::{Context, Result};
use crate::core::LatLng;
use crate::playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Slowest camera speed accepted, in meters per millisecond
const MIN_SPEED_M_PER_MS: f64 = 0.001;

/// Persistent application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Journey document, a URL or a file path
    pub source: String,
    /// Start index, negative counting from the end
    pub start: i64,
    pub speed_m_per_ms: f64,
    pub settle_ms: u64,
    pub refresh_hz: u32,
    pub initial_center: LatLng,
    pub initial_zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub audio_track: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: "journey.json".to_string(),
            start: -3,
            speed_m_per_ms: 200.0,
            settle_ms: 500,
            refresh_hz: 60,
            initial_center: LatLng::new(55.0, 37.0),
            initial_zoom: 4.0,
            min_zoom: 0.0,
            max_zoom: 7.0,
            audio_track: "theme.mp3".to_string(),
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("journey-replay").join("settings.json"))
    }

    /// Load settings from `path`, or the default location.
    ///
    /// A missing file gives the defaults; so does an unreadable one, with a warning.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::config_path) else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::read(&path) {
            Ok(settings) => {
                tracing::debug!(path = %path.display(), "settings loaded");
                settings
            }
            Err(e) => {
                tracing::warn!("Ignoring settings file: {:#}", e);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Write settings as pretty JSON, creating parent directories
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(Self::config_path)
            .context("No configuration directory available")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        let (min_zoom, max_zoom) = if self.min_zoom <= self.max_zoom {
            (self.min_zoom, self.max_zoom)
        } else {
            (self.max_zoom, self.min_zoom)
        };

        PlaybackConfig {
            speed_m_per_ms: self.speed_m_per_ms.max(MIN_SPEED_M_PER_MS),
            settle: Duration::from_millis(self.settle_ms),
            initial_center: self.initial_center,
            initial_zoom: self.initial_zoom,
            min_zoom,
            max_zoom,
        }
    }
}
