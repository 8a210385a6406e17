//! Application configuration
//!
//! Loaded from `config.toml` in the platform config directory, or from an
//! explicit path. Missing sections and fields fall back to their defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::audio::policy::{DeviceKind, PolicyKind};
use crate::constants::{DEFAULT_QUEUE_CAPACITY, DEFAULT_STEREO_REFRESH_DEBOUNCE_MS};
use crate::error::{Error, Result};

const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub audio: AudioConfig,
    pub sdp: SdpConfig,
}

/// Store worker settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Pending batches accepted before `dispatch` fails fast
    pub queue_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Audio session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub stereo_refresh_debounce_ms: u64,
    pub policy: PolicyKind,
    pub device: DeviceKind,
    pub prefer_stereo_playout: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            stereo_refresh_debounce_ms: DEFAULT_STEREO_REFRESH_DEBOUNCE_MS,
            policy: PolicyKind::Default,
            device: DeviceKind::Phone,
            prefer_stereo_playout: false,
        }
    }
}

impl AudioConfig {
    pub fn stereo_refresh_debounce(&self) -> Duration {
        Duration::from_millis(self.stereo_refresh_debounce_ms)
    }
}

/// SDP munging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdpConfig {
    /// Force Opus stereo on local descriptions
    pub enable_stereo: bool,
}

impl Default for SdpConfig {
    fn default() -> Self {
        Self { enable_stereo: true }
    }
}

impl AppConfig {
    /// Default location, e.g. `~/.config/rtc-audio-store/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "rtc", "rtc-audio-store").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Load from `path`, or from the default location when it exists.
    /// Falls back to defaults when no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "Loading configuration");
                Self::load_from(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}
