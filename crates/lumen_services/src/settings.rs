//! Settings management

use std::io;
use std::path::{Path, PathBuf};

use lumen_core::components::MAX_IRRADIANCE_PROBE_COUNT;
use lumen_core::dod::DEFAULT_PARALLEL_SORT_THRESHOLD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse settings file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Engine settings
///
/// Every section and field is optional in the file; missing ones take the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub probes: ProbeSettings,
    pub logging: LoggingSettings,
    pub runtime: RuntimeSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    /// Fixed slot count of the irradiance probe store.
    pub capacity: usize,
    /// Sorts at least this long run on the rayon pool.
    pub sort_parallel_threshold: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive, used when `RUST_LOG` is unset.
    pub filter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub frames: u32,
    /// Probes destroyed and re-created each frame.
    pub churn_per_frame: u32,
    pub seed: u64,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            capacity: MAX_IRRADIANCE_PROBE_COUNT,
            sort_parallel_threshold: DEFAULT_PARALLEL_SORT_THRESHOLD,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
        }
    }
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            frames: 120,
            churn_per_frame: 8,
            seed: 0x1badb002,
        }
    }
}

impl Settings {
    pub fn from_json(path: &Path, text: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(text).map_err(|source| SettingsError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(path, &text)
    }

    /// Like [`Settings::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, SettingsError> {
        match Self::load(path) {
            Err(SettingsError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no settings file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }
}
