use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_keepalive() -> u64 {
    60
}

fn default_progress_interval() -> u64 {
    500
}

/// Client settings stored in settings.toml
///
/// Every field is optional in the file. Timeouts are unset by default so the
/// transport's own defaults apply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientSettings {
    #[serde(default)]
    pub connection_timeout_secs: Option<u64>,
    #[serde(default)]
    pub inactivity_timeout_secs: Option<u64>,
    /// Zero disables keepalives
    #[serde(default = "default_keepalive")]
    pub keepalive_interval_secs: u64,
    /// Minimum time between two progress reports for one file
    #[serde(default = "default_progress_interval")]
    pub progress_interval_ms: u64,
    /// Private key used when a caller does not pass one
    #[serde(default)]
    pub identity_file: Option<PathBuf>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connection_timeout_secs: None,
            inactivity_timeout_secs: None,
            keepalive_interval_secs: default_keepalive(),
            progress_interval_ms: default_progress_interval(),
            identity_file: None,
        }
    }
}

impl ClientSettings {
    /// Load from the default settings file, falling back to defaults when it
    /// does not exist
    pub fn load() -> Result<Self, ConfigError> {
        match super::paths::settings_file() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from an explicit path, falling back to defaults when it does not
    /// exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(ConfigError::Parse)
    }

    pub fn connection_timeout(&self) -> Option<Duration> {
        self.connection_timeout_secs.map(Duration::from_secs)
    }

    pub fn inactivity_timeout(&self) -> Option<Duration> {
        self.inactivity_timeout_secs.map(Duration::from_secs)
    }

    pub fn keepalive_interval(&self) -> Option<Duration> {
        if self.keepalive_interval_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.keepalive_interval_secs))
        }
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}
