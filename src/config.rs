/// Client configuration
///
/// Read from a JSON file in the user's config directory:
/// - Linux: ~/.config/attendance-desk/config.json
/// - macOS: ~/Library/Application Support/attendance-desk/config.json
/// - Windows: %APPDATA%\attendance-desk\config.json
///
/// Every field has a default, so the file is optional.
/// `ATTENDANCE_API_BASE_URL` overrides the backend URL.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::state::poller::PollSettings;

pub const BASE_URL_ENV: &str = "ATTENDANCE_API_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend root, without the `/api` prefix
    pub api_base_url: String,
    pub poll_interval_secs: u64,
    /// Entries shown in the dashboard's recent-activity table
    pub recent_limit: usize,
    pub banner_clear_secs: u64,
    /// HTTP client timeout per request
    pub request_timeout_secs: u64,
    pub default_class_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            poll_interval_secs: 5,
            recent_limit: 5,
            banner_clear_secs: 3,
            request_timeout_secs: 30,
            default_class_name: crate::state::dispatcher::DEFAULT_CLASS_NAME.to_string(),
        }
    }
}

impl Config {
    /// Load from the default location, then apply the environment override
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::default_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_env_override(std::env::var(BASE_URL_ENV).ok());
        Ok(config)
    }

    /// Missing file means defaults; anything else unreadable is an error
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: Config = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("📁 Config loaded from {}", path.display());
        Ok(config)
    }

    /// Get the path where the config file should live
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
        path.push("attendance-desk");
        path.push("config.json");
        Some(path)
    }

    fn apply_env_override(&mut self, base_url: Option<String>) {
        if let Some(url) = base_url.filter(|url| !url.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            period: Duration::from_secs(self.poll_interval_secs.max(1)),
            limit: self.recent_limit,
        }
    }

    pub fn banner_clear(&self) -> Duration {
        Duration::from_secs(self.banner_clear_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
