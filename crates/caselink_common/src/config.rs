//! Client configuration
//!
//! Config file: $CASELINKER_CONFIG, else $XDG_CONFIG_HOME/caselinker/config.toml,
//! else ~/.config/caselinker/config.toml. A missing file means defaults.

use crate::error::CaseLinkError;
use crate::{Result, DEFAULT_BACKEND_URL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "CASELINKER_CONFIG";

/// Environment variable overriding `backend.url`
pub const BACKEND_ENV: &str = "CASELINKER_BACKEND";

const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Where the scan service lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Status polling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

/// Form defaults used before the service config has loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanDefaults {
    /// Scan budget sent with every start request
    #[serde(default = "default_duration_hours")]
    pub duration_hours: f64,

    #[serde(default = "default_threshold")]
    pub similarity_threshold: f64,

    #[serde(default = "default_year_window")]
    pub year_window: u32,
}

impl Default for ScanDefaults {
    fn default() -> Self {
        Self {
            duration_hours: default_duration_hours(),
            similarity_threshold: default_threshold(),
            year_window: default_year_window(),
        }
    }
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_duration_hours() -> f64 {
    0.02
}

fn default_threshold() -> f64 {
    0.7
}

fn default_year_window() -> u32 {
    5
}

/// Main client configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub scan: ScanDefaults,
}

impl ClientConfig {
    /// Resolve the config file path without checking that it exists
    pub fn discover_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        dirs::config_dir().map(|dir| dir.join("caselinker").join("config.toml"))
    }

    /// Load from an explicit path, or the discovered one, then apply env overrides
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit.map(Path::to_path_buf).or_else(Self::discover_path);

        let mut config = match path {
            Some(path) if path.exists() => Self::load_from(&path)?,
            Some(path) if explicit.is_some() => {
                return Err(CaseLinkError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            _ => Self::default(),
        };

        if let Ok(url) = std::env::var(BACKEND_ENV) {
            if !url.is_empty() {
                config.backend.url = url;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a config file without env overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)
            .map_err(|e| CaseLinkError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the config as TOML, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| CaseLinkError::Config(format!("serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend.url.trim().is_empty() {
            return Err(CaseLinkError::Config("backend.url is empty".into()));
        }
        if self.backend.timeout_secs == 0 {
            return Err(CaseLinkError::Config(
                "backend.timeout_secs must be at least 1".into(),
            ));
        }
        if self.poll.interval_ms < MIN_POLL_INTERVAL_MS {
            return Err(CaseLinkError::Config(format!(
                "poll.interval_ms must be at least {}",
                MIN_POLL_INTERVAL_MS
            )));
        }
        if !(0.0..=1.0).contains(&self.scan.similarity_threshold) {
            return Err(CaseLinkError::Config(
                "scan.similarity_threshold must be within [0, 1]".into(),
            ));
        }
        if self.scan.duration_hours.is_nan() || self.scan.duration_hours <= 0.0 {
            return Err(CaseLinkError::Config(
                "scan.duration_hours must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll.interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_panel_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.backend.url, "http://127.0.0.1:8000");
        assert_eq!(config.poll.interval_ms, 1000);
        assert_eq!(config.scan.duration_hours, 0.02);
        assert_eq!(config.scan.similarity_threshold, 0.7);
        assert_eq!(config.scan.year_window, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[poll]\ninterval_ms = 250\n").unwrap();

        let config = ClientConfig::load_from(&path).unwrap();
        assert_eq!(config.poll.interval_ms, 250);
        assert_eq!(config.backend, BackendConfig::default());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ClientConfig::default();
        config.backend.url = "http://scan.local:9000".into();
        config.scan.year_window = 3;
        config.save_to(&path).unwrap();

        assert_eq!(ClientConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[backend\nurl = 1").unwrap();

        let err = ClientConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, CaseLinkError::Config(_)));
    }

    #[test]
    fn explicit_missing_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(ClientConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn validation_rejects_fast_polling_and_bad_threshold() {
        let mut config = ClientConfig::default();
        config.poll.interval_ms = 10;
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.scan.similarity_threshold = 1.5;
        assert!(config.validate().is_err());
    }
}
