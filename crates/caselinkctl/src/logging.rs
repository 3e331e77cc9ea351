//! Logging for caselinkctl
//!
//! One-shot commands log to stderr so stdout stays scriptable. The TUI owns
//! the terminal, so it logs to a file found with this fallback chain:
//! 1. $CASELINKCTL_LOG_FILE (explicit override)
//! 2. $XDG_STATE_HOME/caselinker/caselinkctl.log
//! 3. ~/.local/state/caselinker/caselinkctl.log

use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Filter directives, e.g. `CASELINKER_LOG=caselink_common=debug`
pub const LOG_ENV: &str = "CASELINKER_LOG";

const LOG_FILE_ENV: &str = "CASELINKCTL_LOG_FILE";

/// Where log lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File,
}

/// Install the global subscriber; returns the log file path for `File`.
pub fn init(target: LogTarget) -> Result<Option<PathBuf>> {
    match target {
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter("warn"))
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init()
                .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))?;
            Ok(None)
        }
        LogTarget::File => {
            let path = discover_log_path().context("Cannot determine a log file location")?;
            let file = open_log_file(&path)?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter("info"))
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
                .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))?;
            tracing::info!(
                "caselinkctl v{} logging to {}",
                env!("CASELINKER_VERSION"),
                path.display()
            );
            Ok(Some(path))
        }
    }
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Discover log file path with fallback chain
fn discover_log_path() -> Option<PathBuf> {
    log_path_from(
        std::env::var(LOG_FILE_ENV).ok(),
        std::env::var("XDG_STATE_HOME").ok(),
        std::env::var("HOME").ok(),
    )
}

fn log_path_from(
    explicit: Option<String>,
    xdg_state: Option<String>,
    home: Option<String>,
) -> Option<PathBuf> {
    if let Some(path) = explicit.filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }

    if let Some(state) = xdg_state.filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(state).join("caselinker/caselinkctl.log"));
    }

    home.filter(|p| !p.is_empty())
        .map(|home| PathBuf::from(home).join(".local/state/caselinker/caselinkctl.log"))
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn explicit_override_wins() {
        let path = log_path_from(
            Some("/tmp/panel.log".into()),
            Some("/state".into()),
            Some("/home/op".into()),
        );
        assert_eq!(path, Some(PathBuf::from("/tmp/panel.log")));
    }

    #[test]
    fn xdg_state_then_home_fallback() {
        assert_eq!(
            log_path_from(None, Some("/state".into()), Some("/home/op".into())),
            Some(PathBuf::from("/state/caselinker/caselinkctl.log"))
        );
        assert_eq!(
            log_path_from(None, Some(String::new()), Some("/home/op".into())),
            Some(PathBuf::from("/home/op/.local/state/caselinker/caselinkctl.log"))
        );
        assert_eq!(log_path_from(None, None, None), None);
    }

    #[test]
    fn log_file_parent_is_created() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a/b/caselinkctl.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }
}
