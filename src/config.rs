//! Hostpilot Configuration Module
//!
//! Config is stored in `~/.config/hostpilot/config.toml`.
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. Environment variables (`HOSTPILOT_SHELL`, `HOSTPILOT_MONITORING_URL`, `HOSTPILOT_CATALOG`)
//! 2. Config file (`~/.config/hostpilot/config.toml`)
//! 3. Defaults

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{HostpilotError, Result};

pub const DEFAULT_SHELL: &str = "sh";
pub const DEFAULT_MONITORING_URL: &str = "http://127.0.0.1:9300";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Interpreter used to run every command (`<shell> -c <invocation>`)
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Persistent command log
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// Optional catalog override (built-in catalog when absent)
    #[serde(default)]
    pub catalog: Option<PathBuf>,

    #[serde(default)]
    pub monitoring: MonitoringConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

/// Monitoring API settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitoringConfig {
    #[serde(default = "default_monitoring_url")]
    pub url: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Terminal UI settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiConfig {
    /// Spinner/refresh tick
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
}

fn default_shell() -> String {
    DEFAULT_SHELL.to_string()
}

fn default_log_file() -> PathBuf {
    AppConfig::data_dir().join("commands.log")
}

fn default_monitoring_url() -> String {
    DEFAULT_MONITORING_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    1500
}

fn default_tick_rate_ms() -> u64 {
    100
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            log_file: default_log_file(),
            catalog: None,
            monitoring: MonitoringConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            url: default_monitoring_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate_ms(),
        }
    }
}

impl MonitoringConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl UiConfig {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(10))
    }
}

impl AppConfig {
    /// Get the config directory path
    ///
    /// Returns `~/.config/hostpilot/` on Unix, `%APPDATA%/hostpilot/` on Windows
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hostpilot")
    }

    /// Directory for the command log and the diagnostics log
    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hostpilot")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from file
    ///
    /// Returns default config if file doesn't exist.
    /// Returns error if file exists but is malformed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| HostpilotError::ConfigError {
            reason: format!("Failed to read config file: {}", e),
        })?;

        toml::from_str(&content).map_err(|e| HostpilotError::ConfigError {
            reason: format!("Failed to parse config file: {}", e),
        })
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to file
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| HostpilotError::ConfigError {
                    reason: format!("Failed to create config directory: {}", e),
                })?;
            }
        }

        let content = toml::to_string_pretty(self).map_err(|e| HostpilotError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| HostpilotError::ConfigError {
            reason: format!("Failed to write config file: {}", e),
        })?;

        Ok(())
    }

    /// Merge with environment variables
    ///
    /// Environment variables take precedence over config file values.
    pub fn with_env(self) -> Self {
        self.with_vars(|name| std::env::var(name).ok())
    }

    /// Merge using an arbitrary variable lookup (testable without touching the process env)
    pub fn with_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(shell) = non_empty("HOSTPILOT_SHELL") {
            self.shell = shell;
        }
        if let Some(url) = non_empty("HOSTPILOT_MONITORING_URL") {
            self.monitoring.url = url;
        }
        if let Some(catalog) = non_empty("HOSTPILOT_CATALOG") {
            self.catalog = Some(PathBuf::from(catalog));
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.shell, "sh");
        assert_eq!(config.monitoring.url, DEFAULT_MONITORING_URL);
        assert_eq!(config.monitoring.timeout(), Duration::from_millis(1500));
        assert!(config.catalog.is_none());
        assert!(config.log_file.ends_with("commands.log"));
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.shell = "bash".to_string();
        config.monitoring.url = "http://10.0.0.5:9300".to_string();
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "shell = \"zsh\"\n[monitoring]\ntimeout_ms = 200\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.shell, "zsh");
        assert_eq!(config.monitoring.timeout_ms, 200);
        assert_eq!(config.monitoring.url, DEFAULT_MONITORING_URL);
        assert_eq!(config.ui.tick_rate_ms, 100);
    }

    #[test]
    fn test_malformed_file_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "shell = [unterminated").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert_eq!(err.code(), "HP-001");
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::default().with_vars(|name| match name {
            "HOSTPILOT_SHELL" => Some("bash".to_string()),
            "HOSTPILOT_MONITORING_URL" => Some("   ".to_string()),
            "HOSTPILOT_CATALOG" => Some("/etc/hostpilot/catalog.yaml".to_string()),
            _ => None,
        });
        assert_eq!(config.shell, "bash");
        assert_eq!(config.monitoring.url, DEFAULT_MONITORING_URL);
        assert_eq!(
            config.catalog,
            Some(PathBuf::from("/etc/hostpilot/catalog.yaml"))
        );
    }
}
