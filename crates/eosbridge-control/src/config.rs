//! Bridge configuration
//!
//! Values come from an optional TOML file, then environment variables take
//! precedence over the file:
//!
//! | variable        | field     | default         |
//! |-----------------|-----------|-----------------|
//! | `EOS_HOST`      | host      | `192.168.1.100` |
//! | `EOS_PORT`      | port      | `3032`          |
//! | `EOS_USER`      | user_id   | `1`             |
//! | `EOS_RX`        | enable_rx | `false`         |
//! | `EOS_RX_PORT`   | rx_port   | `3033`          |
//! | `EOS_LOG_LEVEL` | log.level | `info`          |

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::error::{ControlError, Result};
use crate::validate::validate_user_id;

pub const DEFAULT_HOST: &str = "192.168.1.100";
pub const DEFAULT_PORT: u16 = 3032;
pub const DEFAULT_USER_ID: u32 = 1;
pub const DEFAULT_RX_PORT: u16 = 3033;

/// Environment variable naming a config file
pub const CONFIG_PATH_VAR: &str = "EOS_CONFIG";

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `trace`, `debug`, `info`, `warn` or `error`
    pub level: String,
    /// Log to stderr
    pub console_output: bool,
    /// Also log to a file under `log_dir`
    pub file_output: bool,
    pub log_dir: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: false,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl LogConfig {
    /// Parsed level, INFO if unrecognised
    pub fn parse_level(&self) -> LevelFilter {
        LevelFilter::from_str(self.level.trim()).unwrap_or(LevelFilter::INFO)
    }

    pub fn ensure_log_directory(&self) -> std::io::Result<()> {
        if self.file_output {
            std::fs::create_dir_all(&self.log_dir)?;
        }
        Ok(())
    }

    /// One file per day
    pub fn current_log_path(&self) -> PathBuf {
        let date = chrono::Local::now().format("%Y-%m-%d");
        self.log_dir.join(format!("eosbridge_{}.log", date))
    }
}

/// Console connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EosConfig {
    pub host: String,
    pub port: u16,
    pub user_id: u32,
    /// Listen for console feedback
    pub enable_rx: bool,
    pub rx_port: u16,
    pub log: LogConfig,
}

impl Default for EosConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user_id: DEFAULT_USER_ID,
            enable_rx: false,
            rx_port: DEFAULT_RX_PORT,
            log: LogConfig::default(),
        }
    }
}

fn invalid_value(name: &str, value: &str) -> ControlError {
    ControlError::Config(format!("Invalid value for {}: {:?}", name, value))
}

fn file_error(action: &str, path: &Path, err: impl std::fmt::Display) -> ControlError {
    ControlError::Config(format!("Failed to {} {}: {}", action, path.display(), err))
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| invalid_value(name, value))
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(invalid_value(name, value)),
    }
}

impl EosConfig {
    /// Load a TOML file; missing keys take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| file_error("read", path, e))?;
        toml::from_str(&content).map_err(|e| file_error("parse", path, e))
    }

    /// File (if any) plus process environment, validated
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `EOS_*` overrides from `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("EOS_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("EOS_PORT") {
            self.port = parse_env("EOS_PORT", &port)?;
        }
        if let Some(user) = lookup("EOS_USER") {
            self.user_id = parse_env("EOS_USER", &user)?;
        }
        if let Some(rx) = lookup("EOS_RX") {
            self.enable_rx = parse_flag("EOS_RX", &rx)?;
        }
        if let Some(rx_port) = lookup("EOS_RX_PORT") {
            self.rx_port = parse_env("EOS_RX_PORT", &rx_port)?;
        }
        if let Some(level) = lookup("EOS_LOG_LEVEL") {
            self.log.level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        validate_user_id(i64::from(self.user_id))?;
        if self.port == 0 {
            return Err(ControlError::Config("port must not be 0".to_string()));
        }
        if self.enable_rx && self.rx_port == 0 {
            return Err(ControlError::Config("rx_port must not be 0".to_string()));
        }
        if self.host.trim().is_empty() {
            return Err(ControlError::Config("host must not be empty".to_string()));
        }
        Ok(())
    }
}
