//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `homewatch.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// Accepted range for the scheduler period, in milliseconds.
const TICK_INTERVAL_RANGE_MS: std::ops::RangeInclusive<u64> = 100..=60_000;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where channels and logs are persisted.
    pub storage: StorageConfig,
    /// Polling cadence.
    pub scheduler: SchedulerConfig,
    /// Which controllers run.
    pub devices: DevicesConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Storage backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// One text file per channel in `data_dir`.
    #[default]
    File,
    /// `SQLite` database at `database_url`.
    Sqlite,
    /// Process memory; nothing survives a restart.
    Memory,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::Validation(format!(
                "unknown storage backend {other:?} (expected file, sqlite or memory)"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: Backend,
    /// Directory of the `file` backend.
    pub data_dir: PathBuf,
    /// `SQLite` connection URL of the `sqlite` backend.
    pub database_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Time between two scheduling rounds.
    pub tick_interval_ms: u64,
}

/// Per-device toggles.
#[derive(Debug, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct DevicesConfig {
    pub lock: bool,
    pub doorbell: bool,
    pub fire_alarm: bool,
    pub thermostat: bool,
    pub plug: bool,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `homewatch.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("homewatch.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(
        &mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = var("HOMEWATCH_STORAGE") {
            self.storage.backend = val.parse()?;
        }
        if let Some(val) = var("HOMEWATCH_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(val);
        }
        if let Some(val) = var("HOMEWATCH_DATABASE_URL") {
            self.storage.database_url = val;
        }
        if let Some(val) = var("HOMEWATCH_TICK_MS") {
            self.scheduler.tick_interval_ms = val.trim().parse().map_err(|_| {
                ConfigError::Validation(format!("HOMEWATCH_TICK_MS is not a number: {val:?}"))
            })?;
        }
        if let Some(val) = var("HOMEWATCH_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !TICK_INTERVAL_RANGE_MS.contains(&self.scheduler.tick_interval_ms) {
            return Err(ConfigError::Validation(format!(
                "tick_interval_ms must be between {} and {}",
                TICK_INTERVAL_RANGE_MS.start(),
                TICK_INTERVAL_RANGE_MS.end()
            )));
        }
        if self.storage.backend == Backend::Sqlite && self.storage.database_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "sqlite backend requires a database_url".to_string(),
            ));
        }
        if self.storage.backend == Backend::File && self.storage.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "file backend requires a data_dir".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the scheduler period.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.scheduler.tick_interval_ms)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            data_dir: PathBuf::from("data"),
            database_url: "sqlite:homewatch.db?mode=rwc".to_string(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 500,
        }
    }
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            lock: true,
            doorbell: true,
            fire_alarm: true,
            thermostat: true,
            plug: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "homewatchd=info,homewatch_app=info,homewatch_adapter_storage_file=info,homewatch_adapter_storage_sqlite_sqlx=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
