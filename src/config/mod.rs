//! Configuration management for nuztap.
//!
//! Configuration is read from `~/.config/nuztap/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::age::DisplayZone;
use crate::queue::DEFAULT_QUEUE_CAPACITY;
use crate::worker::DEFAULT_WORKERS;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file. Defaults to `<data dir>/nuztap/nuztap.db`.
    pub database_path: Option<PathBuf>,
    pub fetch: FetchConfig,
    pub worker: WorkerConfig,
    pub display: DisplayConfig,
}

/// How the external fetch program is launched.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub program: String,
    /// Arguments placed before `<owner> <token> <secret>`.
    pub args: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            program: "python".to_string(),
            args: vec!["bin/harvest.py".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub workers: usize,
    pub queue_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// IANA zone name for absolute dates, e.g. "America/Chicago".
    pub timezone: Option<String>,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/nuztap/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("nuztap").join("config.toml"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch.program.trim().is_empty() {
            return Err(ConfigError::Invalid("fetch.program is empty".into()));
        }
        if self.worker.workers == 0 {
            return Err(ConfigError::Invalid("worker.workers must be at least 1".into()));
        }
        if self.worker.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "worker.queue_capacity must be at least 1".into(),
            ));
        }
        self.display_zone()?;
        Ok(())
    }

    pub fn display_zone(&self) -> Result<DisplayZone, ConfigError> {
        DisplayZone::from_name(self.display.timezone.as_deref())
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> String {
        r##"# nuztap configuration

# SQLite database shared with the fetch program.
# database_path = "/var/lib/nuztap/nuztap.db"

[fetch]
# The fetch program is run as: program [args...] <owner> <token> <secret>
# and receives the database path in the NUZTAP_DB environment variable.
program = "python"
args = ["bin/harvest.py"]

[worker]
# Number of fetch processes allowed to run at once
workers = 4

# Refresh requests beyond this many waiting jobs are rejected
queue_capacity = 100

[display]
# Time zone for dates older than a day (default: system local time)
# timezone = "America/Chicago"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
