//! Configuration for the log-fail session.
//!
//! [`LogFailConfigBuilder`] provides a small, type-safe API for the guard
//! threshold, the root logger level, and whether capture handlers are
//! cleaned up after each test. Values may also come from the environment
//! (`LOGFAIL_MIN_LEVEL`, `LOGFAIL_ROOT_LEVEL`) or from the `[logfail]`
//! section of an INI file.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use crate::level::{Level, LevelParseError};

pub const ENV_MIN_LEVEL: &str = "LOGFAIL_MIN_LEVEL";
pub const ENV_ROOT_LEVEL: &str = "LOGFAIL_ROOT_LEVEL";
pub const INI_SECTION: &str = "logfail";

/// Errors that may occur while building a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid level for {key}: {source}")]
    InvalidLevel {
        key: String,
        #[source]
        source: LevelParseError,
    },
    #[error("invalid boolean for {key}: {value:?}")]
    InvalidFlag { key: String, value: String },
    /// The root logger would drop records the guard is meant to see.
    #[error("root level {root_level} hides records at the guard threshold {min_level}")]
    RootLevelHidesThreshold { root_level: Level, min_level: Level },
    #[error("unknown key {0:?} in [logfail] section")]
    UnknownKey(String),
    #[error("failed to load {path}: {source}")]
    Ini {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },
}

/// Validated configuration consumed by [`LogFailSession`].
///
/// [`LogFailSession`]: crate::session::LogFailSession
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogFailConfig {
    min_level: Level,
    root_level: Level,
    cleanup_capture: bool,
}

impl Default for LogFailConfig {
    fn default() -> Self {
        Self {
            min_level: Level::Warn,
            root_level: Level::Trace,
            cleanup_capture: true,
        }
    }
}

impl LogFailConfig {
    pub fn builder() -> LogFailConfigBuilder {
        LogFailConfigBuilder::new()
    }

    /// Lowest level that fails a test when not expected.
    pub fn min_level(&self) -> Level {
        self.min_level
    }

    /// Level installed on the root logger of the hierarchy.
    pub fn root_level(&self) -> Level {
        self.root_level
    }

    /// Whether per-test cleanup detaches capture handlers.
    pub fn cleanup_capture(&self) -> bool {
        self.cleanup_capture
    }

    /// Build from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut builder = LogFailConfigBuilder::new();
        if let Some(value) = lookup(ENV_MIN_LEVEL) {
            builder = builder.with_min_level(parse_level(ENV_MIN_LEVEL, &value)?);
        }
        if let Some(value) = lookup(ENV_ROOT_LEVEL) {
            builder = builder.with_root_level(parse_level(ENV_ROOT_LEVEL, &value)?);
        }
        builder.build()
    }

    /// Build from the `[logfail]` section of an INI file.
    ///
    /// A file without the section yields the defaults.
    pub fn from_ini_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Ini {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini(&ini)
    }

    /// Build from INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|err| ConfigError::Ini {
            path: PathBuf::from("<string>"),
            source: ini::Error::Parse(err),
        })?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let Some(section) = ini.section(Some(INI_SECTION)) else {
            return Ok(Self::default());
        };
        section
            .iter()
            .try_fold(LogFailConfigBuilder::new(), |builder, (key, value)| {
                builder.with_entry(key, value)
            })?
            .build()
    }
}

fn parse_level(key: &str, value: &str) -> Result<Level, ConfigError> {
    value.parse().map_err(|source| ConfigError::InvalidLevel {
        key: key.to_owned(),
        source,
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            key: key.to_owned(),
            value: value.to_owned(),
        }),
    }
}

/// Builder for [`LogFailConfig`].
#[derive(Clone, Debug, Default)]
pub struct LogFailConfigBuilder {
    min_level: Option<Level>,
    root_level: Option<Level>,
    cleanup_capture: Option<bool>,
}

impl LogFailConfigBuilder {
    /// Create a new `LogFailConfigBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the guard threshold.
    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = Some(level);
        self
    }

    /// Set the root logger level.
    pub fn with_root_level(mut self, level: Level) -> Self {
        self.root_level = Some(level);
        self
    }

    /// Enable or disable per-test capture cleanup.
    pub fn with_capture_cleanup(mut self, enabled: bool) -> Self {
        self.cleanup_capture = Some(enabled);
        self
    }

    /// Apply a textual `key = value` entry.
    pub fn with_entry(self, key: &str, value: &str) -> Result<Self, ConfigError> {
        match key.trim() {
            "min_level" => Ok(self.with_min_level(parse_level(key, value)?)),
            "root_level" => Ok(self.with_root_level(parse_level(key, value)?)),
            "cleanup_capture" => Ok(self.with_capture_cleanup(parse_flag(key, value)?)),
            other => Err(ConfigError::UnknownKey(other.to_owned())),
        }
    }

    /// Validate and build the configuration.
    pub fn build(&self) -> Result<LogFailConfig, ConfigError> {
        let defaults = LogFailConfig::default();
        let config = LogFailConfig {
            min_level: self.min_level.unwrap_or(defaults.min_level),
            root_level: self.root_level.unwrap_or(defaults.root_level),
            cleanup_capture: self.cleanup_capture.unwrap_or(defaults.cleanup_capture),
        };
        if config.root_level > config.min_level {
            return Err(ConfigError::RootLevelHidesThreshold {
                root_level: config.root_level,
                min_level: config.min_level,
            });
        }
        Ok(config)
    }
}
