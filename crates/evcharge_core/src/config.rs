//! Application configuration loading.
//!
//! # Responsibility
//! - Read the optional TOML config file.
//! - Fill unset fields from environment variables, then from defaults.
//!
//! # Invariants
//! - Precedence per field: file value, environment variable, default.
//! - A missing config file is not an error; a malformed one is.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "EVCHARGE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "EVCHARGE_LOG_LEVEL";
pub const ENV_LOG_FILE: &str = "EVCHARGE_LOG_FILE";
pub const ENV_EXPORT_DIR: &str = "EVCHARGE_EXPORT_DIR";

const DEFAULT_DB_PATH: &str = "evcharge.db";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_LOG_FILE: &str = "logs/evcharge.log";
const DEFAULT_EXPORT_DIR: &str = "exports";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    database: RawDatabase,
    #[serde(default)]
    logging: RawLogging,
    #[serde(default)]
    export: RawExport,
}

#[derive(Debug, Default, Deserialize)]
struct RawDatabase {
    path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLogging {
    level: Option<String>,
    file: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawExport {
    dir: Option<String>,
}

impl AppConfig {
    /// Loads configuration from `path` merged with the process environment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Loads configuration using `env` to resolve environment variables.
    pub fn load_with_env(
        path: impl AsRef<Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::from_raw(RawConfig::default(), &env));
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_raw(raw, &env))
    }

    fn from_raw(raw: RawConfig, env: &impl Fn(&str) -> Option<String>) -> Self {
        let resolve = |value: Option<String>, key: &str, default: &str| {
            value
                .filter(|v| !v.trim().is_empty())
                .or_else(|| env(key).filter(|v| !v.trim().is_empty()))
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            database: DatabaseConfig {
                path: resolve(raw.database.path, ENV_DB_PATH, DEFAULT_DB_PATH).into(),
            },
            logging: LoggingConfig {
                level: resolve(raw.logging.level, ENV_LOG_LEVEL, DEFAULT_LOG_LEVEL),
                file: resolve(raw.logging.file, ENV_LOG_FILE, DEFAULT_LOG_FILE).into(),
            },
            export: ExportConfig {
                dir: resolve(raw.export.dir, ENV_EXPORT_DIR, DEFAULT_EXPORT_DIR).into(),
            },
        }
    }
}
