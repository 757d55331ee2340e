//! Runtime configuration read from the environment.
//!
//! | Variable           | Meaning                                   | Default            |
//! |--------------------|-------------------------------------------|--------------------|
//! | `COMICS_DB_PATH`   | SQLite file backing both collections      | in-memory database |
//! | `COMICS_LOG_LEVEL` | `trace\|debug\|info\|warn\|error`         | by build mode      |
//! | `COMICS_LOG_DIR`   | absolute directory for rolling log files  | logging disabled   |

use crate::logging::{default_log_level, LogLevel, LoggingError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "COMICS_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "COMICS_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "COMICS_LOG_DIR";

/// Configuration failure.
#[derive(Debug)]
pub enum ConfigError {
    InvalidLogLevel(LoggingError),
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(err) => write!(f, "{LOG_LEVEL_VAR}: {err}"),
            Self::RelativeLogDir(dir) => write!(
                f,
                "{LOG_DIR_VAR} must be an absolute path, got `{}`",
                dir.display()
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidLogLevel(err) => Some(err),
            Self::RelativeLogDir(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// `None` opens an in-memory database.
    pub db_path: Option<PathBuf>,
    pub log_level: LogLevel,
    /// `None` leaves logging uninitialized.
    pub log_dir: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl CatalogConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let log_level = match read(LOG_LEVEL_VAR) {
            Some(value) => value.parse().map_err(ConfigError::InvalidLogLevel)?,
            None => default_log_level(),
        };

        let log_dir = read(LOG_DIR_VAR).map(PathBuf::from);
        if let Some(dir) = &log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.clone()));
            }
        }

        Ok(Self {
            db_path: read(DB_PATH_VAR).map(PathBuf::from),
            log_level,
            log_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogConfig, ConfigError, DB_PATH_VAR, LOG_DIR_VAR, LOG_LEVEL_VAR};
    use crate::logging::{default_log_level, LogLevel};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| values.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = CatalogConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CatalogConfig::default());
        assert_eq!(config.log_level, default_log_level());
    }

    #[test]
    fn reads_all_variables() {
        let config = CatalogConfig::from_lookup(lookup(&[
            (DB_PATH_VAR, "/var/lib/comics/catalog.db"),
            (LOG_LEVEL_VAR, "WARN"),
            (LOG_DIR_VAR, "/var/log/comics"),
        ]))
        .unwrap();
        assert_eq!(
            config.db_path,
            Some(PathBuf::from("/var/lib/comics/catalog.db"))
        );
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/comics")));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = CatalogConfig::from_lookup(lookup(&[(DB_PATH_VAR, "  ")])).unwrap();
        assert_eq!(config.db_path, None);
    }

    #[test]
    fn rejects_bad_level_and_relative_log_dir() {
        assert!(matches!(
            CatalogConfig::from_lookup(lookup(&[(LOG_LEVEL_VAR, "loud")])),
            Err(ConfigError::InvalidLogLevel(_))
        ));
        assert!(matches!(
            CatalogConfig::from_lookup(lookup(&[(LOG_DIR_VAR, "logs")])),
            Err(ConfigError::RelativeLogDir(_))
        ));
    }
}
