//! Runtime configuration.
//!
//! # Responsibility
//! - Provide defaults for storage location, logging and sync endpoints.
//! - Load overrides from an optional JSON file and the environment.
//!
//! # Invariants
//! - A config returned by `load` has passed `validate`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding `db_path`.
pub const DB_PATH_ENV: &str = "QUOTEBOOK_DB_PATH";

const APP_DIR_NAME: &str = "quotebook";
const DB_FILE_NAME: &str = "quotebook.sqlite3";

/// Per-user data location, or the working directory when none is known.
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join(DB_FILE_NAME)
}

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid configuration: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotebookConfig {
    /// SQLite file holding durable state.
    pub db_path: PathBuf,
    /// One of `trace|debug|info|warn|error`; `None` uses the build default.
    pub log_level: Option<String>,
    /// Absolute log directory; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    pub sync: SyncConfig,
}

/// Remote sync settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Resource fetched each cycle; must return an object with `title`.
    pub fetch_url: String,
    /// Collection the merged quote is mirrored to.
    pub post_url: String,
    pub interval_secs: u64,
    /// How long a status notice stays visible.
    pub notice_ttl_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for QuotebookConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: None,
            log_dir: None,
            sync: SyncConfig::default(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fetch_url: "https://jsonplaceholder.typicode.com/posts/1".to_string(),
            post_url: "https://jsonplaceholder.typicode.com/posts".to_string(),
            interval_secs: 15,
            notice_ttl_secs: 3,
            request_timeout_secs: 10,
        }
    }
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_secs(self.notice_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl QuotebookConfig {
    /// Builds the effective config: defaults, then `path` (if any), then env.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file; missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var(DB_PATH_ENV) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                self.db_path = PathBuf::from(trimmed);
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("db_path cannot be empty".to_string()));
        }
        if self.sync.fetch_url.trim().is_empty() || self.sync.post_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "sync.fetch_url and sync.post_url cannot be empty".to_string(),
            ));
        }
        if self.sync.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "sync.interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.sync.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "sync.request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{default_db_path, ConfigError, QuotebookConfig};
    use std::io::Write;

    #[test]
    fn defaults_sync_every_fifteen_seconds() {
        let config = QuotebookConfig::default();
        assert_eq!(config.sync.interval_secs, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn file_overrides_only_given_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"sync": {{"interval_secs": 60}}}}"#).unwrap();

        let config = QuotebookConfig::from_file(file.path()).unwrap();
        assert_eq!(config.sync.interval_secs, 60);
        assert_eq!(config.sync.notice_ttl_secs, 3);
        assert_eq!(config.db_path, QuotebookConfig::default().db_path);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = QuotebookConfig::default();
        config.sync.interval_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn zero_request_timeout_is_rejected() {
        let mut config = QuotebookConfig::default();
        config.sync.request_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn default_db_lives_in_app_directory() {
        let path = default_db_path();
        assert!(path.ends_with("quotebook/quotebook.sqlite3"));
        assert_eq!(QuotebookConfig::default().db_path, path);
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = QuotebookConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
