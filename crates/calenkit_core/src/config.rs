//! Runtime configuration for hosts embedding the calendar core.
//!
//! # Responsibility
//! - Collect database, logging and invitation settings in one struct.
//! - Load from environment variables with logged fallbacks.
//!
//! # Invariants
//! - Every field has a usable default; loading never fails.
//! - `invite_base_url` never ends with `/`.

use log::warn;
use serde::Deserialize;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "CALENKIT_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "CALENKIT_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CALENKIT_LOG_DIR";
pub const ENV_INVITE_BASE_URL: &str = "CALENKIT_INVITE_BASE_URL";

const DEFAULT_DB_FILE_NAME: &str = "calenkit.sqlite3";
const DEFAULT_INVITE_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    /// Origin used to build share invitation links.
    pub invite_base_url: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: crate::logging::default_log_level().to_string(),
            log_dir: None,
            invite_base_url: DEFAULT_INVITE_BASE_URL.to_string(),
        }
    }
}

impl CoreConfig {
    /// Builds a config from `CALENKIT_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let value_of = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = value_of(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);
        let log_level = value_of(ENV_LOG_LEVEL).unwrap_or(defaults.log_level);
        let log_dir = value_of(ENV_LOG_DIR).map(PathBuf::from);

        let invite_base_url = match value_of(ENV_INVITE_BASE_URL) {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => url,
            Some(url) => {
                warn!(
                    "event=config_load module=config status=fallback key={} value={} default={}",
                    ENV_INVITE_BASE_URL, url, defaults.invite_base_url
                );
                defaults.invite_base_url
            }
            None => defaults.invite_base_url,
        };

        Self {
            db_path,
            log_level,
            log_dir,
            invite_base_url,
        }
        .normalized()
    }

    /// Returns the invitation origin without a trailing slash.
    pub fn invite_base_url(&self) -> &str {
        self.invite_base_url.trim_end_matches('/')
    }

    fn normalized(mut self) -> Self {
        self.invite_base_url = self.invite_base_url().to_string();
        self
    }
}
