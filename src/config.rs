//! ldb configuration
//!
//! Read from a JSON file, then overridden from environment variables:
//! - LDB_CONFIG: Path of the JSON file (default: /etc/ldb.json)
//! - LDB_DB_PATH: SQLite database file
//! - LDB_DB_BUSY_TIMEOUT_MS: How long to wait on a locked database
//! - LDB_CACHE_HOST / LDB_CACHE_PORT: Redis server
//! - LDB_CACHE_ENABLED: Enable/disable caching (true/false)
//! - LDB_CACHE_TIMEOUT_MS: Redis connect/read/write timeout
//! - LDB_DEFAULT_TTL: TTL in seconds for cached reads that give none
//! - LDB_CACHE_WRITE_POLICY: strict or best-effort

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{LdbError, Result};
use crate::query::{parse_ttl, CacheWritePolicy, DEFAULT_TTL_SECS};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/ldb.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct LdbConfig {
    pub db_path: PathBuf,
    pub db_busy_timeout_ms: u64,
    pub cache_host: String,
    pub cache_port: u16,
    pub cache_enabled: bool,
    pub cache_timeout_ms: u64,
    pub default_ttl_secs: i32,
    pub cache_write_policy: CacheWritePolicy,
}

impl Default for LdbConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("ldb.sqlite3"),
            db_busy_timeout_ms: 5000,
            cache_host: "127.0.0.1".to_string(),
            cache_port: 6379,
            cache_enabled: true,
            cache_timeout_ms: 1000,
            default_ttl_secs: DEFAULT_TTL_SECS,
            cache_write_policy: CacheWritePolicy::Strict,
        }
    }
}

impl LdbConfig {
    /// Load `.env`, the JSON file, then environment overrides.
    ///
    /// A missing file at the default path is fine; a missing file that was
    /// asked for explicitly through `LDB_CONFIG` is an error.
    pub fn load() -> Result<Self> {
        if env::var("NO_DOTENV").is_err() {
            dotenvy::dotenv().ok();
        }

        let config = match env::var("LDB_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH)?,
            Err(_) => Self::default(),
        };
        let config = config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            LdbError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_json_str(&text)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| LdbError::Config(format!("invalid configuration JSON: {}", e)))
    }

    /// Apply `LDB_*` environment overrides on top of `self`.
    pub fn apply_env(mut self) -> Result<Self> {
        if let Ok(path) = env::var("LDB_DB_PATH") {
            self.db_path = PathBuf::from(path);
        }

        if let Ok(ms) = env::var("LDB_DB_BUSY_TIMEOUT_MS") {
            self.db_busy_timeout_ms = parse_env("LDB_DB_BUSY_TIMEOUT_MS", &ms)?;
        }

        if let Ok(host) = env::var("LDB_CACHE_HOST") {
            self.cache_host = host;
        }

        if let Ok(port) = env::var("LDB_CACHE_PORT") {
            self.cache_port = parse_env("LDB_CACHE_PORT", &port)?;
        }

        if let Ok(enabled) = env::var("LDB_CACHE_ENABLED") {
            self.cache_enabled = enabled.to_lowercase() == "true";
        }

        if let Ok(ms) = env::var("LDB_CACHE_TIMEOUT_MS") {
            self.cache_timeout_ms = parse_env("LDB_CACHE_TIMEOUT_MS", &ms)?;
        }

        if let Ok(ttl) = env::var("LDB_DEFAULT_TTL") {
            self.default_ttl_secs = parse_ttl(&ttl)?;
        }

        if let Ok(policy) = env::var("LDB_CACHE_WRITE_POLICY") {
            self.cache_write_policy = policy.parse().map_err(LdbError::Config)?;
        }

        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.db_path.as_os_str().is_empty() {
            return Err(LdbError::Config("DbPath must not be empty".to_string()));
        }
        if self.cache_enabled && self.cache_host.trim().is_empty() {
            return Err(LdbError::Config("CacheHost must be set when caching is enabled".to_string()));
        }
        if self.cache_timeout_ms == 0 {
            return Err(LdbError::Config("CacheTimeoutMs must be greater than 0".to_string()));
        }
        Ok(())
    }

    pub fn cache_url(&self) -> String {
        format!("redis://{}:{}/", self.cache_host, self.cache_port)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e: T::Err| LdbError::Config(format!("{} must be a valid number: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = LdbConfig::default();
        assert_eq!(config.default_ttl_secs, 3600);
        assert_eq!(config.cache_write_policy, CacheWritePolicy::Strict);
        assert_eq!(config.cache_url(), "redis://127.0.0.1:6379/");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = LdbConfig::from_json_str(
            r#"{"DbPath": "/var/lib/ldb/app.db", "CacheHost": "cache.internal", "CachePort": 6380}"#,
        )
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/var/lib/ldb/app.db"));
        assert_eq!(config.cache_url(), "redis://cache.internal:6380/");
        assert_eq!(config.default_ttl_secs, 3600);
        assert!(config.cache_enabled);
    }

    #[test]
    fn test_write_policy_from_json() {
        let config = LdbConfig::from_json_str(r#"{"CacheWritePolicy": "BestEffort"}"#).unwrap();
        assert_eq!(config.cache_write_policy, CacheWritePolicy::BestEffort);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        assert!(matches!(LdbConfig::from_json_str("{not json"), Err(LdbError::Config(_))));
        assert!(matches!(
            LdbConfig::from_json_str(r#"{"CachePort": "six"}"#),
            Err(LdbError::Config(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"DbPath": "contacts.db", "DefaultTtlSecs": 120}}"#).unwrap();
        let config = LdbConfig::from_file(file.path()).unwrap();
        assert_eq!(config.db_path, PathBuf::from("contacts.db"));
        assert_eq!(config.default_ttl_secs, 120);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let res = LdbConfig::from_file("/nonexistent/ldb.json");
        assert!(matches!(res, Err(LdbError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_host() {
        let config = LdbConfig {
            cache_host: " ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let disabled = LdbConfig {
            cache_host: String::new(),
            cache_enabled: false,
            ..Default::default()
        };
        assert!(disabled.validate().is_ok());
    }
}
