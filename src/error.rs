// src/error.rs
// Error taxonomy and the report-or-fail policy shared by every layer

use thiserror::Error;
use tracing::{error, warn};

/// Result type for ldb operations
pub type Result<T> = std::result::Result<T, LdbError>;

#[derive(Debug, Error)]
pub enum LdbError {
    // Startup
    #[error("configuration error: {0}")]
    Config(String),

    // Source of truth
    #[error("database error: {0}")]
    Database(String),

    // Cache service transport
    #[error("cache error: {0}")]
    Cache(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    // Call parameters
    #[error("invalid ttl '{value}': {reason}")]
    InvalidTtl { value: String, reason: String },

    #[error("missing query text")]
    MissingQuery,

    #[error("too many query arguments: expected at most 3, got {0}")]
    TooManyArguments(usize),
}

/// Coarse classification so callers can pick retry/log/propagate per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Database,
    Cache,
    Serialization,
    Parameter,
}

impl LdbError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LdbError::Config(_) => ErrorKind::Config,
            LdbError::Database(_) => ErrorKind::Database,
            LdbError::Cache(_) => ErrorKind::Cache,
            LdbError::Serialization(_) => ErrorKind::Serialization,
            LdbError::InvalidTtl { .. }
            | LdbError::MissingQuery
            | LdbError::TooManyArguments(_) => ErrorKind::Parameter,
        }
    }
}

impl From<rusqlite::Error> for LdbError {
    fn from(e: rusqlite::Error) -> Self {
        LdbError::Database(e.to_string())
    }
}

impl From<redis::RedisError> for LdbError {
    fn from(e: redis::RedisError) -> Self {
        LdbError::Cache(e.to_string())
    }
}

impl From<serde_json::Error> for LdbError {
    fn from(e: serde_json::Error) -> Self {
        LdbError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for LdbError {
    fn from(e: std::io::Error) -> Self {
        LdbError::Config(e.to_string())
    }
}

/// How a failure reported through [`report_or_fail`] affects the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Log, then hand the error back to the caller.
    Fatal,
    /// Log and carry on without a value.
    LogOnly,
}

/// Log a failed result and decide whether it ends the current operation.
///
/// `Ok(v)` passes through as `Ok(Some(v))`. An error is always logged with
/// `message`; with [`Severity::Fatal`] it is returned, with
/// [`Severity::LogOnly`] it is swallowed and `Ok(None)` comes back so the
/// caller can continue with whatever it already has.
pub fn report_or_fail<T>(result: Result<T>, severity: Severity, message: &str) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) => match severity {
            Severity::Fatal => {
                error!(error = %err, kind = ?err.kind(), "{}", message);
                Err(err)
            }
            Severity::LogOnly => {
                warn!(error = %err, kind = ?err.kind(), "{}", message);
                Ok(None)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_passes_through() {
        let out = report_or_fail(Ok(7), Severity::Fatal, "unused").unwrap();
        assert_eq!(out, Some(7));
    }

    #[test]
    fn test_fatal_returns_error() {
        let res: Result<u32> = Err(LdbError::Database("boom".into()));
        let out = report_or_fail(res, Severity::Fatal, "query failed");
        assert!(matches!(out, Err(LdbError::Database(_))));
    }

    #[test]
    fn test_log_only_swallows_error() {
        let res: Result<u32> = Err(LdbError::Cache("down".into()));
        let out = report_or_fail(res, Severity::LogOnly, "probe failed").unwrap();
        assert_eq!(out, None);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(LdbError::MissingQuery.kind(), ErrorKind::Parameter);
        assert_eq!(LdbError::TooManyArguments(4).kind(), ErrorKind::Parameter);
        assert_eq!(
            LdbError::InvalidTtl { value: "x".into(), reason: "nope".into() }.kind(),
            ErrorKind::Parameter
        );
        assert_eq!(LdbError::Config("x".into()).kind(), ErrorKind::Config);
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            LdbError::TooManyArguments(5).to_string(),
            "too many query arguments: expected at most 3, got 5"
        );
        assert_eq!(LdbError::Cache("timeout".into()).to_string(), "cache error: timeout");
    }
}
