// src/query/options.rs
// Per-call caching options and the policies that shape reads and writes

use serde::{Deserialize, Serialize};

use crate::error::{LdbError, Result};

/// TTL used when a caller asks for caching but gives no expiry.
pub const DEFAULT_TTL_SECS: i32 = 3600;

/// How a read that asked for caching should behave.
///
/// No group, or an empty group, means the call goes straight to the database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub cache_group: Option<String>,
    pub ttl_seconds: Option<i32>,
}

impl QueryOptions {
    /// Do not cache.
    pub fn none() -> Self {
        Self::default()
    }

    /// Cache under `group` with the default TTL.
    pub fn cached(group: impl Into<String>) -> Self {
        Self {
            cache_group: Some(group.into()),
            ttl_seconds: None,
        }
    }

    pub fn with_ttl(mut self, ttl_seconds: i32) -> Self {
        self.ttl_seconds = Some(ttl_seconds);
        self
    }

    /// The group to cache under, if caching was asked for.
    pub fn group(&self) -> Option<&str> {
        self.cache_group.as_deref().filter(|g| !g.is_empty())
    }

    pub fn ttl_or(&self, default_ttl: i32) -> i32 {
        self.ttl_seconds.unwrap_or(default_ttl)
    }

    /// Parse the positional form `query[, group[, ttl]]`.
    ///
    /// The TTL, when present, must be a base-10 32-bit integer.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<(String, QueryOptions)> {
        match args {
            [] => Err(LdbError::MissingQuery),
            [query] => Ok((query.as_ref().to_string(), QueryOptions::none())),
            [query, group] => Ok((query.as_ref().to_string(), QueryOptions::cached(group.as_ref()))),
            [query, group, ttl] => {
                let ttl = parse_ttl(ttl.as_ref())?;
                Ok((
                    query.as_ref().to_string(),
                    QueryOptions::cached(group.as_ref()).with_ttl(ttl),
                ))
            }
            _ => Err(LdbError::TooManyArguments(args.len())),
        }
    }
}

pub fn parse_ttl(text: &str) -> Result<i32> {
    text.parse::<i32>().map_err(|e| LdbError::InvalidTtl {
        value: text.to_string(),
        reason: e.to_string(),
    })
}

/// What to do when a read succeeded but storing its result in the cache failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheWritePolicy {
    /// Fail the call with the cache error.
    #[default]
    Strict,
    /// Log the failure and return the read anyway.
    BestEffort,
}

impl std::str::FromStr for CacheWritePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "strict" => Ok(CacheWritePolicy::Strict),
            "besteffort" => Ok(CacheWritePolicy::BestEffort),
            _ => Err(format!("Unknown cache write policy: {}", s)),
        }
    }
}

/// Which number a mutating statement should report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// The identifier the database assigned to the new row.
    InsertId,
    /// How many rows the statement touched.
    AffectedRows,
}

impl MutationKind {
    /// Guess from the statement text: anything containing "INSERT", in any
    /// case, is an insert. This is a substring match, not SQL parsing, so a
    /// statement that merely mentions the word (a column, a string literal)
    /// is classified as an insert too. Use an explicit kind to avoid that.
    pub fn infer(statement: &str) -> Self {
        if statement.to_uppercase().contains("INSERT") {
            MutationKind::InsertId
        } else {
            MutationKind::AffectedRows
        }
    }
}
