// src/query/mod.rs
// Cache-aside query layer: reads go through the cache, mutations go straight to the database

pub mod options;

pub use options::{parse_ttl, CacheWritePolicy, MutationKind, QueryOptions, DEFAULT_TTL_SECS};

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::cache::stats::StatsRecorder;
use crate::cache::{build_key, CacheClient, CacheStats, RedisCache};
use crate::config::LdbConfig;
use crate::db::{decode_payload, encode_payload, DatabaseExecutor, RowSet, SqliteExecutor};
use crate::error::{report_or_fail, Result, Severity};

/// Returned by [`Ldb::query_value`] when the query matched no row.
pub const NOT_FOUND: &str = "NOT_FOUND";

/// Owns the database and cache handles and runs every query through them.
///
/// Stateless per call apart from counters. Two concurrent misses on the same
/// key both hit the database and both store; the last write wins.
pub struct Ldb {
    db: Arc<dyn DatabaseExecutor>,
    cache: Arc<dyn CacheClient>,
    default_ttl: i32,
    write_policy: CacheWritePolicy,
    stats: StatsRecorder,
}

impl Ldb {
    pub fn new(db: Arc<dyn DatabaseExecutor>, cache: Arc<dyn CacheClient>) -> Self {
        Self {
            db,
            cache,
            default_ttl: DEFAULT_TTL_SECS,
            write_policy: CacheWritePolicy::default(),
            stats: StatsRecorder::default(),
        }
    }

    pub fn with_default_ttl(mut self, ttl_seconds: i32) -> Self {
        self.default_ttl = ttl_seconds;
        self
    }

    pub fn with_write_policy(mut self, policy: CacheWritePolicy) -> Self {
        self.write_policy = policy;
        self
    }

    /// Open the SQLite database and Redis client named by `config`.
    pub fn from_config(config: &LdbConfig) -> Result<Self> {
        let db = SqliteExecutor::open(&config.db_path, Duration::from_millis(config.db_busy_timeout_ms))?;
        let cache = if config.cache_enabled {
            RedisCache::new(&config.cache_url(), Duration::from_millis(config.cache_timeout_ms))?
        } else {
            RedisCache::disabled()
        };
        Ok(Self::new(Arc::new(db), Arc::new(cache))
            .with_default_ttl(config.default_ttl_secs)
            .with_write_policy(config.cache_write_policy))
    }

    /// Direct database handle, for callers that need more than this layer offers.
    pub fn database(&self) -> &dyn DatabaseExecutor {
        self.db.as_ref()
    }

    /// Direct cache handle.
    pub fn cache(&self) -> &dyn CacheClient {
        self.cache.as_ref()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Read a single value, consulting the cache first when a group is set.
    ///
    /// A query that matches no row yields [`NOT_FOUND`]; that result is not cached.
    pub fn query_value(&self, query: &str, options: &QueryOptions) -> Result<String> {
        let group = options.group();
        let key = group.map(|g| build_key(g, query));

        if let Some(key) = &key {
            if let Some(bytes) = self.probe(key)? {
                self.stats.hit();
                debug!(key = %key, "Scalar served from cache");
                return Ok(String::from_utf8_lossy(&bytes).into_owned());
            }
            self.stats.miss();
        }

        self.stats.db_read();
        let value = report_or_fail(
            self.db.query_scalar(query),
            Severity::Fatal,
            "error reading value from database",
        )?
        .flatten();

        let value = match value {
            Some(value) => value,
            None => {
                debug!("Scalar query matched no row");
                return Ok(NOT_FOUND.to_string());
            }
        };

        if let Some(key) = &key {
            self.store(key, value.as_bytes(), options.ttl_or(self.default_ttl))?;
        }
        Ok(value)
    }

    /// Read all rows, consulting the cache first when a group is set.
    ///
    /// A cached payload that no longer decodes counts as a miss.
    pub fn query(&self, query: &str, options: &QueryOptions) -> Result<RowSet> {
        let group = options.group();
        let key = group.map(|g| build_key(g, query));

        if let Some(key) = &key {
            if let Some(bytes) = self.probe(key)? {
                match report_or_fail(
                    decode_payload(&bytes),
                    Severity::LogOnly,
                    "discarding undecodable cached payload",
                )? {
                    Some(rows) => {
                        self.stats.hit();
                        debug!(key = %key, rows = rows.len(), "Rows served from cache");
                        return Ok(rows);
                    }
                    None => self.stats.undecodable(),
                }
            }
            self.stats.miss();
        }

        self.stats.db_read();
        let rows = match report_or_fail(
            self.db.query_rows(query),
            Severity::Fatal,
            "error querying database",
        )? {
            Some(result) => result.into_row_set(),
            None => RowSet::new(),
        };

        if let Some(key) = &key {
            let payload = report_or_fail(
                encode_payload(&rows),
                Severity::Fatal,
                "error encoding rows for cache",
            )?
            .unwrap_or_default();
            self.store(key, &payload, options.ttl_or(self.default_ttl))?;
        }
        Ok(rows)
    }

    /// [`query_value`](Self::query_value) with positional `query[, group[, ttl]]` arguments.
    pub fn query_value_args<S: AsRef<str>>(&self, args: &[S]) -> Result<String> {
        let (query, options) = QueryOptions::from_args(args)?;
        self.query_value(&query, &options)
    }

    /// [`query`](Self::query) with positional `query[, group[, ttl]]` arguments.
    pub fn query_args<S: AsRef<str>>(&self, args: &[S]) -> Result<RowSet> {
        let (query, options) = QueryOptions::from_args(args)?;
        self.query(&query, &options)
    }

    /// Run a mutating statement, classifying its result with [`MutationKind::infer`].
    pub fn execute(&self, statement: &str) -> Result<i64> {
        self.execute_as(statement, MutationKind::infer(statement))
    }

    /// Run a mutating statement and report the number `kind` asks for. Never cached.
    pub fn execute_as(&self, statement: &str, kind: MutationKind) -> Result<i64> {
        self.stats.db_write();
        let outcome = report_or_fail(
            self.db.exec(statement),
            Severity::Fatal,
            &format!("error executing statement: {}", statement),
        )?
        .unwrap_or_default();

        Ok(match kind {
            MutationKind::InsertId => outcome.last_insert_id,
            MutationKind::AffectedRows => outcome.rows_affected,
        })
    }

    /// Cache lookup where transport errors count as a miss.
    fn probe(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(report_or_fail(self.cache.get(key), Severity::LogOnly, "cache lookup failed")?.flatten())
    }

    fn store(&self, key: &str, payload: &[u8], ttl_seconds: i32) -> Result<()> {
        let severity = match self.write_policy {
            CacheWritePolicy::Strict => Severity::Fatal,
            CacheWritePolicy::BestEffort => Severity::LogOnly,
        };
        match report_or_fail(self.cache.set(key, payload, ttl_seconds), severity, "error storing key in cache") {
            Ok(Some(())) => {
                self.stats.stored();
                debug!(key = %key, ttl_seconds, bytes = payload.len(), "Stored in cache");
                Ok(())
            }
            Ok(None) => {
                self.stats.store_failed();
                warn!(key = %key, "Returning uncached result");
                Ok(())
            }
            Err(e) => {
                self.stats.store_failed();
                Err(e)
            }
        }
    }
}
