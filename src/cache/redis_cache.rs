// src/cache/redis_cache.rs - Redis-backed cache client

use parking_lot::Mutex;
use redis::Commands;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::CacheClient;
use crate::error::{LdbError, Result};

/// Redis-backed cache shared by every process that talks to the same server.
///
/// The connection is opened on first use and dropped after a transport
/// error, so the next call reconnects instead of reusing a broken socket.
pub struct RedisCache {
    client: Option<redis::Client>,
    conn: Mutex<Option<redis::Connection>>,
    timeout: Duration,
}

impl RedisCache {
    /// Create a cache client for `redis_url`. No connection is made yet.
    pub fn new(redis_url: &str, timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| LdbError::Config(format!("invalid redis url '{}': {}", redis_url, e)))?;
        info!(url = %redis_url, timeout_ms = timeout.as_millis() as u64, "Redis cache configured");
        Ok(Self {
            client: Some(client),
            conn: Mutex::new(None),
            timeout,
        })
    }

    /// Cache that never stores anything: every get misses, every set succeeds.
    pub fn disabled() -> Self {
        Self {
            client: None,
            conn: Mutex::new(None),
            timeout: Duration::from_secs(1),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Round-trip a PING to the server.
    pub fn ping(&self) -> Result<String> {
        if !self.is_enabled() {
            return Ok("Redis disabled".to_string());
        }
        self.with_connection(|conn| redis::cmd("PING").query::<String>(conn))
    }

    fn connect(&self, client: &redis::Client) -> Result<redis::Connection> {
        let conn = client.get_connection_with_timeout(self.timeout)?;
        conn.set_read_timeout(Some(self.timeout))?;
        conn.set_write_timeout(Some(self.timeout))?;
        debug!("Redis connection established");
        Ok(conn)
    }

    fn with_connection<T>(
        &self,
        op: impl FnOnce(&mut redis::Connection) -> redis::RedisResult<T>,
    ) -> Result<T> {
        let client = match &self.client {
            Some(client) => client,
            None => return Err(LdbError::Cache("redis cache is disabled".to_string())),
        };

        let mut guard = self.conn.lock();
        if guard.is_none() {
            *guard = Some(self.connect(client)?);
        }
        let conn = match guard.as_mut() {
            Some(conn) => conn,
            None => return Err(LdbError::Cache("no redis connection".to_string())),
        };

        match op(conn) {
            Ok(value) => Ok(value),
            Err(e) => {
                if e.is_io_error() || e.is_connection_dropped() || e.is_timeout() {
                    warn!(error = %e, "Dropping Redis connection after transport error");
                    *guard = None;
                }
                Err(e.into())
            }
        }
    }
}

impl CacheClient for RedisCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if !self.is_enabled() {
            return Ok(None);
        }
        self.with_connection(|conn| {
            let value: Option<Vec<u8>> = conn.get(key)?;
            Ok(value)
        })
    }

    fn set(&self, key: &str, value: &[u8], ttl_seconds: i32) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        self.with_connection(|conn| match ttl_seconds {
            0 => conn.set::<_, _, ()>(key, value),
            ttl if ttl > 0 => conn.set_ex::<_, _, ()>(key, value, ttl as u64),
            // Negative expirations go to the server as-is; it decides what they mean.
            ttl => redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("EX")
                .arg(ttl)
                .query::<()>(conn),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_cache_misses_and_accepts_writes() {
        let cache = RedisCache::disabled();
        assert!(!cache.is_enabled());
        cache.set("k", b"v", 60).unwrap();
        assert_eq!(cache.get("k").unwrap(), None);
        assert_eq!(cache.ping().unwrap(), "Redis disabled");
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let res = RedisCache::new("not a url", Duration::from_millis(100));
        assert!(matches!(res, Err(LdbError::Config(_))));
    }

    #[test]
    #[ignore]
    fn test_redis_set_get() {
        let cache = RedisCache::new("redis://127.0.0.1:6379/", Duration::from_secs(1)).unwrap();
        cache.set("ldb_test_key", b"payload", 60).unwrap();
        assert_eq!(cache.get("ldb_test_key").unwrap(), Some(b"payload".to_vec()));
    }

    #[test]
    #[ignore]
    fn test_redis_ping() {
        let cache = RedisCache::new("redis://127.0.0.1:6379/", Duration::from_secs(1)).unwrap();
        assert_eq!(cache.ping().unwrap(), "PONG");
    }
}
