// src/cache/mod.rs
// Cache client capability consumed by the cache-aside layer

pub mod memory_cache;
pub mod redis_cache;
pub mod stats;

pub use memory_cache::MemoryCache;
pub use redis_cache::RedisCache;
pub use stats::CacheStats;

use crate::error::Result;
use crate::hashing::md5_hex;

/// Narrow get/set surface over an external key-value cache.
///
/// A miss is `Ok(None)`, never an error. Implementations own expiry policy:
/// the TTL is handed over exactly as the caller resolved it.
pub trait CacheClient: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8], ttl_seconds: i32) -> Result<()>;
}

/// Cache key for `query` inside the logical `group`: `group + "_" + md5(query)`.
///
/// No validation happens here; deciding whether to cache at all is up to the caller.
pub fn build_key(group: &str, query: &str) -> String {
    format!("{}_{}", group, md5_hex(query))
}
