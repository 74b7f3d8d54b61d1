//! In-process cache client with per-entry expiry.
//!
//! Follows memcached's expiration rules: a TTL of 0 never expires and a
//! negative TTL is already expired when stored. Useful for tests and for a
//! single process that has no cache server to talk to.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::CacheClient;
use crate::error::Result;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
    hit_count: u64,
}

impl CacheEntry {
    fn new(value: Vec<u8>, ttl_seconds: i32) -> Self {
        let now = Instant::now();
        let expires_at = match ttl_seconds {
            0 => None,
            ttl if ttl > 0 => Some(now + Duration::from_secs(ttl as u64)),
            _ => Some(now),
        };
        Self {
            value,
            expires_at,
            hit_count: 0,
        }
    }

    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delete(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of stored entries, expired ones included until cleaned up.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Times `key` was served since it was last stored.
    pub fn hit_count(&self, key: &str) -> Option<u64> {
        self.entries.lock().get(key).map(|entry| entry.hit_count)
    }

    /// Drop expired entries, returning how many went.
    pub fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }
}

impl CacheClient for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut entries = self.entries.lock();

        if let Some(entry) = entries.get_mut(key) {
            if !entry.is_expired() {
                entry.hit_count += 1;
                return Ok(Some(entry.value.clone()));
            }
            entries.remove(key);
        }
        Ok(None)
    }

    fn set(&self, key: &str, value: &[u8], ttl_seconds: i32) -> Result<()> {
        self.entries
            .lock()
            .insert(key.to_string(), CacheEntry::new(value.to_vec(), ttl_seconds));
        Ok(())
    }
}
