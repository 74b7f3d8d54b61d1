//! Counters for the cache-aside read and write paths.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the layer's counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_stores: u64,
    pub store_failures: u64,
    pub undecodable_payloads: u64,
    pub db_reads: u64,
    pub db_writes: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    cache_stores: AtomicU64,
    store_failures: AtomicU64,
    undecodable_payloads: AtomicU64,
    db_reads: AtomicU64,
    db_writes: AtomicU64,
}

impl StatsRecorder {
    pub(crate) fn hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn stored(&self) {
        self.cache_stores.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn store_failed(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn undecodable(&self) {
        self.undecodable_payloads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn db_read(&self) {
        self.db_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn db_write(&self) {
        self.db_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            cache_stores: self.cache_stores.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
            undecodable_payloads: self.undecodable_payloads.load(Ordering::Relaxed),
            db_reads: self.db_reads.load(Ordering::Relaxed),
            db_writes: self.db_writes.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            cache_hits: 10,
            cache_misses: 5,
            ..Default::default()
        };
        assert_eq!(stats.hit_rate(), 10.0 / 15.0);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_recorder_snapshot() {
        let rec = StatsRecorder::default();
        rec.hit();
        rec.miss();
        rec.miss();
        rec.db_read();
        rec.stored();
        let snap = rec.snapshot();
        assert_eq!(snap.cache_hits, 1);
        assert_eq!(snap.cache_misses, 2);
        assert_eq!(snap.db_reads, 1);
        assert_eq!(snap.cache_stores, 1);
        assert_eq!(snap.db_writes, 0);
    }
}
