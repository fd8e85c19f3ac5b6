//! Cache statistics

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Cache statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Total number of retrieve requests
    pub total_gets: u64,

    /// Number of cache hits
    pub hits: u64,

    /// Number of cache misses
    pub misses: u64,

    /// Total number of store requests
    pub total_puts: u64,

    /// Entries dropped because they expired
    pub evictions: u64,

    /// Total number of counter increments
    pub increments: u64,

    /// Current number of live entries
    pub entry_count: usize,

    /// Hit rate (0.0 to 1.0)
    pub hit_rate: f64,
}

/// Thread-safe statistics collector
#[derive(Debug, Default)]
pub struct StatsCollector {
    total_gets: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    total_puts: AtomicU64,
    evictions: AtomicU64,
    increments: AtomicU64,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cache hit
    pub fn record_hit(&self) {
        self.total_gets.fetch_add(1, Ordering::Relaxed);
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache miss
    pub fn record_miss(&self) {
        self.total_gets.fetch_add(1, Ordering::Relaxed);
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a put operation
    pub fn record_put(&self) {
        self.total_puts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an eviction
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_increment(&self) {
        self.increments.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot the current counters
    pub fn get_stats(&self, entry_count: usize) -> CacheStats {
        let total_gets = self.total_gets.load(Ordering::Relaxed);
        let hits = self.hits.load(Ordering::Relaxed);

        let hit_rate = if total_gets > 0 {
            hits as f64 / total_gets as f64
        } else {
            0.0
        };

        CacheStats {
            total_gets,
            hits,
            misses: self.misses.load(Ordering::Relaxed),
            total_puts: self.total_puts.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            increments: self.increments.load(Ordering::Relaxed),
            entry_count,
            hit_rate,
        }
    }
}

/// Shared stats collector
pub type SharedStatsCollector = Arc<StatsCollector>;

/// Create a new shared stats collector
pub fn create_stats_collector() -> SharedStatsCollector {
    Arc::new(StatsCollector::new())
}
