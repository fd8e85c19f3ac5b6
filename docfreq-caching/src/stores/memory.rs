//! In-process key/value store with per-entry expiry

use async_trait::async_trait;
use docfreq_interfaces::cache::validate_key;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::{
    entry::CacheEntry,
    stats::{create_stats_collector, SharedStatsCollector},
    CacheResult, CacheStats, KeyValueStore,
};

/// In-memory [`KeyValueStore`]
///
/// Expired entries are dropped lazily on read; [`MemoryStore::cleanup_expired`]
/// sweeps the rest. Counters never expire.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, CacheEntry<Vec<u8>>>>,
    counters: Mutex<HashMap<String, i64>>,
    stats: SharedStatsCollector,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            counters: Mutex::new(HashMap::new()),
            stats: create_stats_collector(),
        }
    }

    /// Remove expired entries, returning how many were dropped
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));

        let removed = before - entries.len();
        for _ in 0..removed {
            self.stats.record_eviction();
        }
        removed
    }

    /// Start a background sweep of expired entries
    pub fn start_cleanup_task(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                let removed = self.cleanup_expired();
                if removed > 0 {
                    debug!(removed, "Swept expired cache entries");
                }
            }
        })
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .values()
            .filter(|entry| !entry.is_expired_at(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.get_stats(self.len())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn store(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        validate_key(key)?;
        self.entries
            .write()
            .insert(key.to_string(), CacheEntry::with_ttl(value, ttl));
        self.stats.record_put();
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        validate_key(key)?;
        let now = Instant::now();
        let found = self
            .entries
            .read()
            .get(key)
            .map(|entry| (!entry.is_expired_at(now)).then(|| entry.value.clone()));

        let value = match found {
            Some(Some(value)) => Some(value),
            Some(None) => {
                // Re-check under the write lock, a store may have replaced it
                let mut entries = self.entries.write();
                if entries.get(key).is_some_and(|entry| entry.is_expired_at(now)) {
                    entries.remove(key);
                    self.stats.record_eviction();
                }
                None
            }
            None => None,
        };

        if value.is_some() {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
        Ok(value)
    }

    async fn set_counter(&self, key: &str, value: i64) -> CacheResult<()> {
        validate_key(key)?;
        self.counters.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn get_counter(&self, key: &str) -> CacheResult<i64> {
        validate_key(key)?;
        Ok(self.counters.lock().get(key).copied().unwrap_or(0))
    }

    async fn increment_counter(&self, key: &str) -> CacheResult<()> {
        validate_key(key)?;
        let mut counters = self.counters.lock();
        let counter = counters.entry(key.to_string()).or_insert(0);
        *counter = counter.saturating_add(1);
        self.stats.record_increment();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CacheError;

    #[tokio::test]
    async fn test_store_and_retrieve() {
        let store = MemoryStore::new();
        store.store("k", b"v1".to_vec(), Duration::ZERO).await.unwrap();
        assert_eq!(store.retrieve("k").await.unwrap(), Some(b"v1".to_vec()));

        store.store("k", b"v2".to_vec(), Duration::ZERO).await.unwrap();
        assert_eq!(store.retrieve("k").await.unwrap(), Some(b"v2".to_vec()));
        assert_eq!(store.retrieve("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_value_is_present() {
        let store = MemoryStore::new();
        store.store("k", Vec::new(), Duration::ZERO).await.unwrap();
        assert_eq!(store.retrieve("k").await.unwrap(), Some(Vec::new()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires() {
        let store = MemoryStore::new();
        store
            .store("k", b"v".to_vec(), Duration::from_secs(30))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(store.retrieve("k").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(store.retrieve("k").await.unwrap().is_none());
        assert_eq!(store.stats().evictions, 1);
    }

    #[tokio::test]
    async fn test_retrieve_only_needs_shared_access() {
        let store = MemoryStore::new();
        store.store("k", b"v".to_vec(), Duration::ZERO).await.unwrap();

        // A reader holding the map does not block a live-entry retrieve
        let held = store.entries.read();
        assert_eq!(store.retrieve("k").await.unwrap(), Some(b"v".to_vec()));
        drop(held);

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.evictions, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_expired() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .store(&format!("short-{i}"), vec![i], Duration::from_millis(50))
                .await
                .unwrap();
        }
        store.store("forever", vec![1], Duration::ZERO).await.unwrap();
        assert_eq!(store.len(), 6);

        tokio::time::advance(Duration::from_millis(100)).await;
        assert_eq!(store.cleanup_expired(), 5);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.store("", vec![], Duration::ZERO).await,
            Err(CacheError::InvalidKey)
        ));
        assert!(matches!(store.retrieve("").await, Err(CacheError::InvalidKey)));
        assert!(matches!(
            store.increment_counter("").await,
            Err(CacheError::InvalidKey)
        ));
    }

    #[tokio::test]
    async fn test_counters() {
        let store = MemoryStore::new();
        assert_eq!(store.get_counter("pushes").await.unwrap(), 0);

        store.increment_counter("pushes").await.unwrap();
        store.increment_counter("pushes").await.unwrap();
        assert_eq!(store.get_counter("pushes").await.unwrap(), 2);

        store.set_counter("pushes", 40).await.unwrap();
        store.increment_counter("pushes").await.unwrap();
        assert_eq!(store.get_counter("pushes").await.unwrap(), 41);
    }

    #[tokio::test]
    async fn test_counters_independent_of_values() {
        let store = MemoryStore::new();
        store.store("k", b"7".to_vec(), Duration::ZERO).await.unwrap();
        assert_eq!(store.get_counter("k").await.unwrap(), 0);

        store.increment_counter("k").await.unwrap();
        assert_eq!(store.retrieve("k").await.unwrap(), Some(b"7".to_vec()));
    }

    #[tokio::test]
    async fn test_concurrent_increments() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..25 {
                    store.increment_counter("n").await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.get_counter("n").await.unwrap(), 200);
    }
}
