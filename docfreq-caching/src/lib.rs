//! Result cache stores for docfreq
//!
//! This crate provides the [`KeyValueStore`] backends used as the result
//! cache, and the bounded-wait retrieve that the dispatcher uses as a
//! cheap existence check.

pub mod entry;
pub mod probe;
pub mod stats;
pub mod stores;

// Re-export main types
pub use docfreq_interfaces::{CacheError, CacheResult, KeyValueStore};
pub use entry::CacheEntry;
pub use probe::retrieve_within;
pub use stats::CacheStats;

#[cfg(feature = "memory")]
pub use stores::MemoryStore;

#[cfg(feature = "redis")]
pub use stores::RedisStore;
