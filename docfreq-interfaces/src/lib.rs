//! # docfreq interfaces
//!
//! The two narrow capabilities the dispatcher and the worker depend on:
//!
//! - [`WorkQueue`] - ordered, multi-producer/multi-consumer message channel
//! - [`KeyValueStore`] - byte values with TTL plus an integer counter keyspace
//!
//! Backends live in `docfreq-queue` and `docfreq-caching`; anything that
//! satisfies these traits can be swapped in.

pub mod cache;
pub mod queue;

#[cfg(feature = "testing")]
pub mod testing;

// Re-export commonly used types
pub use cache::{CacheError, CacheResult, KeyValueStore};
pub use queue::{QueueError, QueueResult, WorkQueue};
