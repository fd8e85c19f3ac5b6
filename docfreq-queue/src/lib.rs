//! Work queue adapters for docfreq
//!
//! [`BufferedQueue`] turns a [`Broker`], whose physical fetch may return
//! several messages at once, into a [`WorkQueue`] that hands out exactly one
//! message per pull. Extras are kept in a per-channel unread buffer.

pub mod broker;
pub mod brokers;
pub mod buffered;
pub mod stats;

// Re-export main types
pub use broker::{Broker, DEFAULT_MAX_FETCH};
pub use buffered::BufferedQueue;
pub use docfreq_interfaces::{QueueError, QueueResult, WorkQueue};
pub use stats::QueueStats;

#[cfg(feature = "memory")]
pub use brokers::MemoryBroker;

#[cfg(feature = "redis")]
pub use brokers::RedisBroker;
