//! Broker implementations

#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "redis")]
pub mod redis_broker;

#[cfg(feature = "memory")]
pub use memory::MemoryBroker;

#[cfg(feature = "redis")]
pub use redis_broker::RedisBroker;
