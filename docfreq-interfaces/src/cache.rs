//! Key/value store interface
//!
//! The result cache is both the store for computed reports and the
//! completion signal for the dispatcher: a key being present means the job
//! is done. Values are opaque bytes.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    /// Keys must be non-empty
    #[error("invalid key")]
    InvalidKey,

    /// A counter key holds something that is not an integer
    #[error("unexpected format or not a number for key \"{key}\"")]
    NotANumber { key: String },

    /// Backend-specific failure, with the operation and key involved
    #[error("error {operation} key \"{key}\": {message}")]
    Backend {
        operation: &'static str,
        key: String,
        message: String,
    },
}

impl CacheError {
    pub fn backend(
        operation: &'static str,
        key: impl Into<String>,
        err: impl std::fmt::Display,
    ) -> Self {
        Self::Backend {
            operation,
            key: key.into(),
            message: err.to_string(),
        }
    }
}

/// Byte key/value store with expiry, plus integer counters
///
/// Counters live in a keyspace independent from stored values.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Insert or replace `key`. A zero `ttl` means the entry never expires.
    async fn store(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()>;

    /// Read `key`; `Ok(None)` when it does not exist or has expired
    async fn retrieve(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Set the counter `key` to `value`
    async fn set_counter(&self, key: &str, value: i64) -> CacheResult<()>;

    /// Current value of the counter `key`; a missing counter reads as 0
    async fn get_counter(&self, key: &str) -> CacheResult<i64>;

    /// Add one to the counter `key`, creating it at 0 first if needed
    async fn increment_counter(&self, key: &str) -> CacheResult<()>;
}

/// Reject empty keys the same way in every backend
pub fn validate_key(key: &str) -> CacheResult<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey);
    }
    Ok(())
}
