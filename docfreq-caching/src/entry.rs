//! Cache entry with expiry metadata

use std::time::Duration;
use tokio::time::Instant;

/// Cache entry with its expiry deadline
///
/// Times come from [`tokio::time::Instant`] so that expiry follows the
/// runtime clock, including a paused clock in tests.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The cached value
    pub value: V,

    /// When the entry was created
    pub created_at: Instant,

    /// When the entry expires, `None` for entries that live forever
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    /// Create an entry that never expires
    pub fn new(value: V) -> Self {
        Self {
            value,
            created_at: Instant::now(),
            expires_at: None,
        }
    }

    /// Create an entry expiring after `ttl`; a zero `ttl` never expires
    pub fn with_ttl(value: V, ttl: Duration) -> Self {
        let mut entry = Self::new(value);
        if !ttl.is_zero() {
            entry.expires_at = Some(entry.created_at + ttl);
        }
        entry
    }

    /// Check if the entry has expired as of `now`
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_never_expires() {
        let entry = CacheEntry::with_ttl("v", Duration::ZERO);
        assert!(entry.expires_at.is_none());

        tokio::time::advance(Duration::from_secs(86_400)).await;
        assert!(!entry.is_expired_at(Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expires_after_ttl() {
        let entry = CacheEntry::with_ttl("v", Duration::from_secs(30));
        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(!entry.is_expired_at(Instant::now()));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(entry.is_expired_at(Instant::now()));
    }
}
