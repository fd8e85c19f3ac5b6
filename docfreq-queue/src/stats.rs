//! Queue statistics

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of queue adapter counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Messages appended through `push`
    pub pushed: u64,

    /// Messages handed out by `pull`
    pub pulled: u64,

    /// Physical broker fetches
    pub fetches: u64,

    /// Messages fetched but not yet handed out
    pub buffered: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StatsCollector {
    pushed: AtomicU64,
    pulled: AtomicU64,
    fetches: AtomicU64,
    fetched_messages: AtomicU64,
}

impl StatsCollector {
    pub(crate) fn record_push(&self, count: usize) {
        self.pushed.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_pull(&self) {
        self.pulled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fetch(&self, count: usize) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.fetched_messages
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> QueueStats {
        let pulled = self.pulled.load(Ordering::Relaxed);
        QueueStats {
            pushed: self.pushed.load(Ordering::Relaxed),
            pulled,
            fetches: self.fetches.load(Ordering::Relaxed),
            buffered: self
                .fetched_messages
                .load(Ordering::Relaxed)
                .saturating_sub(pulled),
        }
    }
}
