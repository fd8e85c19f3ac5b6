//! Single-message queue adapter over a batching broker

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::stats::StatsCollector;
use crate::{Broker, QueueError, QueueResult, QueueStats, WorkQueue};

type UnreadBuffer = Arc<tokio::sync::Mutex<VecDeque<Vec<u8>>>>;

/// [`WorkQueue`] over a [`Broker`]
///
/// A pull holds its channel's buffer lock for its whole duration, including
/// the physical fetch, so concurrent pullers on one channel are served one at
/// a time and never interleave buffer reads with buffer refills.
pub struct BufferedQueue<B> {
    broker: B,
    push_lock: tokio::sync::Mutex<()>,
    unread: Mutex<HashMap<String, UnreadBuffer>>,
    stats: StatsCollector,
}

impl<B: Broker> BufferedQueue<B> {
    pub fn new(broker: B) -> Self {
        Self {
            broker,
            push_lock: tokio::sync::Mutex::new(()),
            unread: Mutex::new(HashMap::new()),
            stats: StatsCollector::default(),
        }
    }

    pub fn broker(&self) -> &B {
        &self.broker
    }

    pub fn stats(&self) -> QueueStats {
        self.stats.snapshot()
    }

    fn buffer_for(&self, channel: &str) -> UnreadBuffer {
        self.unread
            .lock()
            .entry(channel.to_string())
            .or_default()
            .clone()
    }
}

fn validate_channel(channel: &str) -> QueueResult<()> {
    if channel.is_empty() {
        return Err(QueueError::InvalidChannel);
    }
    Ok(())
}

fn cancelled(channel: &str) -> QueueError {
    QueueError::Cancelled {
        channel: channel.to_string(),
    }
}

#[async_trait]
impl<B: Broker> WorkQueue for BufferedQueue<B> {
    async fn push(&self, channel: &str, messages: Vec<Vec<u8>>) -> QueueResult<()> {
        validate_channel(channel)?;
        if messages.is_empty() {
            return Ok(());
        }

        let count = messages.len();
        let _guard = self.push_lock.lock().await;
        self.broker.append(channel, messages).await?;
        self.stats.record_push(count);
        trace!(channel, count, "Pushed messages");
        Ok(())
    }

    async fn pull(&self, channel: &str, cancel: &CancellationToken) -> QueueResult<Vec<u8>> {
        validate_channel(channel)?;
        let buffer = self.buffer_for(channel);

        let mut unread = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(channel)),
            guard = buffer.lock() => guard,
        };

        if let Some(message) = unread.pop_front() {
            self.stats.record_pull();
            return Ok(message);
        }

        let batch = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(channel)),
            fetched = self.broker.fetch(channel) => fetched?,
        };
        self.stats.record_fetch(batch.len());
        debug!(channel, count = batch.len(), "Fetched messages from broker");

        let mut batch = batch.into_iter();
        let first = batch.next().ok_or_else(|| QueueError::EmptyFetch {
            channel: channel.to_string(),
        })?;
        unread.extend(batch);

        self.stats.record_pull();
        Ok(first)
    }
}
