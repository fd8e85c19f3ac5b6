//! In-process broker

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::broker::DEFAULT_MAX_FETCH;
use crate::{Broker, QueueResult};

#[derive(Default)]
struct Channel {
    messages: Mutex<VecDeque<Vec<u8>>>,
    available: Notify,
}

/// In-memory list broker
///
/// Each fetch drains up to `max_fetch` messages once the channel is
/// non-empty. Fetch is cancel-safe: the drain happens without suspending.
pub struct MemoryBroker {
    channels: Mutex<HashMap<String, Arc<Channel>>>,
    max_fetch: usize,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::with_max_fetch(DEFAULT_MAX_FETCH)
    }

    /// Create a broker returning at most `max_fetch` messages per fetch
    pub fn with_max_fetch(max_fetch: usize) -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            max_fetch: max_fetch.max(1),
        }
    }

    /// Messages currently waiting in `channel`
    pub fn len(&self, channel: &str) -> usize {
        self.channels
            .lock()
            .get(channel)
            .map_or(0, |c| c.messages.lock().len())
    }

    pub fn is_empty(&self, channel: &str) -> bool {
        self.len(channel) == 0
    }

    fn channel(&self, name: &str) -> Arc<Channel> {
        self.channels
            .lock()
            .entry(name.to_string())
            .or_default()
            .clone()
    }
}

impl Default for MemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Broker for MemoryBroker {
    async fn append(&self, channel: &str, messages: Vec<Vec<u8>>) -> QueueResult<()> {
        let channel = self.channel(channel);
        channel.messages.lock().extend(messages);
        channel.available.notify_waiters();
        Ok(())
    }

    async fn fetch(&self, channel: &str) -> QueueResult<Vec<Vec<u8>>> {
        let channel = self.channel(channel);
        loop {
            // Register interest before checking so an append between the
            // check and the await still wakes us
            let notified = channel.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut messages = channel.messages.lock();
                if !messages.is_empty() {
                    let count = messages.len().min(self.max_fetch);
                    return Ok(messages.drain(..count).collect());
                }
            }

            notified.await;
        }
    }
}
