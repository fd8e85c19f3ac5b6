//! Physical broker primitive

use async_trait::async_trait;

use crate::QueueResult;

/// Default upper bound on messages returned by one fetch
pub const DEFAULT_MAX_FETCH: usize = 16;

/// Raw list operations a queue backend provides
///
/// `fetch` may return more than one message. Callers must not assume any
/// particular batch size, only that messages come back in append order.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Append `messages` to the tail of `channel` in one operation
    async fn append(&self, channel: &str, messages: Vec<Vec<u8>>) -> QueueResult<()>;

    /// Remove one or more messages from the head of `channel`
    ///
    /// Blocks until at least one message is available. Dropping the returned
    /// future before it completes must not remove anything from the channel,
    /// unless the backend documents otherwise.
    async fn fetch(&self, channel: &str) -> QueueResult<Vec<Vec<u8>>>;
}
