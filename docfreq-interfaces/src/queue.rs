//! Work queue interface
//!
//! A major limitation of this interface is that it has no way of
//! acknowledging received messages: a message handed out by [`WorkQueue::pull`]
//! is gone from the queue, and if its consumer dies the message is lost.
//! Delivery is at-most-once. Callers compensate by resubmitting, which is
//! idempotent because job ids are content-addressed.

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// Queue errors
#[derive(Debug, Error)]
pub enum QueueError {
    /// The pull was abandoned because its cancellation token fired
    #[error("pull from channel \"{channel}\" cancelled")]
    Cancelled { channel: String },

    /// The broker returned an empty batch from a blocking fetch
    #[error("broker returned no messages for channel \"{channel}\"")]
    EmptyFetch { channel: String },

    /// Channel names must be non-empty
    #[error("invalid channel name")]
    InvalidChannel,

    /// Backend-specific failure, with the operation and channel involved
    #[error("error {operation} channel \"{channel}\": {message}")]
    Backend {
        operation: &'static str,
        channel: String,
        message: String,
    },
}

impl QueueError {
    pub fn backend(
        operation: &'static str,
        channel: impl Into<String>,
        err: impl std::fmt::Display,
    ) -> Self {
        Self::Backend {
            operation,
            channel: channel.into(),
            message: err.to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Ordered message channel with blocking pull
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Append all messages to the tail of `channel`, in the given order
    ///
    /// The batch is appended atomically with respect to other pushes made
    /// through the same adapter. An empty batch is a no-op.
    async fn push(&self, channel: &str, messages: Vec<Vec<u8>>) -> QueueResult<()>;

    /// Take exactly one message from the head of `channel`
    ///
    /// Blocks until a message is available or `cancel` fires, in which case
    /// [`QueueError::Cancelled`] is returned and no message is consumed.
    async fn pull(&self, channel: &str, cancel: &CancellationToken) -> QueueResult<Vec<u8>>;
}
