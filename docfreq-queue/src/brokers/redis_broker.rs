//! Redis list broker

use async_trait::async_trait;
use parking_lot::Mutex;
use redis::aio::MultiplexedConnection;
use tracing::{debug, info, warn};

use crate::broker::DEFAULT_MAX_FETCH;
use crate::{Broker, QueueError, QueueResult};

/// Broker over Redis lists
///
/// Appends use `RPUSH`. A fetch blocks in `BLPOP` on a connection of its own,
/// then drains up to `max_fetch - 1` more messages with `LPOP .. count`.
///
/// Unlike the in-memory broker, a fetch dropped while `BLPOP` is in flight
/// may lose the message Redis already popped.
pub struct RedisBroker {
    client: redis::Client,
    connection: MultiplexedConnection,
    idle_blocking: Mutex<Vec<MultiplexedConnection>>,
    max_fetch: usize,
}

impl RedisBroker {
    /// Connect to the Redis server at `url`
    pub async fn connect(url: &str, max_fetch: usize) -> QueueResult<Self> {
        let client = redis::Client::open(url).map_err(|e| QueueError::backend("connecting", url, e))?;
        let connection = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e| QueueError::backend("connecting", url, e))?;
        info!(url, "Connected to Redis queue broker");

        Ok(Self {
            client,
            connection,
            idle_blocking: Mutex::new(Vec::new()),
            max_fetch: max_fetch.max(1),
        })
    }

    pub async fn connect_default(url: &str) -> QueueResult<Self> {
        Self::connect(url, DEFAULT_MAX_FETCH).await
    }

    /// A connection that may block in `BLPOP` without stalling other commands
    async fn blocking_connection(&self, channel: &str) -> QueueResult<MultiplexedConnection> {
        let idle = self.idle_blocking.lock().pop();
        if let Some(conn) = idle {
            return Ok(conn);
        }
        debug!(channel, "Opening blocking Redis connection");
        self.client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e| QueueError::backend("connecting", channel, e))
    }
}

#[async_trait]
impl Broker for RedisBroker {
    async fn append(&self, channel: &str, messages: Vec<Vec<u8>>) -> QueueResult<()> {
        let mut conn = self.connection.clone();
        redis::cmd("RPUSH")
            .arg(channel)
            .arg(messages)
            .query_async::<_, i64>(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| QueueError::backend("pushing to", channel, e))
    }

    async fn fetch(&self, channel: &str) -> QueueResult<Vec<Vec<u8>>> {
        let mut blocking = self.blocking_connection(channel).await?;
        let popped = loop {
            let reply = redis::cmd("BLPOP")
                .arg(channel)
                .arg(0)
                .query_async::<_, Option<(String, Vec<u8>)>>(&mut blocking)
                .await
                .map_err(|e| QueueError::backend("popping from", channel, e))?;
            if let Some((_, message)) = reply {
                break message;
            }
        };
        // Only connections that completed their command go back to the pool
        self.idle_blocking.lock().push(blocking);

        let mut batch = vec![popped];
        if self.max_fetch > 1 {
            let mut conn = self.connection.clone();
            let extras = redis::cmd("LPOP")
                .arg(channel)
                .arg(self.max_fetch - 1)
                .query_async::<_, Option<Vec<Vec<u8>>>>(&mut conn)
                .await;
            match extras {
                Ok(extras) => batch.extend(extras.unwrap_or_default()),
                // The popped message is already ours, hand it out alone
                Err(e) => warn!(channel, error = %e, "Failed to drain extra messages"),
            }
        }
        Ok(batch)
    }
}
