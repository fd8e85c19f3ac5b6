//! Queue and cache backend wiring

use anyhow::Result;
use docfreq_caching::MemoryStore;
use docfreq_config::{BackendKind, DocfreqConfig};
use docfreq_interfaces::{KeyValueStore, WorkQueue};
use docfreq_queue::{BufferedQueue, MemoryBroker};
use std::sync::Arc;
use tracing::info;

/// The work queue and result cache shared by the API and the worker
#[derive(Clone)]
pub struct Backends {
    pub queue: Arc<dyn WorkQueue>,
    pub store: Arc<dyn KeyValueStore>,

    /// Set for the in-memory backend, which needs an expiry sweeper
    pub memory_store: Option<Arc<MemoryStore>>,
}

impl Backends {
    /// Connect to the backend selected in `config`
    pub async fn connect(config: &DocfreqConfig) -> Result<Self> {
        match config.backend.kind {
            BackendKind::Memory => Ok(Self::in_memory(config.queue.max_fetch)),
            BackendKind::Redis => Self::redis(config).await,
        }
    }

    /// In-process queue and cache
    pub fn in_memory(max_fetch: usize) -> Self {
        info!("Using in-memory queue and cache");
        let store = Arc::new(MemoryStore::new());
        Self {
            queue: Arc::new(BufferedQueue::new(MemoryBroker::with_max_fetch(max_fetch))),
            store: store.clone(),
            memory_store: Some(store),
        }
    }

    #[cfg(feature = "redis")]
    async fn redis(config: &DocfreqConfig) -> Result<Self> {
        use docfreq_caching::RedisStore;
        use docfreq_queue::RedisBroker;

        let url = config.backend.redis_url.as_str();
        info!("Using Redis queue and cache at {}", url);
        let broker = RedisBroker::connect(url, config.queue.max_fetch).await?;
        let store = RedisStore::connect(url).await?;

        Ok(Self {
            queue: Arc::new(BufferedQueue::new(broker)),
            store: Arc::new(store),
            memory_store: None,
        })
    }

    #[cfg(not(feature = "redis"))]
    async fn redis(_config: &DocfreqConfig) -> Result<Self> {
        anyhow::bail!("the redis backend requires building docfreq-server with the `redis` feature")
    }
}
