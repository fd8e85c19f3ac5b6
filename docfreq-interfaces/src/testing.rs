//! Mock implementations for testing
//!
//! Mocks of the capability traits built with the mockall framework, for
//! exercising failure paths that the in-memory backends never produce.

use async_trait::async_trait;
use mockall::mock;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::{CacheResult, KeyValueStore, QueueResult, WorkQueue};

mock! {
    pub Queue {}

    #[async_trait]
    impl WorkQueue for Queue {
        async fn push(&self, channel: &str, messages: Vec<Vec<u8>>) -> QueueResult<()>;
        async fn pull(&self, channel: &str, cancel: &CancellationToken) -> QueueResult<Vec<u8>>;
    }
}

mock! {
    pub Store {}

    #[async_trait]
    impl KeyValueStore for Store {
        async fn store(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()>;
        async fn retrieve(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;
        async fn set_counter(&self, key: &str, value: i64) -> CacheResult<()>;
        async fn get_counter(&self, key: &str) -> CacheResult<i64>;
        async fn increment_counter(&self, key: &str) -> CacheResult<()>;
    }
}
