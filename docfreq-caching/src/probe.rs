//! Bounded-wait retrieve

use std::time::Duration;
use tracing::trace;

use crate::{CacheResult, KeyValueStore};

/// Retrieve `key`, giving up after `wait`
///
/// A retrieve that does not complete within `wait` is reported the same
/// as an absent key. Errors returned before the deadline are propagated.
pub async fn retrieve_within(
    store: &dyn KeyValueStore,
    key: &str,
    wait: Duration,
) -> CacheResult<Option<Vec<u8>>> {
    match tokio::time::timeout(wait, store.retrieve(key)).await {
        Ok(result) => result,
        Err(_) => {
            trace!(key, ?wait, "retrieve timed out, treating key as absent");
            Ok(None)
        }
    }
}
