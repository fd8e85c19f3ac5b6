//! Redis-backed key/value store

use async_trait::async_trait;
use docfreq_interfaces::cache::validate_key;
use redis::aio::MultiplexedConnection;
use std::time::Duration;
use tracing::info;

use crate::{CacheError, CacheResult, KeyValueStore};

/// Prefix separating counters from stored values
const COUNTER_PREFIX: &str = "counter:";

/// [`KeyValueStore`] backed by Redis strings
///
/// Values are stored as raw bytes with `SET .. PX`; counters use
/// `SET`/`GET`/`INCR` under a separate key prefix. Value keys starting with
/// that prefix are rejected as [`CacheError::InvalidKey`], so the two
/// keyspaces never overlap.
#[derive(Clone)]
pub struct RedisStore {
    connection: MultiplexedConnection,
}

impl RedisStore {
    /// Connect to the Redis server at `url`
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(url).map_err(|e| CacheError::backend("connecting", url, e))?;
        let connection = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e| CacheError::backend("connecting", url, e))?;
        info!(url, "Connected to Redis result cache");
        Ok(Self { connection })
    }

    fn counter_key(key: &str) -> String {
        format!("{COUNTER_PREFIX}{key}")
    }
}

fn validate_value_key(key: &str) -> CacheResult<()> {
    validate_key(key)?;
    if key.starts_with(COUNTER_PREFIX) {
        return Err(CacheError::InvalidKey);
    }
    Ok(())
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn store(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        validate_value_key(key)?;
        let mut conn = self.connection.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if !ttl.is_zero() {
            // PX rejects 0, so round sub-millisecond TTLs up
            let millis = ttl.as_millis().clamp(1, u64::MAX as u128) as u64;
            cmd.arg("PX").arg(millis);
        }
        cmd.query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| CacheError::backend("storing", key, e))
    }

    async fn retrieve(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        validate_value_key(key)?;
        let mut conn = self.connection.clone();
        redis::cmd("GET")
            .arg(key)
            .query_async::<_, Option<Vec<u8>>>(&mut conn)
            .await
            .map_err(|e| CacheError::backend("retrieving", key, e))
    }

    async fn set_counter(&self, key: &str, value: i64) -> CacheResult<()> {
        validate_key(key)?;
        let mut conn = self.connection.clone();
        redis::cmd("SET")
            .arg(Self::counter_key(key))
            .arg(value)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| CacheError::backend("setting counter", key, e))
    }

    async fn get_counter(&self, key: &str) -> CacheResult<i64> {
        validate_key(key)?;
        let mut conn = self.connection.clone();
        let raw = redis::cmd("GET")
            .arg(Self::counter_key(key))
            .query_async::<_, Option<String>>(&mut conn)
            .await
            .map_err(|e| CacheError::backend("getting counter", key, e))?;

        match raw {
            None => Ok(0),
            Some(raw) => raw.trim().parse().map_err(|_| CacheError::NotANumber {
                key: key.to_string(),
            }),
        }
    }

    async fn increment_counter(&self, key: &str) -> CacheResult<()> {
        validate_key(key)?;
        let mut conn = self.connection.clone();
        redis::cmd("INCR")
            .arg(Self::counter_key(key))
            .query_async::<_, i64>(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| CacheError::backend("incrementing counter", key, e))
    }
}
