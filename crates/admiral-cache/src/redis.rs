//! Redis cache adapter.
//!
//! Uses a multiplexed [`ConnectionManager`] that reconnects on its own;
//! each call clones the handle, which is cheap and keeps the adapter
//! `Sync` without locking.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};

use crate::{CacheAdapter, CacheResult};

pub struct RedisCacheAdapter {
    manager: ConnectionManager,
}

impl RedisCacheAdapter {
    /// Connect to Redis at `url`. Fails fast when the server is
    /// unreachable so misconfiguration surfaces at startup.
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(url)?;
        let config = ConnectionManagerConfig::new().set_number_of_retries(1);
        let manager = client.get_connection_manager_with_config(config).await?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl CacheAdapter for RedisCacheAdapter {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.manager.clone();
        Ok(conn.get(key).await?)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.manager.clone();
        // SETEX requires a positive expiry.
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, seconds).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.manager.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}
