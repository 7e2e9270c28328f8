//! Cache abstraction for the admin dashboard.
//!
//! A [`Cache`] handle fronts one of two adapters: a process-local
//! in-memory store or a shared Redis instance. Values are stored as
//! JSON text so both adapters speak the same format and a stale or
//! corrupt entry degrades to a miss instead of an error.
//!
//! Adapter selection happens once at startup through
//! [`Cache::from_config`]; everything downstream (the rate limiter
//! included) only sees the handle.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use admiral_core::config::AppConfig;

pub mod memory;
pub mod ratelimit;
pub mod redis;

pub use memory::MemoryCacheAdapter;
pub use ratelimit::{RateLimitResult, consume_rate_limit, rate_limit_key};
pub use redis::RedisCacheAdapter;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("REQUIRE_DISTRIBUTED_CACHE is set but REDIS_URL is not configured")]
    DistributedCacheRequired,
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Storage backend behind a [`Cache`]. Implementations store opaque
/// JSON text and enforce the entry TTL themselves.
#[async_trait]
pub trait CacheAdapter: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;
    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()>;
    async fn del(&self, key: &str) -> CacheResult<()>;
}

/// Cheaply cloneable handle over the selected adapter.
#[derive(Clone)]
pub struct Cache {
    adapter: Arc<dyn CacheAdapter>,
}

impl Cache {
    pub fn new(adapter: Arc<dyn CacheAdapter>) -> Self {
        Self { adapter }
    }

    /// A cache backed by the in-memory adapter. Used by tests and by
    /// deployments without a shared store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCacheAdapter::new()))
    }

    /// Select an adapter from configuration.
    ///
    /// `REDIS_URL` wins when present. Without it, production deployments
    /// that demand a distributed cache fail fast; otherwise the
    /// in-memory adapter is used (with a warning in production, since
    /// per-process caching weakens rate limits behind a load balancer).
    pub async fn from_config(config: &AppConfig) -> CacheResult<Self> {
        if let Some(url) = &config.redis_url {
            let adapter = RedisCacheAdapter::connect(url).await?;
            return Ok(Self::new(Arc::new(adapter)));
        }
        if config.production {
            if config.require_distributed_cache {
                return Err(CacheError::DistributedCacheRequired);
            }
            tracing::warn!(
                "no REDIS_URL configured in production, falling back to per-process cache"
            );
        }
        Ok(Self::in_memory())
    }

    /// Fetch and deserialize a value. A missing key, an expired entry,
    /// or JSON that no longer matches `T` all come back as `None`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        let Some(raw) = self.adapter.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(error) => {
                tracing::warn!(key, %error, "discarding unparsable cache entry");
                Ok(None)
            }
        }
    }

    /// Store a value for `ttl_seconds`. A non-positive TTL is a no-op
    /// rather than an unbounded write.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: i64) -> CacheResult<()> {
        if ttl_seconds <= 0 {
            return Ok(());
        }
        let raw = serde_json::to_string(value)?;
        self.adapter
            .set(key, raw, Duration::from_secs(ttl_seconds as u64))
            .await
    }

    pub async fn delete(&self, key: &str) -> CacheResult<()> {
        self.adapter.del(key).await
    }

    /// Read-through load. Cache failures on either side are logged and
    /// absorbed so a degraded cache never takes the loader down with it;
    /// only the loader's own error propagates.
    pub async fn get_or_set<T, E, F, Fut>(
        &self,
        key: &str,
        ttl_seconds: i64,
        load: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.get::<T>(key).await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(error) => tracing::warn!(key, %error, "cache read failed, treating as miss"),
        }
        let value = load().await?;
        if let Err(error) = self.set(key, &value, ttl_seconds).await {
            tracing::warn!(key, %error, "cache write failed after load");
        }
        Ok(value)
    }
}
