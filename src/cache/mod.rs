pub mod key;
pub mod memory;
pub mod redis_store;

pub use key::derive_cache_key;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use crate::config::Config;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Key/value store with per-entry expiry. Values are serialized text.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    async fn exists(&self, key: &str) -> Result<bool, CacheError>;
}

/// Redis when `cache_uri` is configured, otherwise the in-process store.
pub async fn connect_store(config: &Config) -> Result<Arc<dyn CacheStore>, CacheError> {
    match config.cache_uri.as_deref() {
        Some(uri) => {
            let store = RedisStore::connect(uri).await?;
            tracing::info!("Using Redis cache store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!(
                "Using in-process cache store (capacity {})",
                config.cache_max_capacity
            );
            Ok(Arc::new(MemoryStore::new(config.cache_max_capacity)))
        }
    }
}
