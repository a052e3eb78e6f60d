//! Redis JSON cache
//!
//! Values are stored as JSON strings. A [`ConnectionManager`] keeps one
//! multiplexed connection alive and reconnects on failure; each call clones
//! the manager, which is cheap.
//!
//! Besides being used directly by repositories, `del`, `del_multiple` and
//! `keys` back the `invalidate_*` helpers that `#[repository]` generates for
//! structs with a `redis` field.

use std::env;

use log::{info, warn};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, ErrorKind, RedisError};
use serde::{de::DeserializeOwned, Serialize};

#[derive(Clone)]
pub struct RedisClient {
    manager: ConnectionManager,
}

fn json_error(context: &'static str, error: serde_json::Error) -> RedisError {
    RedisError::from((ErrorKind::TypeError, context, error.to_string()))
}

impl RedisClient {
    /// Connects to `REDIS_URL` (default `redis://localhost:6379`) and sends a PING.
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let redis_url = env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        let client = Client::open(redis_url)?;
        let mut manager = ConnectionManager::new(client).await?;
        redis::cmd("PING").query_async::<()>(&mut manager).await?;

        info!("✅ Redis connected");

        Ok(Self { manager })
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, RedisError> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(key).await?;

        value
            .map(|json| serde_json::from_str(&json).map_err(|e| json_error("Deserialization failed", e)))
            .transpose()
    }

    pub async fn set_with_expiry<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        seconds: usize,
    ) -> Result<(), RedisError> {
        let json = serde_json::to_string(value).map_err(|e| json_error("Serialization failed", e))?;
        let mut conn = self.manager.clone();
        conn.set_ex(key, json, seconds as u64).await
    }

    pub async fn del(&self, key: &str) -> Result<(), RedisError> {
        let mut conn = self.manager.clone();
        conn.del(key).await
    }

    pub async fn del_multiple(&self, keys: &[String]) -> Result<(), RedisError> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.manager.clone();
        conn.del(keys).await
    }

    /// Cache read that logs failures and treats them as a miss.
    pub async fn get_or_miss<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.get::<T>(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    /// Cache write that only logs failures.
    pub async fn store<T: Serialize>(&self, key: &str, value: &T, seconds: usize) {
        if let Err(e) = self.set_with_expiry(key, value, seconds).await {
            warn!("Cache write failed for {}: {}", key, e);
        }
    }

    pub async fn keys(&self, pattern: &str) -> Result<Vec<String>, RedisError> {
        let mut conn = self.manager.clone();
        conn.keys(pattern).await
    }
}
