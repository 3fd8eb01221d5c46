use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

/// TTL applied to every cached projection.
pub const PROJECTION_TTL: Duration = Duration::from_secs(300);

pub fn user_key(id: Uuid) -> String {
    format!("user:{}", id)
}

pub fn user_email_key(email: &str) -> String {
    format!("user:email:{}", email)
}

pub fn account_key(user_id: Uuid) -> String {
    format!("account:{}", user_id)
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// String-keyed cache operations the read path needs. Values are projections
/// serialized as text; the primary store remains the source of truth.
#[async_trait]
pub trait CacheClient: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
    async fn del(&self, key: &str) -> Result<(), CacheError>;
}

#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        let manager = client.get_connection_manager().await?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl CacheClient for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs()).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}

/// Typed cache-aside wrapper used by the service facades. Cache failures are
/// logged and otherwise treated as misses so the primary operation never
/// fails because of the cache; a failed invalidation therefore bounds
/// staleness at the TTL.
#[derive(Clone)]
pub struct ProjectionCache {
    client: Arc<dyn CacheClient>,
    ttl: Duration,
}

impl ProjectionCache {
    pub fn new(client: Arc<dyn CacheClient>, ttl: Duration) -> Self {
        Self { client, ttl }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.client.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Failed to deserialize cached value for '{}': {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Cache read failed for '{}': {}", key, e);
                None
            }
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to serialize value for cache key '{}': {}", key, e);
                return;
            }
        };
        if let Err(e) = self.client.set_ex(key, &raw, self.ttl).await {
            warn!("Cache write failed for '{}': {}", key, e);
        }
    }

    pub async fn invalidate(&self, key: &str) {
        if let Err(e) = self.client.del(key).await {
            warn!("Cache invalidation failed for '{}': {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapCache {
        entries: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl CacheClient for MapCache {
        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn set_ex(&self, key: &str, value: &str, _ttl: Duration) -> Result<(), CacheError> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn del(&self, key: &str) -> Result<(), CacheError> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Projection {
        name: String,
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let cache = ProjectionCache::new(Arc::new(MapCache::default()), PROJECTION_TTL);
        let value = Projection {
            name: "Alice".to_string(),
        };

        cache.set("user:1", &value).await;
        assert_eq!(cache.get::<Projection>("user:1").await, Some(value));
    }

    #[tokio::test]
    async fn invalidate_removes_the_entry() {
        let cache = ProjectionCache::new(Arc::new(MapCache::default()), PROJECTION_TTL);
        cache
            .set(
                "user:1",
                &Projection {
                    name: "Alice".to_string(),
                },
            )
            .await;

        cache.invalidate("user:1").await;
        assert_eq!(cache.get::<Projection>("user:1").await, None);
    }

    #[tokio::test]
    async fn corrupt_entries_read_as_misses() {
        let client = Arc::new(MapCache::default());
        client.set_ex("user:1", "not json", PROJECTION_TTL).await.unwrap();

        let cache = ProjectionCache::new(client, PROJECTION_TTL);
        assert_eq!(cache.get::<Projection>("user:1").await, None);
    }

    #[test]
    fn keys_follow_the_wire_format() {
        let id = Uuid::new_v4();
        assert_eq!(user_key(id), format!("user:{}", id));
        assert_eq!(user_email_key("a@x.com"), "user:email:a@x.com");
        assert_eq!(account_key(id), format!("account:{}", id));
    }
}
