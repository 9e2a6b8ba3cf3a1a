use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The mined association rule set
    AssociationRules,
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::AssociationRules => write!(f, "association_rules:rules"),
        }
    }
}

/// Key/value store with per-entry expiry backing the typed [`Cache`]
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync {
    /// Returns the raw value stored under `key`, if present and not expired
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Stores `value` under `key` for `ttl` seconds and waits for the write
    async fn set_ex(&self, key: &str, value: String, ttl: u64) -> AppResult<()>;

    /// Stores `value` under `key` for `ttl` seconds without waiting for the write
    fn set_in_background(&self, key: String, value: String, ttl: u64);

    /// Removes `key`
    async fn delete(&self, key: &str) -> AppResult<()>;
}

/// Typed cache handle shared by the services
///
/// Values are stored as JSON. A value is always written as one blob under one
/// key, so readers see either the previous value or the new one.
#[derive(Clone)]
pub struct Cache {
    backend: Arc<dyn CacheBackend>,
}

impl Cache {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    /// Process-local cache, used when no Redis URL is configured
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCache::default()))
    }

    /// Retrieves a value from the cache by key
    ///
    /// If the key exists in the cache, the value is deserialized and returned.
    /// If the key does not exist, `None` is returned.
    pub async fn get_from_cache<T: DeserializeOwned>(&self, key: &CacheKey) -> AppResult<Option<T>> {
        match self.backend.get(&key.to_string()).await? {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Stores a value and waits until the backend confirms the write
    pub async fn set<T: Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) -> AppResult<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::Internal(format!("Cache serialization error: {}", e)))?;
        self.backend.set_ex(&key.to_string(), json, ttl).await
    }

    /// Stores a value asynchronously without blocking
    ///
    /// Serialization failures are logged and the write is dropped.
    pub fn set_in_background<T: Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        self.backend.set_in_background(key.to_string(), json, ttl);
    }

    /// Removes a key from the cache
    pub async fn invalidate(&self, key: &CacheKey) -> AppResult<()> {
        self.backend.delete(&key.to_string()).await
    }
}

struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

/// In-process cache backend with lazy expiry
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, MemoryEntry>,
}

impl MemoryCache {
    fn insert(&self, key: String, value: String, ttl: u64) {
        let expires_at = Instant::now() + Duration::from_secs(ttl);
        self.entries.insert(key, MemoryEntry { value, expires_at });
    }
}

#[async_trait::async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let entry = self
            .entries
            .get(key)
            .map(|entry| (entry.value.clone(), entry.expires_at));

        match entry {
            Some((value, expires_at)) if Instant::now() < expires_at => Ok(Some(value)),
            Some(_) => {
                self.entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: String, ttl: u64) -> AppResult<()> {
        self.insert(key.to_string(), value, ttl);
        Ok(())
    }

    fn set_in_background(&self, key: String, value: String, ttl: u64) {
        self.insert(key, value, ttl);
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}
