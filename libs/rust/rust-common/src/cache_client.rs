//! Namespaced TTL cache client.
//!
//! Stores opaque byte values under `namespace:key` with a per-entry expiry.
//! Entries are only ever replaced wholesale; there is no partial update.

use crate::PlatformError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Cache client configuration.
#[derive(Debug, Clone)]
pub struct CacheClientConfig {
    /// Namespace for key isolation
    pub namespace: String,
    /// Default TTL for cache entries
    pub default_ttl: Duration,
    /// Maximum number of live entries
    pub max_entries: usize,
}

impl Default for CacheClientConfig {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            default_ttl: Duration::from_secs(3600),
            max_entries: 1000,
        }
    }
}

impl CacheClientConfig {
    /// Create config with custom namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Create config with custom TTL.
    #[must_use]
    pub const fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Create config with a custom entry limit.
    #[must_use]
    pub const fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }
}

struct CacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// In-process cache client with namespacing and expiry.
///
/// Cloning is cheap; clones share the same underlying store.
#[derive(Clone)]
pub struct CacheClient {
    config: CacheClientConfig,
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl CacheClient {
    /// Create a new cache client.
    #[must_use]
    pub fn new(config: CacheClientConfig) -> Self {
        Self {
            config,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get a value from the cache. Expired entries read as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PlatformError> {
        let namespaced_key = self.namespaced_key(key)?;

        let entries = self.entries.read().await;
        Ok(entries
            .get(&namespaced_key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone()))
    }

    /// Set a value in the cache, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty or the cache is full of live entries.
    pub async fn set(
        &self,
        key: &str,
        value: &[u8],
        ttl: Option<Duration>,
    ) -> Result<(), PlatformError> {
        let namespaced_key = self.namespaced_key(key)?;
        let ttl = ttl.unwrap_or(self.config.default_ttl);

        let mut entries = self.entries.write().await;
        if !entries.contains_key(&namespaced_key) && entries.len() >= self.config.max_entries {
            let now = Instant::now();
            entries.retain(|_, entry| entry.expires_at > now);
            if entries.len() >= self.config.max_entries {
                return Err(PlatformError::CacheFull {
                    capacity: self.config.max_entries,
                });
            }
        }

        entries.insert(
            namespaced_key,
            CacheEntry {
                value: value.to_vec(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    /// Delete a value from the cache. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty.
    pub async fn delete(&self, key: &str) -> Result<(), PlatformError> {
        let namespaced_key = self.namespaced_key(key)?;
        self.entries.write().await.remove(&namespaced_key);
        Ok(())
    }

    /// Check if a live entry exists for the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty.
    pub async fn exists(&self, key: &str) -> Result<bool, PlatformError> {
        Ok(self.get(key).await?.is_some())
    }

    /// Get the namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    /// Get the configured default TTL.
    #[must_use]
    pub const fn default_ttl(&self) -> Duration {
        self.config.default_ttl
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no entries at all.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn namespaced_key(&self, key: &str) -> Result<String, PlatformError> {
        if key.is_empty() {
            return Err(PlatformError::invalid_input("cache key must not be empty"));
        }
        Ok(format!("{}:{}", self.config.namespace, key))
    }
}
