//! TTL cache of parsed key sets.

use rust_common::{CacheClient, PlatformError};
use sha2::{Digest, Sha256};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::JwtError;
use crate::events::{EventSink, JwtEvent};
use crate::jwks::model::JsonWebKeySet;
use crate::jwks::uri::JwksUri;

/// Prefix of every cache key.
pub const CACHE_KEY_PREFIX: &str = "jwks.";

/// Default entry lifetime.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Byte cache backend.
pub trait CacheStore: Send + Sync {
    /// Value under `key`, `None` on miss.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, PlatformError>> + Send;

    /// Replace the value under `key`.
    fn set(
        &self,
        key: &str,
        value: &[u8],
        ttl: Option<Duration>,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Remove `key`; removing a missing key succeeds.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), PlatformError>> + Send;
}

impl CacheStore for CacheClient {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PlatformError> {
        Self::get(self, key).await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<(), PlatformError> {
        Self::set(self, key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), PlatformError> {
        Self::delete(self, key).await
    }
}

/// `"jwks." + hex(sha256(uri))`
#[must_use]
pub fn cache_key(uri: &JwksUri) -> String {
    format!("{CACHE_KEY_PREFIX}{:x}", Sha256::digest(uri.as_str().as_bytes()))
}

/// Key sets cached per URI.
///
/// Entries are replaced whole. A stored value that no longer parses is
/// treated as a miss and deleted.
pub struct JwksCache<S> {
    store: S,
    default_ttl: Duration,
    events: Arc<dyn EventSink>,
}

impl<S: CacheStore> JwksCache<S> {
    /// Cache with [`DEFAULT_CACHE_TTL`].
    pub fn new(store: S, events: Arc<dyn EventSink>) -> Self {
        Self {
            store,
            default_ttl: DEFAULT_CACHE_TTL,
            events,
        }
    }

    /// Override the default TTL.
    #[must_use]
    pub const fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Default TTL.
    #[must_use]
    pub const fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Cached set for `uri`. Backend errors and corrupt entries read as a miss.
    pub async fn get(&self, uri: &JwksUri) -> Option<JsonWebKeySet> {
        let key = cache_key(uri);
        let bytes = match self.store.get(&key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(target: "jwks", uri = %uri, error = %e, "JWKS cache read failed; treating as miss");
                return None;
            }
        };

        let parsed = std::str::from_utf8(&bytes)
            .map_err(|e| e.to_string())
            .and_then(|json| JsonWebKeySet::parse(json).map_err(|e| e.to_string()));
        match parsed {
            Ok(set) => {
                debug!(target: "jwks", uri = %uri, key_count = set.len(), "JWKS cache hit");
                Some(set)
            }
            Err(reason) => {
                warn!(target: "jwks", uri = %uri, reason = %reason, "Evicting corrupt JWKS cache entry");
                if let Err(e) = self.store.delete(&key).await {
                    warn!(target: "jwks", uri = %uri, error = %e, "Failed to evict corrupt JWKS cache entry");
                }
                None
            }
        }
    }

    /// Overwrite the entry for `uri`.
    ///
    /// # Errors
    ///
    /// [`JwtError::Cache`] when the backend rejects the write.
    pub async fn store(
        &self,
        uri: &JwksUri,
        set: &JsonWebKeySet,
        ttl: Option<Duration>,
    ) -> Result<(), JwtError> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        self.store
            .set(&cache_key(uri), set.to_json().as_bytes(), Some(ttl))
            .await?;
        debug!(target: "jwks", uri = %uri, ttl_secs = ttl.as_secs(), "JWKS cached");
        Ok(())
    }

    /// Drop the entry for `uri` without emitting an event.
    ///
    /// # Errors
    ///
    /// [`JwtError::Cache`] when the backend rejects the delete.
    pub async fn clear(&self, uri: &JwksUri) -> Result<(), JwtError> {
        self.store.delete(&cache_key(uri)).await?;
        Ok(())
    }

    /// Drop the entry because verification against it failed.
    ///
    /// # Errors
    ///
    /// As [`Self::clear`]. The event is emitted either way.
    pub async fn invalidate_on_failure(&self, uri: &JwksUri, reason: &str) -> Result<(), JwtError> {
        self.invalidate(uri, reason).await
    }

    /// Drop the entry ahead of an unconditional refetch.
    ///
    /// # Errors
    ///
    /// As [`Self::clear`]. The event is emitted either way.
    pub async fn force_refresh(&self, uri: &JwksUri) -> Result<(), JwtError> {
        self.invalidate(uri, "forced_refresh").await
    }

    async fn invalidate(&self, uri: &JwksUri, reason: &str) -> Result<(), JwtError> {
        let result = self.clear(uri).await;
        self.events.emit(&JwtEvent::CacheInvalidated {
            uri: uri.to_string(),
            reason: reason.to_string(),
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NoopEventSink;
    use rust_common::CacheClientConfig;
    use test_utils::fixtures;

    fn uri() -> JwksUri {
        JwksUri::parse(fixtures::JWKS_URI).unwrap()
    }

    fn set() -> JsonWebKeySet {
        JsonWebKeySet::parse(&fixtures::default_jwks_document()).unwrap()
    }

    #[test]
    fn test_cache_key_format() {
        let key = cache_key(&uri());
        assert!(key.starts_with("jwks."));
        assert_eq!(key.len(), 5 + 64);
        assert!(key[5..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

        let other = JwksUri::parse("https://other.example.com/jwks").unwrap();
        assert_ne!(cache_key(&other), key);
    }

    #[test]
    fn test_cache_key_known_digest() {
        let uri = JwksUri::parse("https://example.com/").unwrap();
        // sha256("https://example.com/")
        assert_eq!(
            cache_key(&uri),
            "jwks.0f115db062b7c0dd030b16878c99dea5c354b49dc37b38eb8846179c7783e9d7"
        );
    }

    #[tokio::test]
    async fn test_store_then_get() {
        let client = CacheClient::new(CacheClientConfig::default());
        let cache = JwksCache::new(client, Arc::new(NoopEventSink));

        assert!(cache.get(&uri()).await.is_none());
        cache.store(&uri(), &set(), None).await.unwrap();
        assert_eq!(cache.get(&uri()).await, Some(set()));

        cache.clear(&uri()).await.unwrap();
        assert!(cache.get(&uri()).await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_evicted() {
        let client = CacheClient::new(CacheClientConfig::default());
        client.set(&cache_key(&uri()), b"{not json", None).await.unwrap();
        let cache = JwksCache::new(client.clone(), Arc::new(NoopEventSink));

        assert!(cache.get(&uri()).await.is_none());
        assert!(!client.exists(&cache_key(&uri())).await.unwrap());
    }

    #[tokio::test]
    async fn test_short_ttl_expires() {
        let client = CacheClient::new(CacheClientConfig::default());
        let cache = JwksCache::new(client, Arc::new(NoopEventSink));

        cache
            .store(&uri(), &set(), Some(Duration::from_millis(20)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(cache.get(&uri()).await.is_none());
    }
}
