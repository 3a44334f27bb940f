//! Cache-first key set resolution.

use tracing::{debug, instrument, warn};

use crate::error::JwtError;
use crate::jwks::cache::{CacheStore, JwksCache};
use crate::jwks::fetcher::JwksFetcher;
use crate::jwks::http::HttpClient;
use crate::jwks::model::JsonWebKeySet;
use crate::jwks::uri::JwksUri;

/// Serves key sets from the cache, fetching on a miss.
///
/// Concurrent misses for one URI each fetch and overwrite the entry;
/// there is no single-flight coordination.
pub struct JwksResolver<H, S> {
    fetcher: JwksFetcher<H>,
    cache: JwksCache<S>,
}

impl<H: HttpClient, S: CacheStore> JwksResolver<H, S> {
    /// Resolver over a fetcher and a cache.
    pub const fn new(fetcher: JwksFetcher<H>, cache: JwksCache<S>) -> Self {
        Self { fetcher, cache }
    }

    /// Cached set, or fetch and cache it.
    ///
    /// # Errors
    ///
    /// The fetch error on a miss. A failed cache write is logged, not returned.
    #[instrument(skip(self), fields(host = %uri.host()))]
    pub async fn resolve(&self, uri: &JwksUri) -> Result<JsonWebKeySet, JwtError> {
        if let Some(set) = self.cache.get(uri).await {
            return Ok(set);
        }
        debug!(target: "jwks", uri = %uri, "JWKS cache miss");
        self.fetch_and_store(uri).await
    }

    /// Clear the entry, then fetch and cache unconditionally.
    ///
    /// # Errors
    ///
    /// The fetch error.
    #[instrument(skip(self), fields(host = %uri.host()))]
    pub async fn refresh(&self, uri: &JwksUri) -> Result<JsonWebKeySet, JwtError> {
        if let Err(e) = self.cache.force_refresh(uri).await {
            warn!(target: "jwks", uri = %uri, error = %e, "Failed to clear JWKS cache before refresh");
        }
        self.fetch_and_store(uri).await
    }

    pub(crate) async fn invalidate(&self, uri: &JwksUri, reason: &str) {
        if let Err(e) = self.cache.invalidate_on_failure(uri, reason).await {
            warn!(target: "jwks", uri = %uri, error = %e, "Failed to invalidate JWKS cache entry");
        }
    }

    async fn fetch_and_store(&self, uri: &JwksUri) -> Result<JsonWebKeySet, JwtError> {
        let set = self.fetcher.fetch(uri).await?;
        if let Err(e) = self.cache.store(uri, &set, None).await {
            warn!(target: "jwks", uri = %uri, error = %e, "Failed to cache JWKS");
        }
        Ok(set)
    }
}
