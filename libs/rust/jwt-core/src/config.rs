//! Configuration for the JWKS stack.
//!
//! Values come from environment variables (after loading `.env`) and feed
//! the platform collaborators: HTTP client, cache client and tracing.

use rust_common::{CacheClient, CacheClientConfig, HttpConfig, TracingConfig};
use std::env;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::error::JwtError;
use crate::events::EventSink;
use crate::jwks::{
    DEFAULT_USER_AGENT, JwksCache, JwksFetcher, JwksJwtVerifier, JwksResolver, ReqwestHttpClient,
};

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Default JWKS cache TTL
    pub cache_ttl: Duration,
    /// Cache namespace
    pub cache_namespace: String,
    /// JWKS request timeout
    pub fetch_timeout: Duration,
    /// JWKS connect timeout
    pub connect_timeout: Duration,
    /// `User-Agent` sent with JWKS requests
    pub user_agent: String,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit JSON logs
    pub log_json: bool,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(3600),
            cache_namespace: "jwt-core".to_string(),
            fetch_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl JwtConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`JwtError::Config`] if a variable is set but invalid.
    pub fn from_env() -> Result<Self, JwtError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// As [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, JwtError> {
        let defaults = Self::default();

        let cache_ttl = Duration::from_secs(parse_var(&lookup, "JWKS_CACHE_TTL", 3600)?);
        if cache_ttl.is_zero() {
            return Err(JwtError::Config("JWKS_CACHE_TTL must be positive".to_string()));
        }
        let fetch_timeout = Duration::from_secs(parse_var(&lookup, "JWKS_FETCH_TIMEOUT", 10)?);
        let connect_timeout = Duration::from_secs(parse_var(&lookup, "JWKS_CONNECT_TIMEOUT", 5)?);

        Ok(Self {
            cache_ttl,
            cache_namespace: lookup("JWKS_CACHE_NAMESPACE").unwrap_or(defaults.cache_namespace),
            fetch_timeout,
            connect_timeout,
            user_agent: lookup("JWKS_USER_AGENT").unwrap_or(defaults.user_agent),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_json: parse_var(&lookup, "LOG_JSON", false)?,
        })
    }

    /// Set the cache TTL.
    #[must_use]
    pub const fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// HTTP client settings.
    #[must_use]
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig::default()
            .with_timeout(self.fetch_timeout)
            .with_connect_timeout(self.connect_timeout)
            .with_user_agent(self.user_agent.clone())
    }

    /// Cache client settings.
    #[must_use]
    pub fn cache_config(&self) -> CacheClientConfig {
        CacheClientConfig::default()
            .with_namespace(self.cache_namespace.clone())
            .with_default_ttl(self.cache_ttl)
    }

    /// Tracing settings.
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig::default()
            .with_service_name("jwt-core")
            .with_log_level(self.log_level.clone())
            .with_json_output(self.log_json)
    }

    /// Assemble a verifier over a rustls HTTP client and an in-process cache.
    ///
    /// # Errors
    ///
    /// [`JwtError::Config`] when the HTTP client cannot be built.
    pub fn build_verifier(
        &self,
        clock: Arc<dyn Clock>,
        events: Arc<dyn EventSink>,
    ) -> Result<JwksJwtVerifier<ReqwestHttpClient, CacheClient>, JwtError> {
        let http = ReqwestHttpClient::new(&self.http_config())?;
        let fetcher = JwksFetcher::new(http, events.clone()).with_user_agent(self.user_agent.clone());
        let cache = JwksCache::new(CacheClient::new(self.cache_config()), events.clone())
            .with_default_ttl(self.cache_ttl);
        Ok(JwksJwtVerifier::new(
            JwksResolver::new(fetcher, cache),
            clock,
            events,
        ))
    }
}

/// Parse variable with default value.
fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, JwtError>
where
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|e| JwtError::Config(format!("Invalid {name}: {e}"))),
        None => Ok(default),
    }
}
