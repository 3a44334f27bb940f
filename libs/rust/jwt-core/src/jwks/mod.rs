//! JWKS model, fetch, cache and resolution, plus JWKS-backed verification.

pub mod cache;
pub mod fetcher;
pub mod http;
pub mod model;
pub mod resolver;
pub mod uri;
pub mod verifier;

pub use cache::{CACHE_KEY_PREFIX, CacheStore, DEFAULT_CACHE_TTL, JwksCache, cache_key};
pub use fetcher::{DEFAULT_USER_AGENT, JwksFetcher};
pub use http::{HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use model::{JsonWebKey, JsonWebKeySet, KeyUse};
pub use resolver::JwksResolver;
pub use uri::JwksUri;
pub use verifier::{JwksJwtVerifier, REASON_KEY_NOT_FOUND, REASON_SIGNATURE_FAILED};
