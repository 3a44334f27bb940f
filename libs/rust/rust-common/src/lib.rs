//! Shared library for cross-cutting concerns in auth-platform Rust libraries.
//!
//! This crate provides centralized implementations for:
//! - Error types with retryability classification
//! - HTTP client configuration and building
//! - Namespaced TTL cache client
//! - Tracing subscriber bootstrap

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache_client;
pub mod error;
pub mod http;
pub mod tracing_config;

pub use cache_client::{CacheClient, CacheClientConfig};
pub use error::PlatformError;
pub use http::{HttpConfig, build_http_client};
pub use tracing_config::{TracingConfig, init_tracing};
