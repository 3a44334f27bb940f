//! Observability events.
//!
//! Sinks only observe: [`EventSink::emit`] cannot fail and its outcome never
//! influences verification or resolution.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::jwt::Algorithm;

/// Something worth recording happened in the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JwtEvent {
    /// JWKS request is about to be sent
    FetchStarted {
        /// Endpoint
        uri: String,
    },
    /// JWKS was fetched and parsed
    FetchCompleted {
        /// Endpoint
        uri: String,
        /// Number of keys in the set
        key_count: usize,
    },
    /// JWKS fetch or parse failed
    FetchFailed {
        /// Endpoint
        uri: String,
        /// Error description
        reason: String,
    },
    /// Cached key set was dropped
    CacheInvalidated {
        /// Endpoint whose entry was dropped
        uri: String,
        /// Why it was dropped
        reason: String,
    },
    /// Token verification began
    VerificationStarted {
        /// Algorithm from the token header, when it could be read
        algorithm: Option<Algorithm>,
    },
    /// Token verified
    VerificationCompleted {
        /// Algorithm used
        algorithm: Algorithm,
    },
    /// Token rejected
    VerificationFailed {
        /// Algorithm from the token header, when it could be read
        algorithm: Option<Algorithm>,
        /// Stable error code
        error_code: &'static str,
        /// Error description
        reason: String,
    },
}

impl JwtEvent {
    /// Short name used as a log field and metric label.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::FetchStarted { .. } => "fetch_started",
            Self::FetchCompleted { .. } => "fetch_completed",
            Self::FetchFailed { .. } => "fetch_failed",
            Self::CacheInvalidated { .. } => "cache_invalidated",
            Self::VerificationStarted { .. } => "verification_started",
            Self::VerificationCompleted { .. } => "verification_completed",
            Self::VerificationFailed { .. } => "verification_failed",
        }
    }
}

/// Receiver of [`JwtEvent`]s.
pub trait EventSink: Send + Sync {
    /// Record an event.
    fn emit(&self, event: &JwtEvent);
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn emit(&self, event: &JwtEvent) {
        (**self).emit(event);
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: &JwtEvent) {}
}

/// Logs every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: &JwtEvent) {
        match event {
            JwtEvent::FetchStarted { uri } => {
                debug!(target: "jwks", event = event.name(), uri = %uri, "Fetching JWKS");
            }
            JwtEvent::FetchCompleted { uri, key_count } => {
                info!(
                    target: "jwks",
                    event = event.name(),
                    uri = %uri,
                    key_count = key_count,
                    "JWKS fetched"
                );
            }
            JwtEvent::FetchFailed { uri, reason } => {
                warn!(target: "jwks", event = event.name(), uri = %uri, reason = %reason, "JWKS fetch failed");
            }
            JwtEvent::CacheInvalidated { uri, reason } => {
                info!(
                    target: "jwks",
                    event = event.name(),
                    uri = %uri,
                    reason = %reason,
                    "JWKS cache entry invalidated"
                );
            }
            JwtEvent::VerificationStarted { algorithm } => {
                debug!(target: "jwt", event = event.name(), algorithm = ?algorithm, "Verifying token");
            }
            JwtEvent::VerificationCompleted { algorithm } => {
                debug!(target: "jwt", event = event.name(), algorithm = %algorithm, "Token verified");
            }
            JwtEvent::VerificationFailed {
                algorithm,
                error_code,
                reason,
            } => {
                warn!(
                    target: "jwt",
                    event = event.name(),
                    algorithm = ?algorithm,
                    error_code = %error_code,
                    reason = %reason,
                    "Token rejected"
                );
            }
        }
    }
}

/// Forwards each event to every inner sink, in order.
#[derive(Default, Clone)]
pub struct CompositeEventSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl CompositeEventSink {
    /// Empty fan-out.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink.
    #[must_use]
    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl EventSink for CompositeEventSink {
    fn emit(&self, event: &JwtEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}
