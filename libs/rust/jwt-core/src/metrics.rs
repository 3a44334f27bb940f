//! Prometheus counters fed from [`JwtEvent`]s.

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, register_int_counter, register_int_counter_vec};

use crate::events::{EventSink, JwtEvent};

/// Token verifications by algorithm and outcome.
pub static VERIFICATIONS: Lazy<Option<IntCounterVec>> = Lazy::new(|| {
    register_int_counter_vec!(
        "jwt_verifications_total",
        "Total number of token verifications",
        &["algorithm", "status"]
    )
    .ok()
});

/// JWKS fetches by outcome.
pub static JWKS_FETCHES: Lazy<Option<IntCounterVec>> = Lazy::new(|| {
    register_int_counter_vec!(
        "jwks_fetches_total",
        "Total number of JWKS fetches",
        &["status"]
    )
    .ok()
});

/// JWKS cache invalidations.
pub static JWKS_INVALIDATIONS: Lazy<Option<IntCounter>> = Lazy::new(|| {
    register_int_counter!(
        "jwks_cache_invalidations_total",
        "Total number of JWKS cache invalidations"
    )
    .ok()
});

/// Record a verification outcome.
pub fn record_verification(algorithm: &str, status: &str) {
    if let Some(counter) = VERIFICATIONS.as_ref() {
        counter.with_label_values(&[algorithm, status]).inc();
    }
}

/// Record a JWKS fetch outcome.
pub fn record_fetch(status: &str) {
    if let Some(counter) = JWKS_FETCHES.as_ref() {
        counter.with_label_values(&[status]).inc();
    }
}

/// Record a cache invalidation.
pub fn record_invalidation() {
    if let Some(counter) = JWKS_INVALIDATIONS.as_ref() {
        counter.inc();
    }
}

/// [`EventSink`] that updates the process-wide Prometheus counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsEventSink;

impl EventSink for MetricsEventSink {
    fn emit(&self, event: &JwtEvent) {
        match event {
            JwtEvent::FetchCompleted { .. } => record_fetch("success"),
            JwtEvent::FetchFailed { .. } => record_fetch("failure"),
            JwtEvent::CacheInvalidated { .. } => record_invalidation(),
            JwtEvent::VerificationCompleted { algorithm } => {
                record_verification(algorithm.as_str(), "success");
            }
            JwtEvent::VerificationFailed { algorithm, .. } => record_verification(
                algorithm.map_or("unknown", |alg| alg.as_str()),
                "failure",
            ),
            JwtEvent::FetchStarted { .. } | JwtEvent::VerificationStarted { .. } => {}
        }
    }
}
