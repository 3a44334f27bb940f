//! Collaborator doubles shared by the integration tests.

#![allow(dead_code)]

use jwt_core::events::{EventSink, JwtEvent};
use jwt_core::jwks::{CacheStore, HttpClient, HttpRequest, HttpResponse};
use jwt_core::{FixedClock, JwksCache, JwksFetcher, JwksJwtVerifier, JwksResolver, TransportError};
use rust_common::PlatformError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use test_utils::fixtures;

/// HTTP client that serves a fixed response and counts requests.
#[derive(Clone)]
pub struct CountingHttpClient {
    response: Arc<Mutex<Result<HttpResponse, TransportError>>>,
    calls: Arc<AtomicUsize>,
}

impl CountingHttpClient {
    pub fn serving(body: impl Into<String>) -> Self {
        Self {
            response: Arc::new(Mutex::new(Ok(json_response(200, body.into())))),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(error: TransportError) -> Self {
        Self {
            response: Arc::new(Mutex::new(Err(error))),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn serve(&self, body: impl Into<String>) {
        *self.response.lock().unwrap() = Ok(json_response(200, body.into()));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HttpClient for CountingHttpClient {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.lock().unwrap().clone()
    }
}

pub fn json_response(status: u16, body: String) -> HttpResponse {
    HttpResponse {
        status,
        reason: "OK".to_string(),
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: body.into_bytes(),
    }
}

/// In-memory cache store whose entries tests can inspect and corrupt.
#[derive(Clone, Default)]
pub struct MemoryCacheStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    ttls: Arc<Mutex<HashMap<String, Option<Duration>>>>,
    deletes: Arc<AtomicUsize>,
}

impl MemoryCacheStore {
    pub fn put_raw(&self, key: &str, value: &[u8]) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
    }

    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.ttls.lock().unwrap().get(key).copied().flatten()
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PlatformError> {
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<(), PlatformError> {
        self.put_raw(key, value);
        self.ttls.lock().unwrap().insert(key.to_string(), ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), PlatformError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Cache store whose backend is always down.
#[derive(Clone, Default)]
pub struct UnavailableCacheStore;

impl CacheStore for UnavailableCacheStore {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, PlatformError> {
        Err(PlatformError::unavailable("cache down"))
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Option<Duration>) -> Result<(), PlatformError> {
        Err(PlatformError::unavailable("cache down"))
    }

    async fn delete(&self, _key: &str) -> Result<(), PlatformError> {
        Err(PlatformError::unavailable("cache down"))
    }
}

/// Event sink that keeps every event.
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<JwtEvent>>,
}

impl RecordingEventSink {
    pub fn events(&self) -> Vec<JwtEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(JwtEvent::name).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.names().into_iter().filter(|n| *n == name).count()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: &JwtEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Resolver plus handles on its doubles.
pub struct Harness<S> {
    pub http: CountingHttpClient,
    pub store: S,
    pub events: Arc<RecordingEventSink>,
    pub clock: Arc<FixedClock>,
}

impl<S: CacheStore + Clone> Harness<S> {
    pub fn resolver(&self) -> JwksResolver<CountingHttpClient, S> {
        let events: Arc<dyn EventSink> = self.events.clone();
        JwksResolver::new(
            JwksFetcher::new(self.http.clone(), events.clone()),
            JwksCache::new(self.store.clone(), events),
        )
    }

    pub fn verifier(&self) -> JwksJwtVerifier<CountingHttpClient, S> {
        JwksJwtVerifier::new(self.resolver(), self.clock.clone(), self.events.clone())
    }
}

pub fn harness() -> Harness<MemoryCacheStore> {
    harness_with(MemoryCacheStore::default())
}

pub fn harness_with<S>(store: S) -> Harness<S> {
    Harness {
        http: CountingHttpClient::serving(fixtures::default_jwks_document()),
        store,
        events: Arc::new(RecordingEventSink::default()),
        clock: Arc::new(FixedClock::at_timestamp(fixtures::FIXTURE_IAT)),
    }
}
