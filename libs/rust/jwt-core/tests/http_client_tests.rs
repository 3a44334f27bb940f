//! `ReqwestHttpClient` against a local mock server.

use jwt_core::jwks::{HttpClient, HttpRequest, JsonWebKeySet, ReqwestHttpClient};
use jwt_core::TransportError;
use rust_common::HttpConfig;
use std::time::Duration;
use test_utils::fixtures;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const JWKS_PATH: &str = "/.well-known/jwks.json";

fn client(timeout: Duration) -> ReqwestHttpClient {
    let config = HttpConfig::default()
        .with_timeout(timeout)
        .with_https_only(false);
    ReqwestHttpClient::new(&config).unwrap()
}

fn request(server: &MockServer) -> HttpRequest {
    HttpRequest::get(format!("{}{JWKS_PATH}", server.uri()))
        .header("Accept", "application/json")
        .header("Cache-Control", "no-cache")
}

#[tokio::test]
async fn test_sends_headers_and_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .and(header("accept", "application/json"))
        .and(header("cache-control", "no-cache"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(fixtures::default_jwks_document(), "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = client(Duration::from_secs(5))
        .send(request(&server))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.reason, "OK");
    assert_eq!(response.content_type(), Some("application/json"));
    let set = JsonWebKeySet::parse(std::str::from_utf8(&response.body).unwrap()).unwrap();
    assert!(set.find(fixtures::FIXTURE_KID).is_some());
}

#[tokio::test]
async fn test_error_status_is_returned_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let response = client(Duration::from_secs(5))
        .send(request(&server))
        .await
        .unwrap();

    assert_eq!(response.status, 503);
    assert_eq!(response.reason, "Service Unavailable");
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(fixtures::default_jwks_document())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = client(Duration::from_millis(100))
        .send(request(&server))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Timeout(_)), "got {err:?}");
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    let err = client(Duration::from_secs(2))
        .send(HttpRequest::get("http://127.0.0.1:9/jwks.json"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TransportError::Network(_) | TransportError::Timeout(_)
    ));
}

#[tokio::test]
async fn test_https_only_client_refuses_plain_http() {
    let server = MockServer::start().await;
    let strict = ReqwestHttpClient::new(&HttpConfig::default()).unwrap();

    let result = strict.send(request(&server)).await;
    assert!(result.is_err());
}
