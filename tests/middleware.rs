//! Integration tests for the Axum rate limit layer.
#![cfg(all(feature = "memory", feature = "axum"))]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
};
use quotagate::{
    CounterStore, FixedWindowLimiter, MemoryStore, Quota, RateLimitLayer,
    error::{Result, StoreError},
    identity::PeerIpIdentity,
};
use tower::ServiceExt;

/// Reporting handler: current used rate from the propagated headers.
async fn dump_usage(headers: HeaderMap) -> Response {
    match quotagate::headers::used_rate(&headers) {
        Ok(used) => (StatusCode::OK, used.to_string()).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

fn app<S: CounterStore>(store: S, quota: Quota) -> Router {
    Router::new()
        .fallback(dump_usage)
        .layer(RateLimitLayer::new(
            FixedWindowLimiter::new(store, quota),
            PeerIpIdentity::new(),
        ))
}

fn request_from(addr: &str) -> Request<Body> {
    let mut request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let addr: SocketAddr = addr.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_admitted_request_reports_used_rate() {
    let app = app(MemoryStore::new(), Quota::per_hour(10));

    for used in 1..=3 {
        let response = app
            .clone()
            .oneshot(request_from("203.0.113.50:1234"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, used.to_string());
    }
}

#[tokio::test]
async fn test_over_limit_returns_429_with_error_body() {
    let app = app(MemoryStore::new(), Quota::per_hour(2));

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(request_from("203.0.113.50:1234"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(request_from("203.0.113.50:1234"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_string(response).await, "Error");
}

#[tokio::test]
async fn test_distinct_peers_have_independent_quotas() {
    let app = app(MemoryStore::new(), Quota::per_hour(1));

    let response = app
        .clone()
        .oneshot(request_from("203.0.113.50:1234"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request_from("203.0.113.50:1234"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // A different origin still has its full quota.
    let response = app
        .clone()
        .oneshot(request_from("198.51.100.7:1234"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_identity_is_service_error_without_store_call() {
    let store = Arc::new(MemoryStore::new());
    let app = app(store.clone(), Quota::per_hour(10));

    // No connect info on the request: identity extraction fails.
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(store.is_empty(), "store must not be consulted");
}

/// A store that is always unreachable.
struct FailingStore;

impl CounterStore for FailingStore {
    async fn increment(&self, _key: &str) -> Result<u64> {
        Err(StoreError::ConnectionFailed("connection refused".into()).into())
    }

    async fn expire_at(&self, _key: &str, _deadline_unix: u64) -> Result<()> {
        Err(StoreError::ConnectionFailed("connection refused".into()).into())
    }
}

#[tokio::test]
async fn test_store_failure_fails_closed() {
    let app = app(FailingStore, Quota::per_hour(10));

    let response = app
        .oneshot(request_from("203.0.113.50:1234"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_usage_endpoint_without_limiter_metadata_errors() {
    // The reporting transform must fail rather than default to zero when the
    // headers are absent.
    let app: Router = Router::new().fallback(dump_usage);

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
