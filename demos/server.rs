//! HTTP service enforcing a shared rate limit, in-memory store.
//!
//! Every request is counted per peer IP; admitted requests reach the
//! fallback handler, which reports the current used rate from the usage
//! metadata headers the layer attached.
//!
//! Configuration via environment: `HOST` (default 0.0.0.0:8080),
//! `WINDOW_SECS` (default 60), `MAX_RATE` (default 60).
//!
//! Run with: cargo run --example server --features axum

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use quotagate::{FixedWindowLimiter, MemoryStore, Quota, RateLimitLayer, identity::PeerIpIdentity};

async fn dump_usage(headers: HeaderMap) -> Response {
    match quotagate::headers::used_rate(&headers) {
        Ok(used) => (StatusCode::OK, used.to_string()).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "get current used rate failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let host: String = env_or("HOST", "0.0.0.0:8080".to_string());
    let window_secs: u64 = env_or("WINDOW_SECS", 60);
    let max_rate: u64 = env_or("MAX_RATE", 60);

    let quota = Quota::try_new(max_rate, Duration::from_secs(window_secs)).expect("invalid quota");
    let limiter = FixedWindowLimiter::new(MemoryStore::new(), quota);

    let app = Router::new()
        .fallback(dump_usage)
        .layer(RateLimitLayer::new(limiter, PeerIpIdentity::new()));

    let listener = tokio::net::TcpListener::bind(&host)
        .await
        .expect("bind failed");
    tracing::info!("server started on {host}");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server stopped due to error");
}
