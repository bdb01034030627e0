//! Tower layer for rate limiting in Axum.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, Response, StatusCode},
};
use tower::{Layer, Service};

use crate::identity::{HasHeaders, HasPeerAddr, Identity};
use crate::limiter::FixedWindowLimiter;
use crate::store::CounterStore;

/// Tower layer for rate limiting.
// manual Clone impls keep S free of a Clone bound
pub struct RateLimitLayer<S, I> {
    limiter: Arc<FixedWindowLimiter<S>>,
    identity: I,
}

impl<S, I> RateLimitLayer<S, I> {
    /// Create a new rate limit layer.
    pub fn new(limiter: FixedWindowLimiter<S>, identity: I) -> Self {
        Self {
            limiter: Arc::new(limiter),
            identity,
        }
    }

    /// Create a layer sharing an already-wrapped limiter.
    pub fn from_shared(limiter: Arc<FixedWindowLimiter<S>>, identity: I) -> Self {
        Self { limiter, identity }
    }
}

impl<S, I: Clone> Clone for RateLimitLayer<S, I> {
    fn clone(&self) -> Self {
        Self {
            limiter: self.limiter.clone(),
            identity: self.identity.clone(),
        }
    }
}

impl<S, I, Inner> Layer<Inner> for RateLimitLayer<S, I>
where
    I: Clone,
{
    type Service = RateLimitService<S, I, Inner>;

    fn layer(&self, inner: Inner) -> Self::Service {
        RateLimitService {
            inner,
            limiter: self.limiter.clone(),
            identity: self.identity.clone(),
        }
    }
}

/// The rate limiting service.
pub struct RateLimitService<S, I, Inner> {
    inner: Inner,
    limiter: Arc<FixedWindowLimiter<S>>,
    identity: I,
}

impl<S, I, Inner> Clone for RateLimitService<S, I, Inner>
where
    I: Clone,
    Inner: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            limiter: self.limiter.clone(),
            identity: self.identity.clone(),
        }
    }
}

/// Wrapper around an Axum request for identity extraction.
pub struct AxumRequest<'a> {
    request: &'a Request<Body>,
}

impl<'a> AxumRequest<'a> {
    fn new(request: &'a Request<Body>) -> Self {
        Self { request }
    }
}

impl HasPeerAddr for AxumRequest<'_> {
    fn peer_addr(&self) -> Option<SocketAddr> {
        // Populated by serving with connect info.
        self.request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0)
    }
}

impl HasHeaders for AxumRequest<'_> {
    fn header(&self, name: &str) -> Option<&str> {
        self.request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
    }
}

impl<S, I, Inner> Service<Request<Body>> for RateLimitService<S, I, Inner>
where
    S: CounterStore,
    I: for<'a> Identity<AxumRequest<'a>> + Clone,
    Inner: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    Inner::Future: Send,
{
    type Response = Response<Body>;
    type Error = Inner::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        let limiter = self.limiter.clone();
        let identity = self.identity.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let extracted = identity.extract(&AxumRequest::new(&request));
            let Some(client) = extracted else {
                tracing::error!(extractor = identity.name(), "client identity unavailable");
                return Ok(status_response(StatusCode::INTERNAL_SERVER_ERROR));
            };

            let decision = match limiter.check_and_record(&client).await {
                Ok(decision) => decision,
                Err(err) => {
                    tracing::error!(identity = %client, error = %err, "rate limit check failed");
                    // Fail closed: an unreachable store rejects the request
                    // rather than waiving the limit.
                    return Ok(status_response(StatusCode::INTERNAL_SERVER_ERROR));
                }
            };

            if decision.is_denied() {
                tracing::warn!(identity = %client, "blocked due to too many requests");
                let mut response = Response::new(Body::from("Error"));
                *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;
                return Ok(response);
            }

            // Propagate usage metadata on the request so downstream handlers
            // can report current usage.
            let info = decision.into_info();
            for (name, value) in info.to_headers() {
                if let Ok(header_value) = value.parse() {
                    request.headers_mut().insert(name, header_value);
                }
            }
            request.extensions_mut().insert(info);

            inner.call(request).await
        })
    }
}

fn status_response(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use crate::identity::PeerIpIdentity;
    use crate::quota::Quota;
    use crate::store::MemoryStore;

    #[test]
    fn test_layer_creation() {
        let limiter = FixedWindowLimiter::new(MemoryStore::new(), Quota::per_second(10));
        let layer = RateLimitLayer::new(limiter, PeerIpIdentity::new());

        assert_eq!(layer.limiter.max_rate(), 10);
    }

    #[test]
    fn test_axum_request_peer_addr() {
        let mut request = Request::new(Body::empty());
        let addr: SocketAddr = "192.0.2.1:4000".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));

        let wrapped = AxumRequest::new(&request);
        assert_eq!(wrapped.peer_addr(), Some(addr));
    }

    #[test]
    fn test_axum_request_missing_connect_info() {
        let request = Request::new(Body::empty());
        let wrapped = AxumRequest::new(&request);
        assert_eq!(wrapped.peer_addr(), None);
    }
}
