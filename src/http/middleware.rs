//! Axum middleware that enforces a rate limiter.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{trace, warn};

use super::client_ip::client_key;
use super::headers::{apply_rate_limit_headers, too_many_requests, X_RATELIMIT_LIMIT};
use crate::ratelimit::RateLimiterBackend;

/// Middleware state: one limiter and a name for log output.
#[derive(Clone)]
pub struct RateLimitGuard {
    name: &'static str,
    limiter: Arc<dyn RateLimiterBackend>,
}

impl RateLimitGuard {
    /// Create a guard; `name` labels its log lines.
    pub fn new(name: &'static str, limiter: Arc<dyn RateLimiterBackend>) -> Self {
        Self { name, limiter }
    }

    /// The label used in log output.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Reject the request with `429` when the client is over its limit.
///
/// Admitted requests run the inner handler and carry `X-RateLimit-*`
/// headers. When guards are nested, the innermost one stamps the headers.
pub async fn rate_limit(
    State(guard): State<RateLimitGuard>,
    request: Request,
    next: Next,
) -> Response {
    let peer_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let key = client_key(request.headers(), peer_ip);

    let decision = guard.limiter.check(&key);

    if !decision.is_allowed() {
        warn!(
            guard = guard.name,
            client = %key,
            path = %request.uri().path(),
            retry_after_seconds = decision.retry_after_seconds().unwrap_or(0),
            "Rate limit exceeded"
        );
        return too_many_requests(&decision);
    }

    trace!(
        guard = guard.name,
        client = %key,
        remaining = decision.remaining(),
        "Request admitted"
    );

    let mut response = next.run(request).await;
    if !response.headers().contains_key(X_RATELIMIT_LIMIT) {
        apply_rate_limit_headers(response.headers_mut(), &decision);
    }
    response
}
