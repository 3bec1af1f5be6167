//! Mapping of rate limit decisions onto HTTP responses.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::ratelimit::RateLimitDecision;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Set the `X-RateLimit-*` headers for a decision.
///
/// `X-RateLimit-Reset` is the window end in epoch seconds, rounded up.
pub fn apply_rate_limit_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(decision.limit()));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(decision.remaining()));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(decision.reset_epoch_seconds()));
}

/// Build the `429 Too Many Requests` response for a rejected request.
pub fn too_many_requests(decision: &RateLimitDecision) -> Response {
    let retry_after = decision.retry_after_seconds().unwrap_or(0);

    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({
            "error": "Too many requests. Please try again later.",
            "retry_after_seconds": retry_after,
        })),
    )
        .into_response();

    let headers = response.headers_mut();
    headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    apply_rate_limit_headers(headers, decision);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_headers() {
        let decision = RateLimitDecision::Allowed {
            limit: 60,
            remaining: 59,
            reset_at: 1_700_000_000_500,
        };
        let mut headers = HeaderMap::new();
        apply_rate_limit_headers(&mut headers, &decision);

        assert_eq!(headers[X_RATELIMIT_LIMIT], "60");
        assert_eq!(headers[X_RATELIMIT_REMAINING], "59");
        assert_eq!(headers[X_RATELIMIT_RESET], "1700000001");
    }

    #[test]
    fn test_too_many_requests_response() {
        let decision = RateLimitDecision::Rejected {
            limit: 5,
            reset_at: 90_000,
            retry_after_seconds: 42,
        };
        let response = too_many_requests(&decision);

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
        assert_eq!(response.headers()[X_RATELIMIT_LIMIT], "5");
        assert_eq!(response.headers()[X_RATELIMIT_REMAINING], "0");
        assert_eq!(response.headers()[X_RATELIMIT_RESET], "90");
    }
}
