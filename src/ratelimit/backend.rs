//! Rate limiter trait consumed by the HTTP layer.

use super::decision::RateLimitDecision;

/// Trait for rate limiter implementations.
///
/// The middleware only needs a decision per client key, so it depends on this
/// trait rather than on [`FixedWindowRateLimiter`](super::FixedWindowRateLimiter)
/// directly.
pub trait RateLimiterBackend: Send + Sync {
    /// Record a request for `key` and decide whether it is admitted.
    fn check(&self, key: &str) -> RateLimitDecision;
}
