//! HTTP surface: client identification, rate limit middleware and routes.

mod client_ip;
mod headers;
mod middleware;
mod routes;
mod server;

pub use client_ip::client_key;
pub use headers::{
    apply_rate_limit_headers, too_many_requests, X_RATELIMIT_LIMIT, X_RATELIMIT_REMAINING,
    X_RATELIMIT_RESET,
};
pub use middleware::{rate_limit, RateLimitGuard};
pub use routes::{router, ContactSubmission, Locale, SiteLimiters};
pub use server::HttpServer;
