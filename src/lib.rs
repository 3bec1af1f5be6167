//! Gatekeeper - In-process Fixed-Window Rate Limiting
//!
//! This crate implements the request throttling used in front of the site's
//! API and contact form. Each limiter instance owns a bounded in-memory table
//! of per-client counters; the HTTP layer identifies clients and maps limiter
//! decisions onto `429` responses and `X-RateLimit-*` headers.

pub mod config;
pub mod error;
pub mod http;
pub mod ratelimit;
