//! Site API routes and their rate limit wiring.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use super::middleware::{rate_limit, RateLimitGuard};
use crate::config::RateLimitingConfig;
use crate::error::Result;
use crate::ratelimit::{Clock, FixedWindowRateLimiter, SystemClock};

/// The limiter instances guarding the site API.
#[derive(Debug, Clone)]
pub struct SiteLimiters {
    /// Applied to every route
    pub api: Arc<FixedWindowRateLimiter>,
    /// Applied on top of `api` for contact form submissions
    pub contact: Arc<FixedWindowRateLimiter>,
}

impl SiteLimiters {
    /// Build both limiters from configuration using the system clock.
    pub fn from_config(config: &RateLimitingConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &RateLimitingConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        Ok(Self {
            api: Arc::new(FixedWindowRateLimiter::with_clock(config.api, clock.clone())?),
            contact: Arc::new(FixedWindowRateLimiter::with_clock(config.contact, clock)?),
        })
    }
}

/// Build the API router.
pub fn router(limiters: &SiteLimiters) -> Router {
    let api_guard = RateLimitGuard::new("api", limiters.api.clone());
    let contact_guard = RateLimitGuard::new("contact", limiters.contact.clone());

    let contact = Router::new()
        .route("/api/contact", post(submit_contact))
        .route_layer(middleware::from_fn_with_state(contact_guard, rate_limit));

    Router::new()
        .route("/api/health", get(health))
        .merge(contact)
        .layer(middleware::from_fn_with_state(api_guard, rate_limit))
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Site language of the form the submission came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

/// A contact form submission.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(default)]
    pub locale: Locale,
}

impl ContactSubmission {
    fn validate(&self) -> std::result::Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => return Err("a valid email is required"),
        }
        if self.message.trim().is_empty() {
            return Err("message is required");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ContactAccepted {
    id: Uuid,
    status: &'static str,
}

/// Accept a contact form submission. Delivery happens downstream.
async fn submit_contact(Json(submission): Json<ContactSubmission>) -> Response {
    if let Err(reason) = submission.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": reason })),
        )
            .into_response();
    }

    let id = Uuid::new_v4();
    info!(
        submission_id = %id,
        locale = ?submission.locale,
        "Contact submission received"
    );

    (
        StatusCode::ACCEPTED,
        Json(ContactAccepted {
            id,
            status: "received",
        }),
    )
        .into_response()
}
