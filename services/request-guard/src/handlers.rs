// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the request guard service.
//!
//! The handlers own everything outside the limiter: request parsing,
//! identifier defaulting, reading the clock, sanitizing admitted input and
//! shaping the JSON responses.

use crate::clock::Clock;
use crate::config::Config;
use crate::error::RequestError;
use crate::limiter::{Decision, RateLimiter};
use crate::metrics::Metrics;
use crate::sanitizer::strip_tags;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

/// Confidence reported for admitted input.
const ADMIT_CONFIDENCE: f64 = 0.95;
/// Confidence reported for blocked requests.
const BLOCK_CONFIDENCE: f64 = 1.0;

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    pub limiter: RateLimiter,
    pub metrics: Metrics,
    pub clock: Arc<dyn Clock>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, clock: Arc<dyn Clock>) -> Result<Self, prometheus::Error> {
        Ok(Self {
            limiter: RateLimiter::new(&config.limiter),
            metrics: Metrics::new()?,
            clock,
            config,
        })
    }
}

/// Body of `POST /validate`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Response for admitted input.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmitResponse {
    pub blocked: bool,
    pub reason: String,
    pub sanitized_output: String,
    pub confidence: f64,
}

/// Response for rate limited requests.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockResponse {
    pub blocked: bool,
    pub reason: String,
    pub confidence: f64,
    pub retry_after_seconds: u64,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/validate", post(validate));

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(metrics));
    }

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "request-guard",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus scrape endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    state
        .metrics
        .set_tracked_identifiers(state.limiter.store().len());

    match state.metrics.render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Rate limit a caller and sanitize their input.
pub async fn validate(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Response, RequestError> {
    // An unreadable body is treated like one with no fields.
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => {
            debug!(error = %rejection, "Unreadable validation request body");
            state.metrics.record_invalid();
            return Err(RequestError::MissingField);
        }
    };

    let (identifier, input) = match resolve(&state.config, req.user_id, req.input) {
        Ok(parts) => parts,
        Err(err) => {
            state.metrics.record_invalid();
            return Err(err);
        }
    };

    let now = state.clock.now_millis();
    debug!(
        identifier = %identifier,
        category = ?req.category,
        now,
        "Processing validation request"
    );

    let decision = state.limiter.check(&identifier, now);
    state.metrics.record_decision(&decision);

    let response = match decision {
        Decision::Admitted => (
            StatusCode::OK,
            Json(AdmitResponse {
                blocked: false,
                reason: "Input passed all security checks".to_string(),
                sanitized_output: strip_tags(&input),
                confidence: ADMIT_CONFIDENCE,
            }),
        )
            .into_response(),
        Decision::Rejected { retry_after_secs } => (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, retry_after_secs.to_string())],
            Json(BlockResponse {
                blocked: true,
                reason: format!(
                    "Rate limit exceeded. Max {} req/min.",
                    state.config.limiter.limit_per_minute
                ),
                confidence: BLOCK_CONFIDENCE,
                retry_after_seconds: retry_after_secs,
            }),
        )
            .into_response(),
    };

    Ok(response)
}

/// Pick the bucket identifier and require input. Blank identifiers count
/// as missing.
fn resolve(
    config: &Config,
    user_id: Option<String>,
    input: Option<String>,
) -> Result<(String, String), RequestError> {
    let input = input
        .filter(|s| !s.is_empty())
        .ok_or(RequestError::MissingField)?;

    // Whitespace-only identifiers count as absent: they take the fallback
    // bucket when one is configured and are rejected otherwise.
    let identifier = user_id
        .filter(|id| !id.trim().is_empty())
        .or_else(|| config.server.fallback_identifier.clone())
        .ok_or(RequestError::MissingField)?;

    Ok((identifier, input))
}
