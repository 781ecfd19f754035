// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the request guard.
//!
//! The bucket store and limiter have no failure modes of their own. Errors
//! exist only at the edges: configuration loaded at startup, and malformed
//! requests rejected before the limiter is consulted.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Configuration errors, surfaced once at process start.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid burst capacity {0}: must be at least 1")]
    InvalidCapacity(u32),

    #[error("Invalid refill rate: limit_per_minute must be greater than zero")]
    InvalidRate,

    #[error("Invalid admit tolerance {0}: must be finite and within [0, 1)")]
    InvalidTolerance(f64),

    #[error("Invalid bind address: {0}")]
    InvalidBindAddr(String),

    #[error("Invalid value for environment variable {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Request errors, raised by the HTTP layer before the limiter runs.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    /// No identifier and no fallback configured, or no input to check.
    #[error("Missing userId or input")]
    MissingField,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
