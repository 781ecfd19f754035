// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Request Guard
//!
//! This crate gates an input validation endpoint with a per-identity token
//! bucket:
//!
//! - Burst of 8 requests per identifier, refilling at 36 requests per minute
//! - Lazy refill computed at evaluation time, no background task
//! - Deterministic `Retry-After` hint on rejection
//! - Per-identifier atomicity over a sharded concurrent map
//! - Tag stripping of admitted input

pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod sanitizer;
pub mod store;

pub use config::Config;
pub use limiter::{Decision, RateLimiter, TokenBucketPolicy};
pub use store::{Bucket, BucketStore};
