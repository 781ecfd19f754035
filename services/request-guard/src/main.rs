// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Request Guard Service
//!
//! Rate limits `POST /validate` per caller identifier with a token bucket
//! (burst 8, 36 requests per minute by default) and strips markup from the
//! input of admitted requests.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables and validated before
//! the server starts:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:3000)
//! - `PORT`: Port on all interfaces, used when `BIND_ADDR` is unset
//! - `BURST_CAPACITY`: Bucket capacity (default: 8)
//! - `LIMIT_PER_MINUTE`: Sustained rate (default: 36)
//! - `ADMIT_TOLERANCE`: Admit threshold slack below one token (default: 1e-9)
//! - `FALLBACK_IDENTIFIER`: Shared bucket for requests without `userId`
//! - `METRICS_ENABLED`: Expose `/metrics` (default: true)

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use request_guard::{
    clock::SystemClock,
    config::Config,
    handlers::{router, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load and validate configuration
    let config = Config::from_env()?;
    config.validate()?;
    let addr = config.socket_addr()?;

    info!(
        bind_addr = %addr,
        burst_capacity = config.limiter.burst_capacity,
        limit_per_minute = config.limiter.limit_per_minute,
        admit_tolerance = config.limiter.admit_tolerance,
        fallback_identifier = ?config.server.fallback_identifier,
        metrics_enabled = config.metrics.enabled,
        "Starting request guard"
    );

    let state = Arc::new(AppState::new(config, Arc::new(SystemClock))?);
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
