// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the request guard.
//!
//! The limiter policy is fixed for the lifetime of the process: it is read
//! once at startup, validated, and never reconfigured at runtime.

use crate::error::ConfigError;
use std::net::SocketAddr;
use std::str::FromStr;

/// Tolerance for "strict capacity": admit iff a whole token is available,
/// forgiving only floating-point rounding.
pub const STRICT_TOLERANCE: f64 = 1e-9;

/// Tolerance for "lenient margin": admit once 0.9 of a token has accrued.
pub const LENIENT_TOLERANCE: f64 = 0.1;

/// Configuration for the request guard service.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Token bucket policy
    pub limiter: LimiterConfig,

    /// Metrics configuration
    pub metrics: MetricsConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address (default: 0.0.0.0:3000)
    pub bind_addr: String,

    /// Shared bucket for requests that carry no identifier. When `None`,
    /// such requests are rejected as malformed.
    pub fallback_identifier: Option<String>,
}

/// Token bucket policy: "N requests per minute, burst B".
#[derive(Debug, Clone)]
pub struct LimiterConfig {
    /// Bucket capacity, i.e. the burst size (default: 8)
    pub burst_capacity: u32,

    /// Sustained requests per minute (default: 36)
    pub limit_per_minute: u32,

    /// Admit when `tokens >= 1 - admit_tolerance` (default: strict)
    pub admit_tolerance: f64,
}

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_burst_capacity() -> u32 {
    8
}

fn default_limit_per_minute() -> u32 {
    36
}

fn default_admit_tolerance() -> f64 {
    STRICT_TOLERANCE
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            limiter: LimiterConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            fallback_identifier: None,
        }
    }
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            burst_capacity: default_burst_capacity(),
            limit_per_minute: default_limit_per_minute(),
            admit_tolerance: default_admit_tolerance(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl LimiterConfig {
    /// Bucket capacity as a token count.
    pub fn capacity(&self) -> f64 {
        f64::from(self.burst_capacity)
    }

    /// Tokens restored per elapsed millisecond.
    pub fn refill_rate_per_ms(&self) -> f64 {
        f64::from(self.limit_per_minute) / 60_000.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.burst_capacity < 1 {
            return Err(ConfigError::InvalidCapacity(self.burst_capacity));
        }
        if self.limit_per_minute == 0 {
            return Err(ConfigError::InvalidRate);
        }
        if !self.admit_tolerance.is_finite() || !(0.0..1.0).contains(&self.admit_tolerance) {
            return Err(ConfigError::InvalidTolerance(self.admit_tolerance));
        }
        Ok(())
    }
}

impl Config {
    /// Check the whole configuration. Called once before serving.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limiter.validate()?;
        self.socket_addr()?;
        Ok(())
    }

    /// Parsed bind address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind_addr
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(self.server.bind_addr.clone()))
    }

    /// Load configuration from environment variables.
    ///
    /// - `BIND_ADDR`: bind address; otherwise `PORT` on all interfaces
    /// - `FALLBACK_IDENTIFIER`: shared bucket for unidentified requests
    /// - `BURST_CAPACITY`, `LIMIT_PER_MINUTE`, `ADMIT_TOLERANCE`: limiter policy
    /// - `METRICS_ENABLED`: expose `/metrics`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(addr) = lookup("BIND_ADDR") {
            config.server.bind_addr = addr;
        } else if let Some(port) = parse_var::<u16, _>(&lookup, "PORT")? {
            config.server.bind_addr = format!("0.0.0.0:{port}");
        }

        config.server.fallback_identifier =
            lookup("FALLBACK_IDENTIFIER").filter(|id| !id.trim().is_empty());

        if let Some(capacity) = parse_var(&lookup, "BURST_CAPACITY")? {
            config.limiter.burst_capacity = capacity;
        }
        if let Some(limit) = parse_var(&lookup, "LIMIT_PER_MINUTE")? {
            config.limiter.limit_per_minute = limit;
        }
        if let Some(tolerance) = parse_var(&lookup, "ADMIT_TOLERANCE")? {
            config.limiter.admit_tolerance = tolerance;
        }
        if let Some(enabled) = parse_var(&lookup, "METRICS_ENABLED")? {
            config.metrics.enabled = enabled;
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    let parsed = value.trim().parse::<T>();
    match parsed {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => Err(ConfigError::InvalidEnv { var, value }),
    }
}
