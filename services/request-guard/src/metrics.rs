// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for the request guard.

use crate::limiter::Decision;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Counters and gauges exported on the metrics endpoint.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    decisions: IntCounterVec,
    invalid_requests: IntCounter,
    tracked_identifiers: IntGauge,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("tracked_identifiers", &self.tracked_identifiers.get())
            .finish_non_exhaustive()
    }
}

impl Metrics {
    /// Create a private registry and register all collectors into it.
    ///
    /// # Errors
    /// Returns an error if a collector cannot be registered.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let decisions = IntCounterVec::new(
            Opts::new("request_guard_decisions_total", "Rate limit decisions"),
            &["outcome"],
        )?;
        let invalid_requests = IntCounter::new(
            "request_guard_invalid_requests_total",
            "Requests rejected before rate limiting",
        )?;
        let tracked_identifiers = IntGauge::new(
            "request_guard_tracked_identifiers",
            "Distinct identifiers holding a bucket",
        )?;

        registry.register(Box::new(decisions.clone()))?;
        registry.register(Box::new(invalid_requests.clone()))?;
        registry.register(Box::new(tracked_identifiers.clone()))?;

        Ok(Self {
            registry,
            decisions,
            invalid_requests,
            tracked_identifiers,
        })
    }

    pub fn record_decision(&self, decision: &Decision) {
        let outcome = if decision.is_admitted() {
            "admitted"
        } else {
            "blocked"
        };
        self.decisions.with_label_values(&[outcome]).inc();
    }

    pub fn record_invalid(&self) {
        self.invalid_requests.inc();
    }

    pub fn set_tracked_identifiers(&self, count: usize) {
        self.tracked_identifiers
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    pub fn decision_count(&self, outcome: &str) -> u64 {
        self.decisions.with_label_values(&[outcome]).get()
    }

    /// Render every registered metric in the text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
