// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Traffic pattern definitions.

/// Configuration for a traffic simulation.
#[derive(Debug, Clone)]
pub struct TrafficPattern {
    /// Requests issued by each identifier
    pub requests_per_identifier: usize,
    /// Distinct identifiers, interleaved round-robin
    pub identifiers: usize,
    /// Simulated milliseconds between consecutive requests of one identifier
    pub interval_ms: u64,
    /// Timestamp of the first request
    pub start_ms: u64,
}

impl Default for TrafficPattern {
    fn default() -> Self {
        Self {
            requests_per_identifier: 100,
            identifiers: 1,
            interval_ms: 0,
            start_ms: 0,
        }
    }
}

impl TrafficPattern {
    /// One identifier hammering at a single instant.
    pub fn instant_flood() -> Self {
        Self {
            requests_per_identifier: 50,
            ..Default::default()
        }
    }

    /// One identifier at exactly the sustained rate for ten simulated minutes.
    pub fn steady_rate(refill_rate_per_ms: f64) -> Self {
        let interval_ms = (1.0 / refill_rate_per_ms).ceil() as u64;
        Self {
            requests_per_identifier: 360,
            interval_ms,
            ..Default::default()
        }
    }

    /// One identifier at ten requests per second.
    pub fn fast_drip() -> Self {
        Self {
            requests_per_identifier: 600,
            interval_ms: 100,
            ..Default::default()
        }
    }

    /// Many identifiers, each sending a full burst at once.
    pub fn distributed_burst() -> Self {
        Self {
            requests_per_identifier: 8,
            identifiers: 250,
            ..Default::default()
        }
    }

    pub fn total_requests(&self) -> usize {
        self.requests_per_identifier * self.identifiers
    }
}
