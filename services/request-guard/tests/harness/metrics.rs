// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome collection for traffic simulation results.

use std::collections::HashMap;

/// Possible outcomes for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Admitted,
    Blocked,
}

/// Collects outcomes during a simulation.
#[derive(Debug, Default)]
pub struct TrafficMetrics {
    /// Count of requests by outcome
    outcomes: HashMap<Outcome, usize>,
    /// Admitted requests by identifier
    admitted_per_identifier: HashMap<String, usize>,
    /// Retry hints handed out, in seconds
    retry_hints: Vec<u64>,
    /// First and last timestamp seen
    span: Option<(u64, u64)>,
}

impl TrafficMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one request outcome at `now`.
    pub fn record(&mut self, outcome: Outcome, identifier: &str, now: u64, retry_hint: Option<u64>) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        if outcome == Outcome::Admitted {
            *self
                .admitted_per_identifier
                .entry(identifier.to_string())
                .or_insert(0) += 1;
        }
        if let Some(secs) = retry_hint {
            self.retry_hints.push(secs);
        }
        self.span = Some(match self.span {
            Some((first, last)) => (first.min(now), last.max(now)),
            None => (now, now),
        });
    }

    pub fn total_requests(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    pub fn admitted_for(&self, identifier: &str) -> usize {
        self.admitted_per_identifier
            .get(identifier)
            .copied()
            .unwrap_or(0)
    }

    /// Ratio of blocked to total.
    pub fn block_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        self.count(Outcome::Blocked) as f64 / total as f64
    }

    pub fn max_retry_hint(&self) -> Option<u64> {
        self.retry_hints.iter().copied().max()
    }

    /// Simulated milliseconds between the first and last request.
    pub fn span_ms(&self) -> u64 {
        self.span.map(|(first, last)| last - first).unwrap_or(0)
    }

    pub fn report(&self) -> TrafficReport {
        TrafficReport {
            total_requests: self.total_requests(),
            admitted: self.count(Outcome::Admitted),
            blocked: self.count(Outcome::Blocked),
            block_rate: self.block_rate(),
            span_ms: self.span_ms(),
            max_retry_hint: self.max_retry_hint(),
            identifiers_admitted: self.admitted_per_identifier.len(),
        }
    }
}

/// Summary of a simulation run.
#[derive(Debug, Clone)]
pub struct TrafficReport {
    pub total_requests: usize,
    pub admitted: usize,
    pub blocked: usize,
    pub block_rate: f64,
    pub span_ms: u64,
    pub max_retry_hint: Option<u64>,
    pub identifiers_admitted: usize,
}

impl std::fmt::Display for TrafficReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Traffic Report ===")?;
        writeln!(f, "Simulated span:    {} ms", self.span_ms)?;
        writeln!(f, "Total Requests:    {}", self.total_requests)?;
        writeln!(f, "Admitted:          {}", self.admitted)?;
        writeln!(f, "Blocked:           {}", self.blocked)?;
        writeln!(f, "Block Rate:        {:.1}%", self.block_rate * 100.0)?;
        writeln!(f, "Max Retry Hint:    {:?} s", self.max_retry_hint)?;
        writeln!(f, "Admitted IDs:      {}", self.identifiers_admitted)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collection() {
        let mut metrics = TrafficMetrics::new();
        metrics.record(Outcome::Admitted, "a", 0, None);
        metrics.record(Outcome::Admitted, "b", 10, None);
        metrics.record(Outcome::Blocked, "a", 20, Some(2));

        assert_eq!(metrics.total_requests(), 3);
        assert_eq!(metrics.count(Outcome::Admitted), 2);
        assert_eq!(metrics.admitted_for("a"), 1);
        assert_eq!(metrics.max_retry_hint(), Some(2));
        assert_eq!(metrics.span_ms(), 20);
    }

    #[test]
    fn test_block_rate() {
        let mut metrics = TrafficMetrics::new();
        for _ in 0..3 {
            metrics.record(Outcome::Admitted, "a", 0, None);
        }
        for _ in 0..7 {
            metrics.record(Outcome::Blocked, "a", 0, Some(1));
        }
        assert!((metrics.block_rate() - 0.7).abs() < 0.01);
    }
}
