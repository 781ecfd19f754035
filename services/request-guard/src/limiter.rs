// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Token bucket rate limiter.
//!
//! Each identifier owns a bucket holding up to `capacity` tokens. Tokens
//! are restored lazily: every evaluation first tops the bucket up for the
//! time elapsed since the previous one, then tries to take a single token.
//! There is no background refill task.
//!
//! [`TokenBucketPolicy`] is the pure algorithm over one bucket and an injected
//! timestamp. [`RateLimiter`] pairs it with a [`BucketStore`] and runs the
//! fetch, refill, consume and persist steps as one atomic transaction per
//! identifier.

use crate::config::LimiterConfig;
use crate::store::{Bucket, BucketStore};
use tracing::{debug, warn};

/// Outcome of evaluating one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// A token was consumed
    Admitted,
    /// No whole token was available
    Rejected {
        /// Whole seconds until at least one token will be available
        retry_after_secs: u64,
    },
}

impl Decision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Decision::Admitted)
    }

    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Decision::Admitted => None,
            Decision::Rejected { retry_after_secs } => Some(*retry_after_secs),
        }
    }
}

/// Refill and consume rules shared by every bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenBucketPolicy {
    capacity: f64,
    refill_rate_per_ms: f64,
    admit_tolerance: f64,
}

impl TokenBucketPolicy {
    /// `admit_tolerance` is how far below one whole token a bucket may be
    /// and still admit; see [`crate::config::STRICT_TOLERANCE`].
    pub fn new(capacity: f64, refill_rate_per_ms: f64, admit_tolerance: f64) -> Self {
        Self {
            capacity,
            refill_rate_per_ms,
            admit_tolerance,
        }
    }

    pub fn from_config(config: &LimiterConfig) -> Self {
        Self::new(
            config.capacity(),
            config.refill_rate_per_ms(),
            config.admit_tolerance,
        )
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn refill_rate_per_ms(&self) -> f64 {
        self.refill_rate_per_ms
    }

    /// Top the bucket up for the time elapsed since its last refill and
    /// restamp it with `now`. A clock that moved backwards adds nothing.
    pub fn refill(&self, bucket: &mut Bucket, now: u64) {
        let elapsed_ms = now.saturating_sub(bucket.last_refill_at);
        bucket.tokens =
            (bucket.tokens + elapsed_ms as f64 * self.refill_rate_per_ms).min(self.capacity);
        bucket.last_refill_at = now;
    }

    /// Refill `bucket` up to `now`, then take one token if one is available.
    pub fn evaluate(&self, bucket: &mut Bucket, now: u64) -> Decision {
        self.refill(bucket, now);

        if bucket.tokens >= 1.0 - self.admit_tolerance {
            bucket.tokens = (bucket.tokens - 1.0).max(0.0);
            Decision::Admitted
        } else {
            Decision::Rejected {
                retry_after_secs: self.retry_after_secs(bucket.tokens),
            }
        }
    }

    /// Seconds until a bucket holding `tokens` reaches one whole token,
    /// rounded up.
    pub fn retry_after_secs(&self, tokens: f64) -> u64 {
        let wait_ms = (1.0 - tokens).max(0.0) / self.refill_rate_per_ms;
        (wait_ms / 1000.0).ceil() as u64
    }
}

/// Thread-safe per-identifier rate limiter.
#[derive(Debug)]
pub struct RateLimiter {
    policy: TokenBucketPolicy,
    store: BucketStore,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: &LimiterConfig) -> Self {
        Self::with_policy(TokenBucketPolicy::from_config(config))
    }

    pub fn with_policy(policy: TokenBucketPolicy) -> Self {
        Self {
            store: BucketStore::new(policy.capacity()),
            policy,
        }
    }

    /// Evaluate a request from `identifier` at `now` (milliseconds).
    pub fn check(&self, identifier: &str, now: u64) -> Decision {
        let (decision, tokens) = self.store.with_bucket(identifier, now, |bucket| {
            let decision = self.policy.evaluate(bucket, now);
            (decision, bucket.tokens)
        });

        match decision {
            Decision::Admitted => {
                debug!(identifier, remaining = tokens, "Request admitted");
            }
            Decision::Rejected { retry_after_secs } => {
                warn!(
                    identifier,
                    tokens,
                    retry_after_secs,
                    "Security event: rate limit blocked"
                );
            }
        }

        decision
    }

    pub fn store(&self) -> &BucketStore {
        &self.store
    }

    pub fn policy(&self) -> &TokenBucketPolicy {
        &self.policy
    }
}
