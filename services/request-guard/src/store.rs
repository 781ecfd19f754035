// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Identity-keyed bucket store.
//!
//! Buckets are created full on the first request for an identifier and live
//! for the rest of the process. Entries are never evicted, so the number of
//! tracked identifiers grows with the number of distinct callers.
//!
//! The map is sharded: holding a bucket locks only its shard, so unrelated
//! identifiers are evaluated without contending on a global lock.

use dashmap::mapref::one::RefMut;
use dashmap::DashMap;
use tracing::trace;

/// Per-identifier token bucket state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    /// Available tokens, always within `[0, capacity]`
    pub tokens: f64,
    /// Millisecond timestamp of the last refill
    pub last_refill_at: u64,
}

impl Bucket {
    /// A full bucket, as seen on an identifier's first request.
    pub fn full(capacity: f64, now: u64) -> Self {
        Self {
            tokens: capacity,
            last_refill_at: now,
        }
    }
}

/// Exclusive handle on one stored bucket. Mutations through the handle are
/// persisted in place; the shard stays locked until it is dropped.
pub type BucketGuard<'a> = RefMut<'a, String, Bucket>;

/// Concurrent map from identifier to bucket.
#[derive(Debug)]
pub struct BucketStore {
    capacity: f64,
    buckets: DashMap<String, Bucket>,
}

impl BucketStore {
    /// Create an empty store whose new buckets start with `capacity` tokens.
    pub fn new(capacity: f64) -> Self {
        Self {
            capacity,
            buckets: DashMap::new(),
        }
    }

    /// Fetch the bucket for `identifier`, creating a full one stamped `now`
    /// if this is the first time the identifier is seen. Existing buckets
    /// are returned untouched.
    pub fn get_or_create(&self, identifier: &str, now: u64) -> BucketGuard<'_> {
        if let Some(bucket) = self.buckets.get_mut(identifier) {
            return bucket;
        }

        self.buckets
            .entry(identifier.to_string())
            .or_insert_with(|| {
                trace!(identifier, now, "Creating bucket");
                Bucket::full(self.capacity, now)
            })
    }

    /// Overwrite the stored bucket for `identifier`.
    pub fn save(&self, identifier: &str, bucket: Bucket) {
        self.buckets.insert(identifier.to_string(), bucket);
    }

    /// Run `f` on the bucket for `identifier` while holding it exclusively.
    ///
    /// This is the unit of atomicity: concurrent calls for the same
    /// identifier are serialized, calls for different identifiers are not
    /// (beyond sharing a shard).
    pub fn with_bucket<R>(&self, identifier: &str, now: u64, f: impl FnOnce(&mut Bucket) -> R) -> R {
        let mut guard = self.get_or_create(identifier, now);
        f(guard.value_mut())
    }

    /// Copy of the current state for `identifier`, if tracked.
    pub fn snapshot(&self, identifier: &str) -> Option<Bucket> {
        self.buckets.get(identifier).map(|bucket| *bucket)
    }

    /// Number of tracked identifiers.
    ///
    /// Locks every shard; must not be called while holding a [`BucketGuard`].
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }
}
