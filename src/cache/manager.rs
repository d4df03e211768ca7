//! Response cache with three-state freshness
//!
//! Provides a `ResponseCache` that keeps JSON payloads in memory keyed by
//! [`CacheKey`], supporting graceful degradation when the API is unavailable.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde_json::Value;

use super::CacheKey;

/// How long a cached response counts as fresh (12 hours)
pub const CACHE_TTL: Duration = Duration::milliseconds(43_200_000);

/// A stored response
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The cached payload
    data: Value,
    /// When the payload was stored
    stored_at: DateTime<Utc>,
}

/// Freshness of a cache slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Stored less than [`CACHE_TTL`] ago
    Fresh,
    /// Stored, but older than [`CACHE_TTL`]; still usable as a last resort
    Stale,
    /// Nothing stored for this key
    Missing,
}

impl Freshness {
    /// Classifies an entry stored at `stored_at` as seen at `now`
    pub fn classify(stored_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now - stored_at < CACHE_TTL {
            Freshness::Fresh
        } else {
            Freshness::Stale
        }
    }

    /// Whether there is any data to fall back to
    pub fn is_available(self) -> bool {
        self != Freshness::Missing
    }
}

/// Keeps the last successful response for each request identity
///
/// Writes replace the whole entry under the key's shard lock, so concurrent
/// readers see either the old or the new entry, never a mix.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: DashMap<CacheKey, CacheEntry>,
}

impl ResponseCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether `key` is fresh, stale, or missing
    pub fn freshness(&self, key: &CacheKey) -> Freshness {
        self.freshness_at(key, Utc::now())
    }

    /// Same as [`ResponseCache::freshness`] against an explicit clock reading
    pub fn freshness_at(&self, key: &CacheKey, now: DateTime<Utc>) -> Freshness {
        match self.entries.get(key) {
            Some(entry) => Freshness::classify(entry.stored_at, now),
            None => Freshness::Missing,
        }
    }

    /// Returns the stored payload regardless of freshness
    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        self.entries.get(key).map(|entry| entry.data.clone())
    }

    /// Returns the time the payload for `key` was stored
    pub fn stored_at(&self, key: &CacheKey) -> Option<DateTime<Utc>> {
        self.entries.get(key).map(|entry| entry.stored_at)
    }

    /// Stores `data` under `key`, replacing any previous entry
    pub fn put(&self, key: CacheKey, data: Value) {
        self.put_at(key, data, Utc::now());
    }

    /// Stores `data` with an explicit timestamp
    pub(crate) fn put_at(&self, key: CacheKey, data: Value, stored_at: DateTime<Utc>) {
        self.entries.insert(key, CacheEntry { data, stored_at });
    }

    /// Removes every entry
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
