//! Time-bounded memoization shared across requests.
//!
//! Entries expire lazily: a read that finds an entry older than the TTL
//! removes it and reports a miss. Nothing sweeps the map in the background.
//!
//! There is no single-flight: two requests that miss the same key at the same
//! time both compute, and the last `put` wins. That costs duplicate work, not
//! correctness.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::{Arc, Mutex};

/// Result cache lifetime.
pub const RESULT_CACHE_TTL_SECS: i64 = 600;
/// Alias cache lifetime.
pub const ALIAS_CACHE_TTL_SECS: i64 = 1800;

/// Source of the current time, injectable so expiry can be tested.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Internal cache entry with timestamp
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// String-keyed cache whose entries expire `ttl` after insertion.
pub struct TtlCache<T> {
    name: &'static str,
    entries: DashMap<String, CacheEntry<T>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(name: &'static str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    /// Cached value for `key`, or `None` if absent or older than the TTL.
    /// Expired entries are removed.
    pub fn get(&self, key: &str) -> Option<T> {
        let now = self.clock.now();
        let ttl = self.ttl;
        if self
            .entries
            .remove_if(key, |_, entry| now - entry.cached_at > ttl)
            .is_some()
        {
            tracing::debug!("{} cache expired: {}", self.name, key);
            return None;
        }

        match self.entries.get(key) {
            Some(entry) => {
                tracing::debug!("{} cache hit: {}", self.name, key);
                Some(entry.data.clone())
            }
            None => {
                tracing::debug!("{} cache miss: {}", self.name, key);
                None
            }
        }
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn put(&self, key: impl Into<String>, value: T) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                data: value,
                cached_at: self.clock.now(),
            },
        );
    }

    /// Number of stored entries, expired ones included until they are read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
