//! Feed cache with TTL (Time-To-Live) support.
//!
//! Entries hold serialized [`CachePayload`](calfeed_core::CachePayload)
//! JSON. Decoding is left to the caller so that an unreadable entry can be
//! dropped and refetched.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

/// One cached feed.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Serialized payload.
    pub payload: String,
    /// When the entry expires (monotonic clock). `None` when the TTL reaches
    /// past what the clock can represent.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    /// Creates a new cache entry with the given TTL.
    pub fn new(payload: impl Into<String>, ttl: Duration) -> Self {
        Self {
            payload: payload.into(),
            expires_at: Instant::now().checked_add(ttl),
        }
    }

    /// Returns true if the entry has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|expires_at| Instant::now() >= expires_at)
    }
}

/// In-memory feed cache keyed by source and range.
#[derive(Debug)]
pub struct FeedCache {
    default_ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl Default for FeedCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600))
    }
}

impl FeedCache {
    /// Creates a new cache with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            default_ttl,
            entries: HashMap::new(),
        }
    }

    /// Returns the default TTL.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns the payload stored under `key` if it has not expired.
    pub fn get_valid(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.payload.as_str())
    }

    /// Inserts or replaces an entry with the default TTL.
    pub fn insert(&mut self, key: impl Into<String>, payload: impl Into<String>) {
        let ttl = self.default_ttl;
        self.insert_with_ttl(key, payload, ttl);
    }

    /// Inserts or replaces an entry with a custom TTL.
    ///
    /// Expired entries are evicted first so the map only holds live feeds
    /// plus the one being stored.
    pub fn insert_with_ttl(&mut self, key: impl Into<String>, payload: impl Into<String>, ttl: Duration) {
        self.evict_expired();
        let key = key.into();
        let replaced = self
            .entries
            .insert(key.clone(), CacheEntry::new(payload, ttl))
            .is_some();
        debug!(key = %key, ttl_secs = ttl.as_secs(), replaced, "Stored cache entry");
    }

    /// Removes an entry.
    pub fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key);
        if entry.is_some() {
            debug!(key = %key, "Removed cache entry");
        }
        entry
    }

    /// Removes all expired entries and returns how many were removed.
    pub fn evict_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, entry| {
            let keep = !entry.is_expired();
            if !keep {
                trace!(key = %key, "Evicting expired cache entry");
            }
            keep
        });
        let evicted = before - self.entries.len();
        if evicted > 0 {
            debug!(evicted, "Evicted expired cache entries");
        }
        evicted
    }

    /// Returns the number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
