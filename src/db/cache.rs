// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Response cache keyed by inbound request URL.
//!
//! Entries expire purely by TTL; there is no invalidation API. Expired
//! entries are dropped when read, and swept on write once the map is large
//! and the earliest known expiry has passed.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Entry count above which writes sweep expired entries.
const SWEEP_THRESHOLD: usize = 1024;

/// Sentinel for "no entry expires".
const NEVER: u64 = u64::MAX;

/// Key-value store for serialized JSON responses.
pub trait ResponseCache: Send + Sync {
    /// Return the cached value for `key` if present and not expired.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key` for `ttl`, replacing any previous entry.
    fn put(&self, key: &str, value: String, ttl: Duration);
}

#[derive(Clone)]
struct CacheEntry {
    value: String,
    /// `None` when the TTL overflows the clock, i.e. never expires
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Process-wide in-memory cache.
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
    /// Reference point for `next_expiry`
    epoch: Instant,
    /// Earliest expiry among held entries, in nanoseconds after `epoch`
    next_expiry: AtomicU64,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
            epoch: Instant::now(),
            next_expiry: AtomicU64::new(NEVER),
        }
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries held, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<String> {
        {
            let entry = self.entries.get(key)?;
            if entry.is_live(now) {
                return Some(entry.value.clone());
            }
        }

        // Lazy eviction; the read guard above must be released first.
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        None
    }

    fn put_at(&self, key: &str, value: String, ttl: Duration, now: Instant) {
        let expires_at = now.checked_add(ttl);
        if let Some(at) = expires_at {
            self.next_expiry
                .fetch_min(self.offset(at), Ordering::Relaxed);
        }
        self.entries
            .insert(key.to_string(), CacheEntry { value, expires_at });

        if self.entries.len() > SWEEP_THRESHOLD
            && self.offset(now) >= self.next_expiry.load(Ordering::Relaxed)
        {
            self.sweep(now);
        }
    }

    /// Drop every expired entry and recompute the earliest expiry.
    fn sweep(&self, now: Instant) {
        let before = self.entries.len();
        self.next_expiry.store(NEVER, Ordering::Relaxed);
        self.entries.retain(|_, entry| {
            let live = entry.is_live(now);
            if let (true, Some(at)) = (live, entry.expires_at) {
                self.next_expiry
                    .fetch_min(self.offset(at), Ordering::Relaxed);
            }
            live
        });
        tracing::debug!(
            evicted = before.saturating_sub(self.entries.len()),
            remaining = self.entries.len(),
            "Swept response cache"
        );
    }

    fn offset(&self, at: Instant) -> u64 {
        let nanos = at.saturating_duration_since(self.epoch).as_nanos();
        u64::try_from(nanos).unwrap_or(NEVER - 1)
    }
}

impl ResponseCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.get_at(key, Instant::now())
    }

    fn put(&self, key: &str, value: String, ttl: Duration) {
        self.put_at(key, value, ttl, Instant::now());
    }
}
