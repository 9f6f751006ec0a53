// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content-addressed response cache with TTL expiry and an LRU bound.
//!
//! Keys hash `(model, whitespace-normalized prompt, temperature bucketed
//! to 0.1)`. Expiry is checked on read; the entry count bound is enforced
//! on insert by evicting the least-recently-used entry. Timestamps use
//! `tokio::time::Instant` so tests can drive expiry with a paused clock.

use std::time::Duration;

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tokio::time::Instant;

use advisory_core::types::TokenUsage;

/// Compute the content-addressed cache key for a request.
pub fn cache_key(model: &str, prompt: &str, temperature: f64) -> String {
    let normalized: String = prompt.split_whitespace().collect::<Vec<_>>().join(" ");
    let bucket = (temperature * 10.0).round() as i64;
    let digest = Sha256::digest(format!("{model}\n{bucket}\n{normalized}").as_bytes());
    format!("{digest:x}")
}

struct CacheEntry {
    text: String,
    usage: TokenUsage,
    created_at: Instant,
    last_used: Instant,
}

/// Memoized provider responses, keyed by content hash.
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    max_entries: usize,
}

impl ResponseCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Look up a live entry, refreshing its recency. Expired entries are
    /// removed and reported as misses.
    pub fn get(&self, key: &str) -> Option<(String, TokenUsage)> {
        let now = Instant::now();
        let expired = {
            let mut entry = self.entries.get_mut(key)?;
            if now.duration_since(entry.created_at) >= self.ttl {
                true
            } else {
                entry.last_used = now;
                return Some((entry.text.clone(), entry.usage));
            }
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    /// Store a response, evicting the least-recently-used entry if the
    /// table is at capacity.
    pub fn insert(&self, key: String, text: String, usage: TokenUsage) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.evict_lru();
        }
        let now = Instant::now();
        self.entries.insert(
            key,
            CacheEntry {
                text,
                usage,
                created_at: now,
                last_used: now,
            },
        );
    }

    /// Empty the cache. The usage ledger is untouched by design of the
    /// caller; this type knows nothing about it.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_lru(&self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().last_used)
            .map(|entry| entry.key().clone());
        if let Some(key) = victim {
            self.entries.remove(&key);
        }
    }
}
