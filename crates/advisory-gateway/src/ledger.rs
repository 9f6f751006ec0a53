// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Running cost and telemetry counters for the gateway.
//!
//! All counters are atomics so concurrent invokes to distinct cache keys
//! never lose increments. `total_calls` counts only true provider
//! invocations, never cache hits. Cost accumulates in integer
//! micro-dollars and is converted to f64 only when a snapshot is taken.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Read-only view of the ledger plus the current cache entry count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Provider invocations (cache hits excluded).
    pub total_calls: u64,
    /// Requests served from the cache.
    pub cache_hits: u64,
    /// `cache_hits / (total_calls + cache_hits)`, 0.0 when nothing ran.
    pub hit_rate: f64,
    /// Tokens consumed by provider invocations.
    pub total_tokens: u64,
    /// Estimated spend in USD.
    pub estimated_cost_usd: f64,
    /// Entries currently in the cache.
    pub entry_count: usize,
}

/// Process-lifetime usage counters, reset only by explicit operator action.
#[derive(Debug, Default)]
pub struct UsageLedger {
    total_calls: AtomicU64,
    cache_hits: AtomicU64,
    total_tokens: AtomicU64,
    cost_micros: AtomicU64,
}

impl UsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one true provider invocation.
    pub fn record_call(&self, tokens: u32, cost_usd: f64) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        self.total_tokens.fetch_add(tokens as u64, Ordering::Relaxed);
        let micros = (cost_usd * 1_000_000.0).round() as u64;
        self.cost_micros.fetch_add(micros, Ordering::Relaxed);
    }

    /// Record one cache hit.
    pub fn record_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Current counters as a snapshot.
    pub fn snapshot(&self, entry_count: usize) -> UsageSnapshot {
        let total_calls = self.total_calls.load(Ordering::Relaxed);
        let cache_hits = self.cache_hits.load(Ordering::Relaxed);
        let served = total_calls + cache_hits;
        UsageSnapshot {
            total_calls,
            cache_hits,
            hit_rate: if served == 0 {
                0.0
            } else {
                cache_hits as f64 / served as f64
            },
            total_tokens: self.total_tokens.load(Ordering::Relaxed),
            estimated_cost_usd: self.cost_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0,
            entry_count,
        }
    }

    /// Zero all counters. Explicit operator action only.
    pub fn reset(&self) {
        self.total_calls.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        self.total_tokens.store(0, Ordering::Relaxed);
        self.cost_micros.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let ledger = UsageLedger::new();
        ledger.record_call(100, 0.0015);
        ledger.record_call(50, 0.00075);
        ledger.record_hit();

        let snap = ledger.snapshot(2);
        assert_eq!(snap.total_calls, 2);
        assert_eq!(snap.cache_hits, 1);
        assert_eq!(snap.total_tokens, 150);
        assert!((snap.estimated_cost_usd - 0.00225).abs() < 1e-9);
        assert!((snap.hit_rate - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(snap.entry_count, 2);
    }

    #[test]
    fn empty_ledger_has_zero_hit_rate() {
        let snap = UsageLedger::new().snapshot(0);
        assert_eq!(snap.hit_rate, 0.0);
        assert_eq!(snap.total_calls, 0);
    }

    #[test]
    fn reset_zeroes_everything() {
        let ledger = UsageLedger::new();
        ledger.record_call(100, 1.0);
        ledger.record_hit();
        ledger.reset();

        let snap = ledger.snapshot(0);
        assert_eq!(snap.total_calls, 0);
        assert_eq!(snap.cache_hits, 0);
        assert_eq!(snap.total_tokens, 0);
        assert_eq!(snap.estimated_cost_usd, 0.0);
    }
}
