// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Cache statistics

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Statistics about cache performance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Reads answered with a fresh cached value
    pub hits: u64,
    /// Reads that started an upstream fetch
    pub misses: u64,
    /// Reads that joined a fetch already in flight
    pub coalesced: u64,
    /// Upstream fetches that succeeded
    pub refreshes: u64,
    /// Upstream fetches that failed
    pub upstream_failures: u64,
    /// Reads answered with a stale value
    pub stale_served: u64,
    /// Reads answered with `FetchFailed`
    pub fetch_failures: u64,
    /// Current number of keys in the cache
    pub entries: usize,
}

impl CacheStats {
    /// Share of reads answered without waiting on upstream, as a percentage (0.0 to 100.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.coalesced;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={}, misses={}, coalesced={}, refreshes={}, upstream_failures={}, stale_served={}, fetch_failures={}, entries={}, hit_rate={:.1}%",
            self.hits,
            self.misses,
            self.coalesced,
            self.refreshes,
            self.upstream_failures,
            self.stale_served,
            self.fetch_failures,
            self.entries,
            self.hit_rate()
        )
    }
}

/// Lock-free counters behind [`CacheStats`]
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    refreshes: AtomicU64,
    upstream_failures: AtomicU64,
    stale_served: AtomicU64,
    fetch_failures: AtomicU64,
}

impl StatsRecorder {
    pub(crate) fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn coalesced(&self) {
        self.coalesced.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn refreshed(&self) {
        self.refreshes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn upstream_failed(&self) {
        self.upstream_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn stale_served(&self) {
        self.stale_served.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn fetch_failed(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, entries: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            upstream_failures: self.upstream_failures.load(Ordering::Relaxed),
            stale_served: self.stale_served.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_empty_is_zero() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_recorder_snapshot() {
        let recorder = StatsRecorder::default();
        recorder.miss();
        recorder.hit();
        recorder.hit();
        recorder.hit();
        recorder.refreshed();

        let stats = recorder.snapshot(1);
        assert_eq!(stats.hits, 3);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.refreshes, 1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hit_rate(), 75.0);
    }

    #[test]
    fn test_display_includes_hit_rate() {
        let stats = CacheStats {
            hits: 1,
            misses: 1,
            ..Default::default()
        };
        assert!(stats.to_string().ends_with("hit_rate=50.0%"));
    }
}
