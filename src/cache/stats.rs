//! Cache Statistics Module
//!
//! Tracks cache metrics including hits, misses, and both eviction paths.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time snapshot of cache metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of reads that found a live entry
    pub hits: u64,
    /// Number of reads that found nothing or an expired entry
    pub misses: u64,
    /// Entries removed because a read found them expired
    pub lazy_evictions: u64,
    /// Entries removed by the sweeper
    pub sweep_evictions: u64,
    /// Registry slots dropped because they no longer pointed at a TTL entry
    pub stale_hints: u64,
    /// Completed sweeper passes
    pub sweeps: u64,
    /// Current number of entries in the store
    pub total_entries: usize,
    /// Current length of the expiring keys registry
    pub expiring_keys: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Stats Recorder ==
/// Counters updated from concurrent readers without taking the store lock.
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    lazy_evictions: AtomicU64,
    sweep_evictions: AtomicU64,
    stale_hints: AtomicU64,
    sweeps: AtomicU64,
}

impl StatsRecorder {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_lazy_eviction(&self) {
        self.lazy_evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the outcome of one sweeper pass.
    pub(crate) fn record_sweep(&self, evicted: usize, stale: usize) {
        self.sweep_evictions.fetch_add(evicted as u64, Ordering::Relaxed);
        self.stale_hints.fetch_add(stale as u64, Ordering::Relaxed);
        self.sweeps.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Builds a snapshot with the given store and registry sizes.
    pub(crate) fn snapshot(&self, total_entries: usize, expiring_keys: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            lazy_evictions: self.lazy_evictions.load(Ordering::Relaxed),
            sweep_evictions: self.sweep_evictions.load(Ordering::Relaxed),
            stale_hints: self.stale_hints.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
            total_entries,
            expiring_keys,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = StatsRecorder::default().snapshot(0, 0);
        assert_eq!(stats, CacheStats::default());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let recorder = StatsRecorder::default();
        recorder.record_hit();
        recorder.record_hit();
        recorder.record_hit();
        recorder.record_miss();
        assert_eq!(recorder.snapshot(0, 0).hit_rate(), 0.75);
    }

    #[test]
    fn test_stats_serialize() {
        let recorder = StatsRecorder::default();
        recorder.record_hit();
        recorder.record_sweep(2, 1);

        let json = serde_json::to_value(recorder.snapshot(5, 3)).unwrap();
        assert_eq!(json["hits"], 1);
        assert_eq!(json["misses"], 0);
        assert_eq!(json["sweep_evictions"], 2);
        assert_eq!(json["stale_hints"], 1);
        assert_eq!(json["total_entries"], 5);
        assert_eq!(json["expiring_keys"], 3);
    }

    #[test]
    fn test_record_sweep() {
        let recorder = StatsRecorder::default();
        recorder.record_sweep(3, 1);
        recorder.record_sweep(0, 2);
        recorder.record_lazy_eviction();

        let stats = recorder.snapshot(7, 4);
        assert_eq!(stats.sweep_evictions, 3);
        assert_eq!(stats.stale_hints, 3);
        assert_eq!(stats.sweeps, 2);
        assert_eq!(stats.lazy_evictions, 1);
        assert_eq!(stats.total_entries, 7);
        assert_eq!(stats.expiring_keys, 4);
    }
}
