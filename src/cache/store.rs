//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with per-key TTL, lazy expiry on
//! read and a sampled sweep over the expiring keys registry.
//!
//! # Locking
//! Entries and the registry sit behind independent `RwLock`s. Whenever both are
//! needed the entries lock is taken first; the sweeper never holds the registry
//! lock while it touches entries.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::trace;

use crate::cache::entry::CacheEntry;
use crate::cache::registry::ExpiringKeys;
use crate::cache::stats::{CacheStats, StatsRecorder};

// == Sweep Report ==
/// Outcome of one sampling pass over the expiring keys registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Registry slots that were examined
    pub sampled: usize,
    /// Expired entries removed from the store
    pub evicted: usize,
    /// Registry slots dropped because the key was gone or had no TTL anymore
    pub stale: usize,
    /// Draws that found the registry already drained
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SampleOutcome {
    Live,
    Evicted,
    Stale,
}

// == Cache Store ==
/// Thread-safe key-value store with per-key TTL.
///
/// Reads never return an expired value: a read that finds one removes it before
/// reporting a miss. Expired entries nobody reads are reclaimed by [`sweep`],
/// which the sweeper task calls on every tick.
///
/// [`sweep`]: CacheStore::sweep
pub struct CacheStore<K, V> {
    /// Key-value storage, the source of truth for liveness
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    /// Sampling hints for the sweeper
    expiring: RwLock<ExpiringKeys<K>>,
    /// Performance statistics
    stats: StatsRecorder,
    /// Set once by `close`, after which writes are ignored
    closed: AtomicBool,
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates a new empty CacheStore.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            expiring: RwLock::new(ExpiringKeys::new()),
            stats: StatsRecorder::default(),
            closed: AtomicBool::new(false),
        }
    }

    // == Get ==
    /// Retrieves a clone of the value stored under `key` if it is live.
    ///
    /// An expired entry is removed and reported as absent.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lookup(key, |entry| entry.value.clone())
    }

    // == Has ==
    /// Returns true if `key` holds a live entry, with the same lazy expiry as `get`.
    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lookup(key, |_| ()).is_some()
    }

    // == Set ==
    /// Stores a value, replacing any previous entry and its expiry.
    ///
    /// `ttl` of [`NO_EXPIRY`](crate::cache::NO_EXPIRY) stores the value without
    /// expiration. Any other `ttl` expires the entry `ttl` from now regardless of
    /// the TTL the key had before. Ignored once the store is closed.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let mut entries = self.write_entries();
        if self.is_closed() {
            return;
        }
        self.insert_locked(&mut entries, key, value, ttl, Instant::now());
    }

    // == Set If Absent ==
    /// Stores a value only if `key` is absent or expired.
    ///
    /// The check and the insert happen under one write lock, so out of any number
    /// of concurrent callers racing on an absent key exactly one returns true.
    pub fn set_if_absent(&self, key: K, value: V, ttl: Duration) -> bool {
        let mut entries = self.write_entries();
        if self.is_closed() {
            return false;
        }

        let now = Instant::now();
        if entries
            .get(&key)
            .is_some_and(|entry| !entry.is_expired_at(now))
        {
            return false;
        }

        self.insert_locked(&mut entries, key, value, ttl, now);
        true
    }

    // == Delete ==
    /// Removes an entry by key; a missing key is a no-op.
    ///
    /// The registry is left alone, the sweeper drops the stale hint later.
    pub fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.write_entries().remove(key);
    }

    // == Sweep ==
    /// Samples up to `sample_cap` registry slots at random and evicts the
    /// expired entries they point to.
    ///
    /// Each draw is taken over the registry's current length, so evictions
    /// earlier in the pass do not waste later draws. Draws are independent and
    /// may repeat; a draw on a registry drained meanwhile is skipped, not
    /// retried. Live entries are never touched.
    pub fn sweep<R>(&self, rng: &mut R, sample_cap: usize) -> SweepReport
    where
        R: Rng,
    {
        let mut report = SweepReport::default();
        if self.is_closed() {
            return report;
        }

        let len = self.read_expiring().len();
        if len == 0 {
            return report;
        }

        for _ in 0..len.min(sample_cap) {
            let (index, key) = {
                let expiring = self.read_expiring();
                let current_len = expiring.len();
                if current_len == 0 {
                    report.skipped += 1;
                    continue;
                }

                let index = rng.gen_range(0..current_len);
                match expiring.get(index) {
                    Some(key) => (index, key.clone()),
                    None => {
                        report.skipped += 1;
                        continue;
                    }
                }
            };
            report.sampled += 1;

            let outcome = self.attempt_eviction(&key);
            if outcome == SampleOutcome::Live {
                continue;
            }

            self.write_expiring().swap_remove_if(index, &key);
            if outcome == SampleOutcome::Evicted {
                report.evicted += 1;
            } else {
                report.stale += 1;
            }
        }

        self.stats.record_sweep(report.evicted, report.stale);
        report
    }

    // == Close ==
    /// Drops every entry and registry slot and ignores writes from now on.
    ///
    /// Returns false if the store was already closed.
    pub fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }

        let mut entries = self.write_entries();
        let mut expiring = self.write_expiring();
        *entries = HashMap::new();
        expiring.clear();
        true
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    // == Length ==
    /// Returns the number of entries in the store, expired ones included.
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    /// Returns the current length of the expiring keys registry.
    pub fn expiring_len(&self) -> usize {
        self.read_expiring().len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let total_entries = self.len();
        self.stats.snapshot(total_entries, self.expiring_len())
    }

    /// Shared read path for `get` and `has`.
    fn lookup<Q, T>(&self, key: &Q, read: impl FnOnce(&CacheEntry<V>) -> T) -> Option<T>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        let expired = {
            let entries = self.read_entries();
            match entries.get(key) {
                None => false,
                Some(entry) if entry.is_expired_at(now) => true,
                Some(entry) => {
                    self.stats.record_hit();
                    return Some(read(entry));
                }
            }
        };

        if expired {
            self.evict_if_expired(key, now);
        }
        self.stats.record_miss();
        None
    }

    /// Removes `key` if it is still expired once the write lock is held.
    fn evict_if_expired<Q>(&self, key: &Q, now: Instant)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut entries = self.write_entries();
        // Another writer may have replaced the entry between the two locks
        if entries
            .get(key)
            .is_some_and(|entry| entry.is_expired_at(now))
        {
            entries.remove(key);
            self.stats.record_lazy_eviction();
            trace!("Lazily evicted expired entry");
        }
    }

    /// Reconciles one registry hint against the store.
    fn attempt_eviction(&self, key: &K) -> SampleOutcome {
        let now = Instant::now();
        {
            let entries = self.read_entries();
            match entries.get(key) {
                Some(entry) if !entry.has_expiry() => return SampleOutcome::Stale,
                Some(entry) if !entry.is_expired_at(now) => return SampleOutcome::Live,
                Some(_) => {}
                None => return SampleOutcome::Stale,
            }
        }

        let mut entries = self.write_entries();
        match entries.get(key) {
            Some(entry) if entry.is_expired_at(now) => {
                entries.remove(key);
                SampleOutcome::Evicted
            }
            // Re-set in the meantime; a TTL set pushed its own hint
            _ => SampleOutcome::Stale,
        }
    }

    /// Inserts an entry; the caller holds the entries write lock.
    fn insert_locked(
        &self,
        entries: &mut HashMap<K, CacheEntry<V>>,
        key: K,
        value: V,
        ttl: Duration,
        now: Instant,
    ) {
        let entry = CacheEntry::new(value, ttl, now);
        if entry.has_expiry() {
            self.write_expiring().push(key.clone());
        }
        entries.insert(key, entry);
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_expiring(&self) -> RwLockReadGuard<'_, ExpiringKeys<K>> {
        self.expiring.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_expiring(&self) -> RwLockWriteGuard<'_, ExpiringKeys<K>> {
        self.expiring.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K, V> Default for CacheStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
