//! HotCache Module
//!
//! Owning handle that ties a [`CacheStore`] to the lifetime of its expiry sweeper.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::info;

use crate::cache::{CacheStats, CacheStore, SweepReport};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::tasks::spawn_sweeper_task;

// == Hot Cache ==
/// TTL cache with a running expiry sweeper.
///
/// The sweeper starts on construction and keeps running until [`stop`] is
/// called or the cache is dropped. After `stop` every operation is a no-op:
/// reads report absence, writes are ignored and `set_if_absent` returns false.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use hotcache::HotCache;
///
/// # #[tokio::main]
/// # async fn main() -> hotcache::Result<()> {
/// let cache: HotCache<String, u64> = HotCache::new()?;
/// cache.set("user:42".to_string(), 7, Duration::from_millis(250));
/// assert_eq!(cache.get("user:42"), Some(7));
/// cache.stop();
/// # Ok(())
/// # }
/// ```
///
/// [`stop`]: HotCache::stop
pub struct HotCache<K, V> {
    store: Arc<CacheStore<K, V>>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
    config: Config,
}

impl<K, V> HotCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache with the default configuration on the current tokio runtime.
    pub fn new() -> Result<Self> {
        Self::with_config(Config::default())
    }

    /// Creates a cache on the current tokio runtime.
    ///
    /// Fails with [`CacheError::NoRuntime`] outside of a runtime context.
    pub fn with_config(config: Config) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;
        Self::with_handle(config, &runtime)
    }

    /// Creates a cache whose sweeper runs on `runtime`.
    ///
    /// The cache operations themselves are synchronous and can be called from
    /// any thread, inside or outside that runtime.
    pub fn with_handle(config: Config, runtime: &Handle) -> Result<Self> {
        config.validate()?;

        let store = Arc::new(CacheStore::new());
        let sweeper = spawn_sweeper_task(store.clone(), &config, runtime);

        Ok(Self {
            store,
            sweeper: Mutex::new(Some(sweeper)),
            config,
        })
    }

    // == Store Operations ==
    /// Returns the live value for `key`, evicting it first if it has expired.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.get(key)
    }

    /// Returns true if `key` holds a live value.
    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.has(key)
    }

    /// Stores `value` under `key`; a `ttl` of [`NO_EXPIRY`](crate::NO_EXPIRY) never expires.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        self.store.set(key, value, ttl)
    }

    /// Stores `value` only if `key` is absent or expired, returning whether it did.
    pub fn set_if_absent(&self, key: K, value: V, ttl: Duration) -> bool {
        self.store.set_if_absent(key, value, ttl)
    }

    /// Removes `key`; a missing key is a no-op.
    pub fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.delete(key)
    }

    // == Sweep ==
    /// Runs one sampling pass right away, outside the sweeper schedule.
    pub fn sweep(&self) -> SweepReport {
        self.store.sweep(&mut rand::thread_rng(), self.config.sample_cap)
    }

    // == Stop ==
    /// Stops the sweeper and drops every stored value.
    ///
    /// Calling it again is a no-op.
    pub fn stop(&self) {
        if let Some(sweeper) = self.take_sweeper() {
            sweeper.abort();
        }

        if self.store.close() {
            info!("Cache stopped, sweeper aborted and entries released");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.store.is_closed()
    }

    // == Introspection ==
    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Length of the expiring keys registry, stale hints included.
    pub fn expiring_len(&self) -> usize {
        self.store.expiring_len()
    }

    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn take_sweeper(&self) -> Option<JoinHandle<()>> {
        self.sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl<K, V> Drop for HotCache<K, V> {
    fn drop(&mut self) {
        let sweeper = self
            .sweeper
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(sweeper) = sweeper {
            sweeper.abort();
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::NO_EXPIRY;

    fn new_cache() -> HotCache<String, String> {
        HotCache::new().unwrap()
    }

    #[test]
    fn test_new_outside_runtime_fails() {
        let result: Result<HotCache<String, String>> = HotCache::new();
        assert!(matches!(result, Err(CacheError::NoRuntime)));
    }

    #[test]
    fn test_with_handle_outside_runtime() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .build()
            .unwrap();

        let cache: HotCache<String, String> =
            HotCache::with_handle(Config::default(), runtime.handle()).unwrap();
        cache.set("key1".to_string(), "value1".to_string(), NO_EXPIRY);
        assert_eq!(cache.get("key1"), Some("value1".to_string()));
        cache.stop();
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config = Config {
            sample_cap: 0,
            ..Config::default()
        };
        let result: Result<HotCache<String, String>> = HotCache::with_config(config);
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let cache = new_cache();
        assert_eq!(cache.get("missing"), None);
        assert!(!cache.has("missing"));
        cache.stop();
    }

    #[tokio::test]
    async fn test_get_exists() {
        let cache = new_cache();
        cache.set("key1".to_string(), "value1".to_string(), NO_EXPIRY);
        assert_eq!(cache.get("key1"), Some("value1".to_string()));
        assert!(cache.has("key1"));
        cache.stop();
    }

    #[tokio::test]
    async fn test_expiry() {
        let cache = new_cache();
        cache.set("key1".to_string(), "value1".to_string(), Duration::from_millis(10));
        assert_eq!(cache.get("key1"), Some("value1".to_string()));

        tokio::time::sleep(Duration::from_millis(15)).await;

        assert_eq!(cache.get("key1"), None);
        assert!(!cache.has("key1"));
        cache.stop();
    }

    #[tokio::test]
    async fn test_manual_sweep() {
        let cache = new_cache();
        cache.set("key1".to_string(), "value1".to_string(), Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(5));

        let report = cache.sweep();
        assert_eq!(report.evicted, 1);
        assert!(cache.is_empty());
        assert_eq!(cache.expiring_len(), 0);
        cache.stop();
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let cache = new_cache();
        cache.set("key1".to_string(), "value1".to_string(), Duration::from_secs(60));

        cache.stop();
        assert!(cache.is_stopped());
        assert!(cache.is_empty());
        assert_eq!(cache.expiring_len(), 0);

        cache.stop();
        assert!(cache.is_stopped());
    }

    #[tokio::test]
    async fn test_operations_after_stop_are_noops() {
        let cache = new_cache();
        cache.stop();

        cache.set("key1".to_string(), "value1".to_string(), NO_EXPIRY);
        assert!(!cache.set_if_absent("key2".to_string(), "value2".to_string(), NO_EXPIRY));
        cache.delete("key1");

        assert_eq!(cache.get("key1"), None);
        assert!(!cache.has("key2"));
        assert_eq!(cache.sweep(), SweepReport::default());
        assert!(cache.is_empty());
    }
}
