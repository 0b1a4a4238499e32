//! Expiry Sweeper Task
//!
//! Background task that periodically samples the expiring keys registry and
//! removes entries that expired without being read.

use std::hash::Hash;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, trace};

use crate::cache::CacheStore;
use crate::config::Config;

/// Spawns a background task that sweeps `store` once per `config.sweep_interval`.
///
/// The first tick fires one interval after spawning. The task owns a random
/// source seeded once at startup and runs until it is aborted or the store is
/// closed.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// when the cache is stopped.
pub fn spawn_sweeper_task<K, V>(
    store: Arc<CacheStore<K, V>>,
    config: &Config,
    runtime: &Handle,
) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let period = config.sweep_interval;
    let sample_cap = config.sample_cap;

    runtime.spawn(async move {
        info!(?period, sample_cap, "Starting expiry sweeper");

        let mut rng = StdRng::from_entropy();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if store.is_closed() {
                info!("Cache closed, expiry sweeper exiting");
                break;
            }

            let report = store.sweep(&mut rng, sample_cap);
            if report.evicted > 0 || report.stale > 0 {
                debug!(
                    sampled = report.sampled,
                    evicted = report.evicted,
                    stale = report.stale,
                    remaining = store.expiring_len(),
                    "Expiry sweep"
                );
            } else {
                trace!(sampled = report.sampled, "Expiry sweep found nothing to evict");
            }
        }
    })
}
