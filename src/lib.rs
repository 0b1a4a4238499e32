//! Hotcache - An in-process key-value cache with per-key TTL
//!
//! Expired entries are never returned: reads evict them lazily, and a
//! background sweeper samples keys with a TTL to reclaim the ones nobody reads.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheStats, CacheStore, HotCache, SweepReport, NO_EXPIRY};
pub use config::Config;
pub use error::{CacheError, Result};
