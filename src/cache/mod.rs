//! Cache Module
//!
//! Provides in-memory caching with per-key TTL, lazy expiry on read and
//! sampled background eviction.

mod entry;
mod hotcache;
mod registry;
mod stats;
mod store;


// Re-export public types
pub use entry::NO_EXPIRY;
pub use hotcache::HotCache;
pub use stats::CacheStats;
pub use store::{CacheStore, SweepReport};
