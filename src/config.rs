//! Configuration Module
//!
//! Handles loading and validating sweeper configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Default interval between sweeper ticks in milliseconds
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 100;

/// Default upper bound on registry samples drawn per tick
pub const DEFAULT_SAMPLE_CAP: usize = 1000;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Time between two sweeper ticks
    pub sweep_interval: Duration,
    /// Maximum number of registry samples examined per tick
    pub sample_cap: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `HOTCACHE_SWEEP_INTERVAL_MS` - Sweeper tick interval (default: 100)
    /// - `HOTCACHE_SAMPLE_CAP` - Samples per tick (default: 1000)
    pub fn from_env() -> Self {
        Self {
            sweep_interval: Duration::from_millis(
                env::var("HOTCACHE_SWEEP_INTERVAL_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_SWEEP_INTERVAL_MS),
            ),
            sample_cap: env::var("HOTCACHE_SAMPLE_CAP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SAMPLE_CAP),
        }
    }

    /// Rejects values the sweeper cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.sweep_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "sweep_interval must be greater than zero".to_string(),
            ));
        }
        if self.sample_cap == 0 {
            return Err(CacheError::InvalidConfig(
                "sample_cap must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_millis(DEFAULT_SWEEP_INTERVAL_MS),
            sample_cap: DEFAULT_SAMPLE_CAP,
        }
    }
}
