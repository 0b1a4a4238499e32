//! Error types for the cache
//!
//! Provides unified error handling using thiserror. Cache misses, expired keys
//! and occupied keys are ordinary return values, so only construction can fail.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Configuration values that cannot drive a sweeper
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The sweeper needs a tokio runtime to be spawned on
    #[error("No tokio runtime available to spawn the expiry sweeper")]
    NoRuntime,
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
