//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

/// TTL sentinel meaning the entry never expires.
pub const NO_EXPIRY: Duration = Duration::ZERO;

// == Cache Entry ==
/// Represents a single cache entry with value and expiry metadata.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry<V> {
    /// The stored value
    pub(crate) value: V,
    /// Expiration instant, None = no expiration
    pub(crate) expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` after `now`.
    ///
    /// A `ttl` of [`NO_EXPIRY`] creates an entry that only explicit deletion removes.
    pub(crate) fn new(value: V, ttl: Duration, now: Instant) -> Self {
        let expires_at = if ttl == NO_EXPIRY {
            None
        } else {
            // Overflowing instants are treated as never expiring
            now.checked_add(ttl)
        };

        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: an entry is expired once `now` reaches the expiration
    /// instant, so it is only live while the expiry is strictly in the future.
    pub(crate) fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    /// Returns true if the entry carries a finite TTL.
    pub(crate) fn has_expiry(&self) -> bool {
        self.expires_at.is_some()
    }
}
