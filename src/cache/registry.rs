//! Expiring Keys Registry Module
//!
//! Tracks keys that were set with a TTL so the sweeper has something to sample.

// == Expiring Keys ==
/// Unordered list of keys that have, or recently had, a finite TTL.
///
/// The list is a hint, not the source of truth: it may hold duplicates and
/// keys that were already deleted or evicted. The store is always consulted
/// before acting on an entry, and stale slots are dropped when sampled.
#[derive(Debug)]
pub(crate) struct ExpiringKeys<K> {
    keys: Vec<K>,
}

impl<K: PartialEq> ExpiringKeys<K> {
    // == Constructor ==
    /// Creates a new empty registry.
    pub(crate) fn new() -> Self {
        Self { keys: Vec::new() }
    }

    // == Push ==
    /// Records a key that was just set with a TTL.
    pub(crate) fn push(&mut self, key: K) {
        self.keys.push(key);
    }

    /// Returns the key stored at `index`, if the index is still in bounds.
    pub(crate) fn get(&self, index: usize) -> Option<&K> {
        self.keys.get(index)
    }

    // == Remove At ==
    /// Removes the slot at `index` by swapping in the last key.
    ///
    /// The slot is only removed while it still holds `key`; returns whether it did.
    pub(crate) fn swap_remove_if(&mut self, index: usize, key: &K) -> bool {
        match self.keys.get(index) {
            Some(current) if current == key => {
                self.keys.swap_remove(index);
                true
            }
            _ => false,
        }
    }

    /// Drops every key and releases the backing allocation.
    pub(crate) fn clear(&mut self) {
        self.keys = Vec::new();
    }

    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_new() {
        let registry: ExpiringKeys<String> = ExpiringKeys::new();
        assert_eq!(registry.len(), 0);
        assert!(registry.get(0).is_none());
    }

    #[test]
    fn test_registry_allows_duplicates() {
        let mut registry = ExpiringKeys::new();
        registry.push("key1");
        registry.push("key1");

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(1), Some(&"key1"));
    }

    #[test]
    fn test_swap_remove_moves_last_key() {
        let mut registry = ExpiringKeys::new();
        registry.push("key1");
        registry.push("key2");
        registry.push("key3");

        assert!(registry.swap_remove_if(0, &"key1"));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(0), Some(&"key3"));
        assert_eq!(registry.get(1), Some(&"key2"));
    }

    #[test]
    fn test_swap_remove_skips_changed_slot() {
        let mut registry = ExpiringKeys::new();
        registry.push("key1");
        registry.push("key2");

        assert!(!registry.swap_remove_if(0, &"key2"));
        assert!(!registry.swap_remove_if(5, &"key1"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_registry_clear() {
        let mut registry = ExpiringKeys::new();
        registry.push("key1");
        registry.clear();
        assert_eq!(registry.len(), 0);
    }
}
