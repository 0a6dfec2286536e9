//! In-memory memoization tier.
//!
//! A thin wrapper over `std::collections::HashMap` that counts hits and
//! misses. Entries are write-once: every value is a pure function of its key,
//! so nothing is ever evicted and re-inserting a key stores the same value.

use std::collections::HashMap;
use std::hash::Hash;

/// Upper bound on the bits used for the initial allocation; larger tables
/// start at `2^MAX_PREALLOC_BITS` entries and grow on demand.
pub const MAX_PREALLOC_BITS: usize = 16;

/// A write-once cache backed by [HashMap].
pub struct MemoryCache<K, V> {
    map: HashMap<K, V>,
    hits: usize,
    misses: usize,
}

impl<K, V> Default for MemoryCache<K, V> {
    fn default() -> Self {
        Self::new(12)
    }
}

impl<K, V> MemoryCache<K, V> {
    /// Creates a cache with room for `2^bits` entries before the first resize,
    /// capped at `2^MAX_PREALLOC_BITS`.
    pub fn new(bits: usize) -> Self {
        Self {
            map: HashMap::with_capacity(1 << bits.min(MAX_PREALLOC_BITS)),
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Number of entries the cache holds before it reallocates.
    pub fn capacity(&self) -> usize {
        self.map.capacity()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the number of cache hits.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Returns the number of cache misses.
    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Drops all entries. Counters are kept.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl<K, V> MemoryCache<K, V>
where
    K: Hash + Eq,
    V: Copy,
{
    /// Looks up a key, updating the hit/miss counters.
    #[inline]
    pub fn get(&mut self, key: &K) -> Option<V> {
        match self.map.get(key) {
            Some(v) => {
                self.hits += 1;
                Some(*v)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Looks up a key without touching the counters.
    ///
    /// Used for memo lookups inside a single evaluation, which would
    /// otherwise drown the caller-level statistics.
    #[inline]
    pub fn peek(&self, key: &K) -> Option<V> {
        self.map.get(key).copied()
    }

    #[inline]
    pub fn insert(&mut self, key: K, value: V) {
        self.map.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_cache_basic() {
        let mut cache = MemoryCache::<(u64, u64), f64>::new(4);

        cache.insert((5, 3), 35.0);
        cache.insert((5, 2), 50.0);

        assert_eq!(cache.get(&(5, 3)), Some(35.0));
        assert_eq!(cache.get(&(5, 2)), Some(50.0));
        assert_eq!(cache.get(&(6, 3)), None);

        assert_eq!(cache.hits(), 2);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn test_memory_cache_peek_does_not_count() {
        let mut cache = MemoryCache::<u64, f64>::new(2);
        cache.insert(1, 1.0);
        assert_eq!(cache.peek(&1), Some(1.0));
        assert_eq!(cache.peek(&2), None);
        assert_eq!(cache.hits() + cache.misses(), 0);
    }

    #[test]
    fn test_memory_cache_clear() {
        let mut cache = MemoryCache::<(u64, u64), f64>::new(4);

        cache.insert((1, 2), 42.0);
        assert_eq!(cache.get(&(1, 2)), Some(42.0));

        cache.clear();
        assert_eq!(cache.get(&(1, 2)), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_memory_cache_grows() {
        let mut cache = MemoryCache::<(u64, u64), u64>::new(2);

        for i in 0..1000 {
            cache.insert((i, 0), i);
        }
        for i in 0..1000 {
            assert_eq!(cache.get(&(i, 0)), Some(i));
        }
        assert_eq!(cache.len(), 1000);
    }

    #[test]
    fn test_memory_cache_caps_initial_allocation() {
        let small = MemoryCache::<u64, u64>::new(4);
        assert!(small.capacity() >= 16);

        let huge = MemoryCache::<u64, u64>::new(31);
        assert!(huge.capacity() >= 1 << MAX_PREALLOC_BITS);
        assert!(huge.capacity() < 1 << (MAX_PREALLOC_BITS + 2));
    }
}
