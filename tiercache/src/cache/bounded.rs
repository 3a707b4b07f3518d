//! Bounded LRU cache
//!
//! One `RwLock` guards the entry map and the recency list together, so the
//! two can never disagree about which keys are held. Every operation that
//! touches recency (`put`, `get`, `delete`, `clear`) takes the write lock;
//! non-promoting reads (`peek`, `get_or_default`) share the read lock.

use ahash::RandomState;
use parking_lot::RwLock;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

use super::recency::{NodeId, RecencyList};

/// Default capacity: 10,000 entries
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Cached value plus its position in the recency list
struct Slot<V> {
    value: V,
    node: NodeId,
}

struct Inner<K, V> {
    entries: HashMap<K, Slot<V>, RandomState>,
    order: RecencyList<K>,
}

impl<K: Hash + Eq + Clone, V> Inner<K, V> {
    fn insert(&mut self, key: K, value: V) {
        match self.entries.get_mut(&key) {
            Some(slot) => {
                slot.value = value;
                self.order.move_to_back(slot.node);
            }
            None => {
                let node = self.order.push_back(key.clone());
                self.entries.insert(key, Slot { value, node });
            }
        }
    }

    /// Drop least recently used keys until at most `max` remain
    fn evict_to(&mut self, max: usize) -> u64 {
        let mut evicted = 0;
        while self.order.len() > max {
            match self.order.pop_front() {
                Some(victim) => {
                    self.entries.remove(&victim);
                    evicted += 1;
                }
                None => break,
            }
        }
        evicted
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub inserts: u64,
    pub entries: usize,
    pub max_entries: usize,
}

impl CacheStats {
    /// Fraction of promoting reads that found their key
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    inserts: AtomicU64,
}

/// Capacity-limited key/value store with least-recently-used eviction
///
/// Capacity is a count of distinct keys, never a byte budget.
pub struct BoundedCache<K, V> {
    inner: RwLock<Inner<K, V>>,
    max_entries: usize,
    counters: Counters,
}

impl<K: Hash + Eq + Clone, V> BoundedCache<K, V> {
    /// Create a cache holding at most `max_entries` keys
    pub fn new(max_entries: usize) -> Self {
        info!("Initializing bounded cache with max_entries={}", max_entries);

        Self {
            inner: RwLock::new(Inner {
                entries: HashMap::with_capacity_and_hasher(
                    max_entries.min(DEFAULT_MAX_ENTRIES),
                    RandomState::new(),
                ),
                order: RecencyList::with_capacity(max_entries.min(DEFAULT_MAX_ENTRIES)),
            }),
            max_entries,
            counters: Counters::default(),
        }
    }

    /// Insert or overwrite `key`, marking it most recently used.
    ///
    /// If the cache then holds more than `max_entries` keys, the least
    /// recently used ones are evicted.
    pub fn put(&self, key: K, value: V) {
        let evicted = {
            let mut inner = self.inner.write();
            inner.insert(key, value);
            inner.evict_to(self.max_entries)
        };

        self.counters.inserts.fetch_add(1, Ordering::Relaxed);
        if evicted > 0 {
            self.counters.evictions.fetch_add(evicted, Ordering::Relaxed);
            debug!("Bounded cache EVICT ({} entries)", evicted);
        }
    }

    /// Remove `key`. Returns whether it was present.
    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        match inner.entries.remove(key) {
            Some(slot) => {
                inner.order.remove(slot.node);
                true
            }
            None => false,
        }
    }

    /// Remove every entry
    pub fn clear(&self) {
        let count = {
            let mut inner = self.inner.write();
            let count = inner.entries.len();
            inner.entries.clear();
            inner.order.clear();
            count
        };

        debug!("Bounded cache CLEAR ({} entries)", count);
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Keys ordered from least to most recently used
    pub fn keys(&self) -> Vec<K> {
        self.inner.read().order.iter().cloned().collect()
    }

    /// Snapshot of hit/miss/eviction counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            inserts: self.counters.inserts.load(Ordering::Relaxed),
            entries: self.len(),
            max_entries: self.max_entries,
        }
    }
}

impl<K: Hash + Eq + Clone, V: Clone> BoundedCache<K, V> {
    /// Get a value, promoting `key` to most recently used.
    ///
    /// A miss leaves the recency order untouched.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let value = {
            let mut guard = self.inner.write();
            let inner = &mut *guard;

            match inner.entries.get(key) {
                Some(slot) => {
                    inner.order.move_to_back(slot.node);
                    Some(slot.value.clone())
                }
                None => None,
            }
        };

        if value.is_some() {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
        }
        value
    }

    /// Get a value without changing its eviction order
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().entries.get(key).map(|slot| slot.value.clone())
    }

    /// Stored value, or `default` if absent. Never changes eviction order.
    pub fn get_or_default<Q>(&self, key: &Q, default: V) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.peek(key).unwrap_or(default)
    }
}

impl<K: Hash + Eq + Clone, V> Default for BoundedCache<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl<K, V> std::fmt::Debug for BoundedCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedCache")
            .field("max_entries", &self.max_entries)
            .field("entries", &self.inner.read().entries.len())
            .finish()
    }
}
