//! # Least Recently Used (LRU) Cache
//!
//! O(1) LRU built from a hash index and an arena-backed intrusive list.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                     ConcurrentLruCache<K, V>                         │
//!   │                                                                      │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │                Mutex<LruCore<K, V>>                          │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   │                              │                                       │
//!   │                              ▼                                       │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │  FxHashMap<K, SlotId>                                        │   │
//!   │   │    page_1 ─────────────┐                                     │   │
//!   │   │    page_2 ───────────┐ │                                     │   │
//!   │   │    page_3 ─────────┐ │ │                                     │   │
//!   │   └────────────────────┼─┼─┼─────────────────────────────────────┘   │
//!   │                        ▼ ▼ ▼                                         │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │  IntrusiveList<Entry<K, V>>                                  │   │
//!   │   │                                                              │   │
//!   │   │  head ──► [page_3] ◄──► [page_2] ◄──► [page_1] ◄── tail      │   │
//!   │   │   (MRU)                                          (LRU)       │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations Flow
//!
//! ```text
//!   INSERT new key (cache full, capacity = 3)
//!     head ──► [A] ◄──► [B] ◄──► [C] ◄── tail
//!     insert(D): evict C from the tail, push D at the head
//!     head ──► [D] ◄──► [A] ◄──► [B] ◄── tail
//!
//!   GET existing key
//!     get(B): index lookup, move B to the head
//!     head ──► [B] ◄──► [D] ◄──► [A] ◄── tail
//!
//!   PEEK
//!     peek(A): index lookup only, order unchanged
//! ```
//!
//! ## Key Components
//!
//! | Component              | Description                                      |
//! |------------------------|--------------------------------------------------|
//! | `LruCore<K, V>`        | Single-threaded engine, `&mut self` API          |
//! | `ConcurrentLruCache`   | `parking_lot::Mutex` around one `LruCore`        |
//!
//! A capacity of 0 is legal and produces a cache that stores nothing.
//!
//! ## Example
//!
//! ```
//! use kcache::policy::lru::LruCore;
//! use kcache::traits::{CoreCache, LruCacheTrait};
//!
//! let mut cache = LruCore::new(2);
//! cache.insert("a", 1);
//! cache.insert("b", 2);
//! cache.get(&"a");
//! cache.insert("c", 3);
//!
//! assert!(!cache.contains(&"b"));
//! assert_eq!(cache.peek_lru(), Some((&"a", &1)));
//! ```

use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::intrusive_list::IntrusiveList;
use crate::ds::slot_arena::SlotId;
use crate::error::{InvariantError, ensure_invariant};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LruMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LruMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{CoreMetricsRecorder, LruMetricsRecorder, MetricsSnapshotProvider};
use crate::traits::{CachePolicy, ConcurrentCache, CoreCache, LruCacheTrait, MutableCache};

/// Capacity used by `Default`.
pub const DEFAULT_LRU_CAPACITY: usize = 16;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Single-threaded LRU engine.
pub struct LruCore<K, V> {
    map: FxHashMap<K, SlotId>,
    list: IntrusiveList<Entry<K, V>>,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: LruMetrics,
}

impl<K, V> LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: usize) -> Self {
        let mut map = FxHashMap::default();
        map.reserve(capacity);
        Self {
            map,
            list: IntrusiveList::with_capacity(capacity),
            capacity,
            #[cfg(feature = "metrics")]
            metrics: LruMetrics::default(),
        }
    }

    /// Read-only lookup; does not change recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.map.get(key)?;
        self.list.get(id).map(|entry| &entry.value)
    }

    /// Mutable lookup that marks `key` as most recently used.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let Some(&id) = self.map.get(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        };
        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        self.list.move_to_front(id);
        self.list.get_mut(id).map(|entry| &mut entry.value)
    }

    /// Entries from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.list.iter().map(|entry| (&entry.key, &entry.value))
    }

    fn evict_lru(&mut self) -> Option<(K, V)> {
        #[cfg(feature = "metrics")]
        self.metrics.record_evict_call();

        let entry = self.list.pop_back()?;
        self.map.remove(&entry.key);

        #[cfg(feature = "metrics")]
        self.metrics.record_evicted_entry();
        tracing::trace!(
            capacity = self.capacity,
            len = self.map.len(),
            "lru evicted least recently used entry"
        );
        Some((entry.key, entry.value))
    }

    /// Verifies that the index and the recency list describe the same keys.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.list.check_invariants()?;
        ensure_invariant!(
            self.map.len() == self.list.len(),
            "index has {} keys, recency list has {} nodes",
            self.map.len(),
            self.list.len()
        );
        ensure_invariant!(
            self.map.len() <= self.capacity,
            "{} entries exceed capacity {}",
            self.map.len(),
            self.capacity
        );
        for (id, entry) in self.list.iter_entries() {
            ensure_invariant!(
                self.map.get(&entry.key) == Some(&id),
                "list node {} is not indexed under its key",
                id.index()
            );
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("{err}");
        }
    }
}

impl<K, V> CoreCache<K, V> for LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if let Some(&id) = self.map.get(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();

            self.list.move_to_front(id);
            return self
                .list
                .get_mut(id)
                .map(|entry| std::mem::replace(&mut entry.value, value));
        }

        if self.capacity == 0 {
            return None;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        if self.map.len() >= self.capacity {
            self.evict_lru();
        }

        let id = self.list.push_front(Entry {
            key: key.clone(),
            value,
        });
        self.map.insert(key, id);

        debug_assert_eq!(self.map.len(), self.list.len());
        None
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        self.get_mut(key).map(|value| &*value)
    }

    fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.map.clear();
        self.list.clear();
    }
}

impl<K, V> MutableCache<K, V> for LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.map.remove(key)?;
        let entry = self.list.remove(id)?;
        debug_assert_eq!(self.map.len(), self.list.len());
        Some(entry.value)
    }
}

impl<K, V> LruCacheTrait<K, V> for LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn pop_lru(&mut self) -> Option<(K, V)> {
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lru_call();

        let entry = self.list.pop_back()?;
        self.map.remove(&entry.key);

        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lru_found();
        Some((entry.key, entry.value))
    }

    fn peek_lru(&self) -> Option<(&K, &V)> {
        self.list.back().map(|entry| (&entry.key, &entry.value))
    }

    fn touch(&mut self, key: &K) -> bool {
        #[cfg(feature = "metrics")]
        self.metrics.record_touch_call();

        let Some(&id) = self.map.get(key) else {
            return false;
        };
        self.list.move_to_front(id);

        #[cfg(feature = "metrics")]
        self.metrics.record_touch_found();
        true
    }

    fn recency_rank(&self, key: &K) -> Option<usize> {
        let id = *self.map.get(key)?;
        self.list.position(id)
    }
}

#[cfg(feature = "metrics")]
impl<K, V> LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn metrics_snapshot(&self) -> LruMetricsSnapshot {
        LruMetricsSnapshot {
            get_calls: self.metrics.get_calls,
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_calls: self.metrics.insert_calls,
            insert_updates: self.metrics.insert_updates,
            insert_new: self.metrics.insert_new,
            evict_calls: self.metrics.evict_calls,
            evicted_entries: self.metrics.evicted_entries,
            clear_calls: self.metrics.clear_calls,
            pop_lru_calls: self.metrics.pop_lru_calls,
            pop_lru_found: self.metrics.pop_lru_found,
            touch_calls: self.metrics.touch_calls,
            touch_found: self.metrics.touch_found,
            cache_len: self.map.len(),
            capacity: self.capacity,
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LruMetricsSnapshot> for LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> LruMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for LruCore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCore")
            .field("len", &self.map.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<K, V> Default for LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_LRU_CAPACITY)
    }
}

impl<K, V> Extend<(K, V)> for LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

/// Thread-safe LRU cache: one `parking_lot::Mutex` around an [`LruCore`].
///
/// Every operation, reads included, takes the lock for its full duration
/// because a hit reorders the recency list.
///
/// # Example
///
/// ```
/// use kcache::policy::lru::ConcurrentLruCache;
/// use kcache::traits::CachePolicy;
///
/// let cache = ConcurrentLruCache::new(3);
/// cache.put(1, "One");
/// cache.put(2, "Two");
/// cache.put(3, "Three");
/// cache.put(4, "Four");
///
/// assert_eq!(cache.get(&1), None);
/// assert_eq!(cache.get(&4), Some("Four"));
/// ```
pub struct ConcurrentLruCache<K, V> {
    inner: Mutex<LruCore<K, V>>,
}

impl<K, V> ConcurrentLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruCore::new(capacity)),
        }
    }

    /// Removes `key`, returning its value.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().remove(key)
    }

    /// Marks `key` as most recently used without reading it.
    pub fn touch(&self, key: &K) -> bool {
        self.inner.lock().touch(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.lock().check_invariants()
    }

    /// Runs `f` with exclusive access to the underlying engine.
    pub fn with_core<R>(&self, f: impl FnOnce(&mut LruCore<K, V>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<K, V> ConcurrentLruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Clone of the value for `key` without changing recency.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.inner.lock().peek(key).cloned()
    }

    pub fn pop_lru(&self) -> Option<(K, V)> {
        self.inner.lock().pop_lru()
    }

    pub fn peek_lru(&self) -> Option<(K, V)> {
        let cache = self.inner.lock();
        cache.peek_lru().map(|(k, v)| (k.clone(), v.clone()))
    }
}

impl<K, V> CachePolicy<K, V> for ConcurrentLruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) {
        self.inner.lock().insert(key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key).cloned()
    }
}

impl<K: Send, V: Send> ConcurrentCache for ConcurrentLruCache<K, V> {}

#[cfg(feature = "metrics")]
impl<K, V> ConcurrentLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn metrics_snapshot(&self) -> LruMetricsSnapshot {
        self.inner.lock().metrics_snapshot()
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LruMetricsSnapshot> for ConcurrentLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> LruMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for ConcurrentLruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.inner.lock();
        f.debug_struct("ConcurrentLruCache")
            .field("len", &cache.map.len())
            .field("capacity", &cache.capacity)
            .finish_non_exhaustive()
    }
}

impl<K, V> Default for ConcurrentLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_LRU_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    mod basic_behavior {
        use super::super::*;

        #[test]
        fn insert_and_get() {
            let mut cache = LruCore::new(3);
            assert_eq!(cache.insert(1, "one"), None);
            assert_eq!(cache.insert(2, "two"), None);
            assert_eq!(cache.get(&1), Some(&"one"));
            assert_eq!(cache.get(&3), None);
            assert_eq!(cache.len(), 2);
            assert_eq!(cache.capacity(), 3);
            cache.debug_validate_invariants();
        }

        #[test]
        fn update_replaces_value_and_refreshes_recency() {
            let mut cache = LruCore::new(2);
            cache.insert("a", 1);
            cache.insert("b", 2);
            assert_eq!(cache.insert("a", 10), Some(1));
            assert_eq!(cache.len(), 2);
            assert_eq!(cache.recency_rank(&"a"), Some(0));

            cache.insert("c", 3);
            assert!(!cache.contains(&"b"));
            assert_eq!(cache.peek(&"a"), Some(&10));
            cache.debug_validate_invariants();
        }

        #[test]
        fn zero_capacity_stores_nothing() {
            let mut cache = LruCore::new(0);
            assert_eq!(cache.insert(1, 1), None);
            assert!(cache.is_empty());
            assert_eq!(cache.get(&1), None);
            assert_eq!(cache.pop_lru(), None);
            cache.debug_validate_invariants();
        }

        #[test]
        fn capacity_one_keeps_latest() {
            let mut cache = LruCore::new(1);
            cache.insert(1, 'a');
            cache.insert(2, 'b');
            assert!(!cache.contains(&1));
            assert_eq!(cache.get(&2), Some(&'b'));
        }

        #[test]
        fn remove_and_clear() {
            let mut cache = LruCore::new(4);
            cache.extend([(1, 1), (2, 2), (3, 3)]);
            assert_eq!(cache.remove(&2), Some(2));
            assert_eq!(cache.remove(&2), None);
            assert_eq!(cache.remove_batch(&[1, 9]), vec![Some(1), None]);
            assert_eq!(cache.len(), 1);
            cache.clear();
            assert!(cache.is_empty());
            cache.debug_validate_invariants();
        }

        #[test]
        fn get_mut_updates_in_place() {
            let mut cache = LruCore::new(2);
            cache.insert("k", vec![1]);
            cache.insert("other", vec![]);
            cache.get_mut(&"k").unwrap().push(2);
            assert_eq!(cache.peek(&"k"), Some(&vec![1, 2]));
            assert_eq!(cache.recency_rank(&"k"), Some(0));
        }
    }

    mod eviction_order {
        use super::super::*;

        #[test]
        fn evicts_in_insertion_order_without_reads() {
            let mut cache = LruCore::new(3);
            for i in 0..6 {
                cache.insert(i, i);
            }
            let keys: Vec<_> = cache.iter().map(|(k, _)| *k).collect();
            assert_eq!(keys, vec![5, 4, 3]);
            for i in 0..3 {
                assert!(!cache.contains(&i));
            }
        }

        #[test]
        fn get_protects_from_next_eviction() {
            let mut cache = LruCore::new(3);
            cache.insert(1, "One");
            cache.insert(2, "Two");
            cache.insert(3, "Three");
            cache.insert(4, "Four");
            assert_eq!(cache.get(&2), Some(&"Two"));
            cache.insert(5, "Five");
            assert_eq!(cache.get(&3), None);
            assert_eq!(cache.get(&2), Some(&"Two"));
        }

        #[test]
        fn peek_does_not_refresh() {
            let mut cache = LruCore::new(2);
            cache.insert(1, 1);
            cache.insert(2, 2);
            assert_eq!(cache.peek(&1), Some(&1));
            cache.insert(3, 3);
            assert!(!cache.contains(&1));
        }

        #[test]
        fn pop_peek_touch_and_rank() {
            let mut cache = LruCore::new(3);
            cache.extend([(1, 'a'), (2, 'b'), (3, 'c')]);
            assert_eq!(cache.peek_lru(), Some((&1, &'a')));
            assert!(cache.touch(&1));
            assert!(!cache.touch(&9));
            assert_eq!(cache.recency_rank(&1), Some(0));
            assert_eq!(cache.recency_rank(&2), Some(2));
            assert_eq!(cache.pop_lru(), Some((2, 'b')));
            assert_eq!(cache.len(), 2);
            cache.debug_validate_invariants();
        }
    }

    mod concurrent {
        use super::super::*;
        use std::sync::Arc;
        use std::thread;

        #[test]
        fn cache_policy_surface() {
            let cache = ConcurrentLruCache::new(2);
            cache.put("a", 1);
            cache.put("b", 2);
            assert_eq!(cache.get(&"a"), Some(1));
            cache.put("c", 3);
            assert_eq!(cache.get(&"b"), None);
            assert_eq!(cache.get_or_default(&"b"), 0);
            assert_eq!(cache.peek_lru(), Some(("a", 1)));
            assert_eq!(cache.remove(&"a"), Some(1));
            assert_eq!(cache.len(), 1);
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        fn parallel_writers_respect_capacity() {
            let cache = Arc::new(ConcurrentLruCache::new(64));
            let handles: Vec<_> = (0..4u64)
                .map(|t| {
                    let cache = Arc::clone(&cache);
                    thread::spawn(move || {
                        for i in 0..500u64 {
                            cache.put(t * 1_000 + i, i);
                            let _ = cache.get(&(t * 1_000 + i / 2));
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
            assert_eq!(cache.len(), 64);
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        fn debug_output_is_non_exhaustive() {
            let cache: ConcurrentLruCache<u32, u32> = ConcurrentLruCache::default();
            let rendered = format!("{cache:?}");
            assert!(rendered.contains("capacity: 16"));
            assert!(rendered.ends_with(".. }"));
        }
    }

    #[cfg(feature = "metrics")]
    mod metrics {
        use super::super::*;

        #[test]
        fn snapshot_counts_hits_misses_and_evictions() {
            let mut cache = LruCore::new(2);
            cache.insert(1, 1);
            cache.insert(2, 2);
            cache.insert(2, 20);
            cache.get(&1);
            cache.get(&7);
            cache.insert(3, 3);

            let snap = cache.snapshot();
            assert_eq!(snap.insert_calls, 4);
            assert_eq!(snap.insert_new, 3);
            assert_eq!(snap.insert_updates, 1);
            assert_eq!(snap.get_hits, 1);
            assert_eq!(snap.get_misses, 1);
            assert_eq!(snap.evicted_entries, 1);
            assert_eq!(snap.cache_len, 2);
        }
    }

    mod property_tests {
        use super::super::*;
        use proptest::prelude::*;

        proptest! {
            /// Recency order matches a Vec model where index 0 is MRU.
            #[cfg_attr(miri, ignore)]
            #[test]
            fn matches_reference_model(
                capacity in 0usize..8,
                ops in prop::collection::vec((any::<bool>(), 0u8..16), 0..200),
            ) {
                let mut cache = LruCore::new(capacity);
                let mut model: Vec<u8> = Vec::new();

                for (is_get, key) in ops {
                    if is_get {
                        let hit = cache.get(&key).is_some();
                        let pos = model.iter().position(|&k| k == key);
                        prop_assert_eq!(hit, pos.is_some());
                        if let Some(pos) = pos {
                            model.remove(pos);
                            model.insert(0, key);
                        }
                    } else {
                        cache.insert(key, key);
                        if capacity == 0 {
                            continue;
                        }
                        if let Some(pos) = model.iter().position(|&k| k == key) {
                            model.remove(pos);
                        } else if model.len() == capacity {
                            model.pop();
                        }
                        model.insert(0, key);
                    }
                    prop_assert!(cache.check_invariants().is_ok());
                }

                let order: Vec<u8> = cache.iter().map(|(k, _)| *k).collect();
                prop_assert_eq!(order, model);
            }
        }
    }
}
