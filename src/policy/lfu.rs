//! # Least Frequently Used (LFU) Cache with Frequency Aging
//!
//! Entries carry an access frequency starting at 1. The victim on overflow is
//! the least recently touched entry among those with the lowest frequency.
//! Storage and ordering live in [`FrequencyBuckets`]; this module adds
//! capacity, the aging trigger and the locked wrapper.
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────────────────────────────────────────────────────────────────┐
//!   │                     ConcurrentLfuCache<K, V>                        │
//!   │                     Mutex<LfuCore<K, V>>                            │
//!   │                              │                                      │
//!   │                              ▼                                      │
//!   │   ┌─────────────────────────────────────────────────────────────┐   │
//!   │   │ LfuCore                                                     │   │
//!   │   │   buckets: FrequencyBuckets<K, V>                           │   │
//!   │   │   total_access_count  (sum of resident frequencies)         │   │
//!   │   │   aging_ceiling                                             │   │
//!   │   │                                                             │   │
//!   │   │   min_freq ─► [f=1: c ◄─► b] ─► [f=4: a] ─► [f=9: d]        │   │
//!   │   │                        ▲                                    │   │
//!   │   │                     victim                                  │   │
//!   │   └─────────────────────────────────────────────────────────────┘   │
//!   └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Aging
//!
//! Every recorded access (a new insert, a hit, or an update of an existing
//! key) adds one to `total_access_count`. When
//! `total_access_count / len` exceeds the aging ceiling, every frequency is
//! lowered by `ceiling / 2` (floored at 1) and the total is reset to the sum
//! of the decayed frequencies.
//!
//! ```text
//!   ceiling = 100, keys a, b, c
//!
//!   a: 301   b: 1   c: 1      total 303, average 101 > 100
//!        │ decay by 50
//!        ▼
//!   a: 251   b: 1   c: 1      total 253, average 84
//! ```
//!
//! Decay keeps relative order: an entry that was strictly hotter never ends up
//! strictly colder, and ties keep their eviction order.
//!
//! ## Example
//!
//! ```
//! use kcache::policy::lfu::LfuCore;
//! use kcache::traits::{CoreCache, LfuCacheTrait};
//!
//! let mut cache = LfuCore::new(2);
//! cache.insert("a", 1);
//! cache.insert("b", 2);
//! cache.get(&"a");
//! cache.insert("c", 3);
//!
//! assert!(cache.contains(&"a"));
//! assert!(!cache.contains(&"b"));
//! assert_eq!(cache.frequency(&"a"), Some(2));
//! ```

use std::fmt;
use std::hash::Hash;
use std::mem;

use parking_lot::Mutex;

use crate::ds::frequency_buckets::FrequencyBuckets;
use crate::error::{InvariantError, ensure_invariant};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LfuMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LfuMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{CoreMetricsRecorder, LfuMetricsRecorder, MetricsSnapshotProvider};
use crate::traits::{CachePolicy, ConcurrentCache, CoreCache, LfuCacheTrait, MutableCache};

/// Aging ceiling for a standalone LFU engine.
pub const DEFAULT_AGING_CEILING: u64 = 1_000_000;

/// Smallest accepted ceiling; anything lower could never decay.
pub const MIN_AGING_CEILING: u64 = 2;

/// Capacity used by `Default`.
pub const DEFAULT_LFU_CAPACITY: usize = 16;

/// Single-threaded LFU engine with frequency aging.
pub struct LfuCore<K, V> {
    buckets: FrequencyBuckets<K, V>,
    capacity: usize,
    aging_ceiling: u64,
    total_access_count: u64,
    #[cfg(feature = "metrics")]
    metrics: LfuMetrics,
}

impl<K, V> LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self::with_aging_ceiling(capacity, DEFAULT_AGING_CEILING)
    }

    /// Creates an engine that decays once the average frequency exceeds
    /// `aging_ceiling`. Values below [`MIN_AGING_CEILING`] are raised to it.
    pub fn with_aging_ceiling(capacity: usize, aging_ceiling: u64) -> Self {
        Self {
            buckets: FrequencyBuckets::with_capacity(capacity),
            capacity,
            aging_ceiling: aging_ceiling.max(MIN_AGING_CEILING),
            total_access_count: 0,
            #[cfg(feature = "metrics")]
            metrics: LfuMetrics::default(),
        }
    }

    pub fn aging_ceiling(&self) -> u64 {
        self.aging_ceiling
    }

    /// Sum of the frequencies of all resident entries.
    pub fn total_access_count(&self) -> u64 {
        self.total_access_count
    }

    /// `total_access_count / len`, or 0 when empty.
    pub fn average_frequency(&self) -> u64 {
        match self.buckets.len() {
            0 => 0,
            len => self.total_access_count / len as u64,
        }
    }

    /// Lowest resident frequency; 1 for an empty cache.
    pub fn min_frequency(&self) -> u64 {
        self.buckets.min_freq().unwrap_or(1)
    }

    /// Value for `key` without counting an access.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.buckets.get(key)
    }

    /// Mutable lookup that counts as an access.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        if self.buckets.touch(key).is_none() {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        }
        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        self.record_access();
        self.buckets.get_mut(key)
    }

    /// Drops every entry and resets the access counters.
    pub fn purge(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_purge();

        let dropped = self.buckets.len();
        self.buckets.clear();
        self.total_access_count = 0;
        tracing::debug!(dropped, "lfu cache purged");
    }

    /// Keys in the order they would be evicted, with their frequencies.
    pub fn eviction_order(&self) -> impl Iterator<Item = (&K, u64)> {
        self.buckets.eviction_order()
    }

    fn record_access(&mut self) {
        self.total_access_count = self.total_access_count.saturating_add(1);
        if self.average_frequency() > self.aging_ceiling {
            self.age();
        }
    }

    fn age(&mut self) {
        let decay_by = self.aging_ceiling / 2;
        let average_before = self.average_frequency();
        self.buckets.decay_by(decay_by);
        self.total_access_count = self.buckets.frequency_sum();

        #[cfg(feature = "metrics")]
        self.metrics.record_decay(self.buckets.len());
        tracing::debug!(
            len = self.buckets.len(),
            decay_by,
            average_before,
            average_after = self.average_frequency(),
            total_access_count = self.total_access_count,
            "lfu frequencies aged"
        );
    }

    fn evict_lfu(&mut self) -> Option<(K, V)> {
        #[cfg(feature = "metrics")]
        self.metrics.record_evict_call();

        let (key, value, freq) = self.buckets.pop_min()?;
        self.total_access_count = self.total_access_count.saturating_sub(freq);

        #[cfg(feature = "metrics")]
        self.metrics.record_evicted_entry();
        tracing::trace!(
            freq,
            capacity = self.capacity,
            "lfu evicted least frequently used entry"
        );
        Some((key, value))
    }

    /// Structural check plus `total_access_count == sum of frequencies`.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.buckets.check_invariants()?;
        ensure_invariant!(
            self.buckets.len() <= self.capacity,
            "{} entries exceed capacity {}",
            self.buckets.len(),
            self.capacity
        );
        let sum = self.buckets.frequency_sum();
        ensure_invariant!(
            self.total_access_count == sum,
            "total_access_count is {} but frequencies sum to {}",
            self.total_access_count,
            sum
        );
        ensure_invariant!(
            self.aging_ceiling >= MIN_AGING_CEILING,
            "aging ceiling {} below minimum",
            self.aging_ceiling
        );
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("{err}");
        }
    }
}

impl<K, V> CoreCache<K, V> for LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if self.buckets.touch(&key).is_some() {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();

            let previous = self
                .buckets
                .get_mut(&key)
                .map(|slot| mem::replace(slot, value));
            self.record_access();
            return previous;
        }

        if self.capacity == 0 {
            return None;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        if self.buckets.len() >= self.capacity {
            self.evict_lfu();
        }
        self.buckets.insert(key, value);
        self.record_access();
        None
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        self.get_mut(key).map(|value| &*value)
    }

    fn contains(&self, key: &K) -> bool {
        self.buckets.contains(key)
    }

    fn len(&self) -> usize {
        self.buckets.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.buckets.clear();
        self.total_access_count = 0;
    }
}

impl<K, V> MutableCache<K, V> for LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn remove(&mut self, key: &K) -> Option<V> {
        let (value, freq) = self.buckets.remove(key)?;
        self.total_access_count = self.total_access_count.saturating_sub(freq);
        Some(value)
    }
}

impl<K, V> LfuCacheTrait<K, V> for LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn pop_lfu(&mut self) -> Option<(K, V)> {
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lfu_call();

        let (key, value, freq) = self.buckets.pop_min()?;
        self.total_access_count = self.total_access_count.saturating_sub(freq);

        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lfu_found();
        Some((key, value))
    }

    fn peek_lfu(&self) -> Option<(&K, &V)> {
        self.buckets.peek_min().map(|(k, v, _)| (k, v))
    }

    fn frequency(&self, key: &K) -> Option<u64> {
        self.buckets.frequency(key)
    }
}

#[cfg(feature = "metrics")]
impl<K, V> LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn metrics_snapshot(&self) -> LfuMetricsSnapshot {
        LfuMetricsSnapshot {
            get_calls: self.metrics.get_calls,
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_calls: self.metrics.insert_calls,
            insert_updates: self.metrics.insert_updates,
            insert_new: self.metrics.insert_new,
            evict_calls: self.metrics.evict_calls,
            evicted_entries: self.metrics.evicted_entries,
            clear_calls: self.metrics.clear_calls,
            pop_lfu_calls: self.metrics.pop_lfu_calls,
            pop_lfu_found: self.metrics.pop_lfu_found,
            decay_passes: self.metrics.decay_passes,
            decayed_entries: self.metrics.decayed_entries,
            purges: self.metrics.purges,
            cache_len: self.buckets.len(),
            capacity: self.capacity,
            total_access_count: self.total_access_count,
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LfuMetricsSnapshot> for LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> LfuMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuCore")
            .field("len", &self.buckets.len())
            .field("capacity", &self.capacity)
            .field("aging_ceiling", &self.aging_ceiling)
            .field("total_access_count", &self.total_access_count)
            .finish_non_exhaustive()
    }
}

impl<K, V> Default for LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_LFU_CAPACITY)
    }
}

impl<K, V> Extend<(K, V)> for LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

/// Thread-safe LFU cache: one `parking_lot::Mutex` around an [`LfuCore`].
///
/// # Example
///
/// ```
/// use kcache::policy::lfu::ConcurrentLfuCache;
/// use kcache::traits::CachePolicy;
///
/// let cache = ConcurrentLfuCache::with_aging_ceiling(3, 100);
/// cache.put(1, "hot");
/// cache.put(2, "warm");
/// cache.put(3, "cold");
/// for _ in 0..600 {
///     cache.get(&1);
/// }
/// cache.put(4, "new");
///
/// assert_eq!(cache.get(&1), Some("hot"));
/// assert!(cache.average_frequency() <= 100);
/// ```
pub struct ConcurrentLfuCache<K, V> {
    inner: Mutex<LfuCore<K, V>>,
}

impl<K, V> ConcurrentLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self::with_aging_ceiling(capacity, DEFAULT_AGING_CEILING)
    }

    pub fn with_aging_ceiling(capacity: usize, aging_ceiling: u64) -> Self {
        Self {
            inner: Mutex::new(LfuCore::with_aging_ceiling(capacity, aging_ceiling)),
        }
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().remove(key)
    }

    pub fn purge(&self) {
        self.inner.lock().purge();
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.inner.lock().frequency(key)
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

    pub fn aging_ceiling(&self) -> u64 {
        self.inner.lock().aging_ceiling()
    }

    pub fn total_access_count(&self) -> u64 {
        self.inner.lock().total_access_count()
    }

    pub fn average_frequency(&self) -> u64 {
        self.inner.lock().average_frequency()
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.lock().check_invariants()
    }

    pub fn with_core<R>(&self, f: impl FnOnce(&mut LfuCore<K, V>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<K, V> ConcurrentLfuCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn peek(&self, key: &K) -> Option<V> {
        self.inner.lock().peek(key).cloned()
    }
}

impl<K, V> CachePolicy<K, V> for ConcurrentLfuCache<K, V>
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

impl<K: Send, V: Send> ConcurrentCache for ConcurrentLfuCache<K, V> {}

#[cfg(feature = "metrics")]
impl<K, V> ConcurrentLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn metrics_snapshot(&self) -> LfuMetricsSnapshot {
        self.inner.lock().metrics_snapshot()
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LfuMetricsSnapshot> for ConcurrentLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> LfuMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for ConcurrentLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.inner.lock();
        f.debug_struct("ConcurrentLfuCache")
            .field("len", &cache.len())
            .field("capacity", &cache.capacity())
            .finish_non_exhaustive()
    }
}

impl<K, V> Default for ConcurrentLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_LFU_CAPACITY)
    }
}
