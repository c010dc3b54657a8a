//! # LRU-K Admission Cache
//!
//! An LRU cache that only admits a key after it has been observed `k` times.
//! Observations below the threshold are counted in a bounded history and the
//! most recent value written for such a key waits in a pending map.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                   ConcurrentLrukCache<K, V>                          │
//!   │                   Mutex<LrukCore<K, V>>   (one lock for all three)   │
//!   │                                                                      │
//!   │   ┌──────────────────────┐  ┌──────────────────────┐  ┌───────────┐  │
//!   │   │ main: LruCore<K, V>  │  │ history:             │  │ pending:  │  │
//!   │   │ admitted keys only   │  │ LruCore<K, usize>    │  │ K -> V    │  │
//!   │   │ ordinary LRU         │  │ key -> observations  │  │ (tracked  │  │
//!   │   │ eviction             │  │ LRU-bounded          │  │  keys)    │  │
//!   │   └──────────────────────┘  └──────────────────────┘  └───────────┘  │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Lifecycle
//!
//! ```text
//!              put / get miss                    count reaches k
//!   Unseen ────────────────────► Tracked(count) ─────────────────► Admitted
//!     ▲                            │    ▲  │                          │
//!     │      forgotten by history  │    └──┘ put / get miss           │
//!     ├────────────────────────────┘         (count += 1)             │
//!     │                                                               │
//!     └──────────── evicted from main, never hit while admitted ──────┘
//! ```
//!
//! - A key in `main` never has a pending value.
//! - Every pending key is tracked by the history.
//! - Every `get`, hit or miss, counts as an observation. If a miss reaches `k`
//!   and a pending value exists, the value is admitted and returned.
//! - A `put` that reaches `k` admits the written value directly. A `put` on an
//!   admitted key only overwrites it and is not counted.
//! - Hits on an admitted key keep counting in the history, so a hot key that
//!   gets evicted from `main` comes back with its next write while the history
//!   still remembers it.
//!
//! ## Example
//!
//! ```
//! use kcache::policy::lru_k::LrukCore;
//! use kcache::traits::CoreCache;
//!
//! let mut cache = LrukCore::with_history(5, 4, 2);
//! cache.insert(1, "One");
//! assert_eq!(cache.get(&1), Some(&"One"));   // second observation admits it
//! assert!(cache.contains(&1));
//!
//! cache.insert(2, "Two");
//! assert!(!cache.contains(&2));
//! assert!(cache.is_pending(&2));
//! ```

use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::{InvariantError, ensure_invariant};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LrukMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LrukMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{CoreMetricsRecorder, LrukMetricsRecorder, MetricsSnapshotProvider};
use crate::policy::lru::LruCore;
use crate::traits::{
    CachePolicy, ConcurrentCache, CoreCache, LruCacheTrait, LrukCacheTrait, MutableCache,
};

/// Observations required for admission when none is configured.
pub const DEFAULT_K: usize = 2;

/// Single-threaded LRU-K engine.
pub struct LrukCore<K, V> {
    main: LruCore<K, V>,
    history: LruCore<K, usize>,
    pending: FxHashMap<K, V>,
    k: usize,
    #[cfg(feature = "metrics")]
    metrics: LrukMetrics,
}

impl<K, V> LrukCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// LRU-2 with a history as large as the main cache.
    pub fn new(capacity: usize) -> Self {
        Self::with_history(capacity, capacity, DEFAULT_K)
    }

    /// `k` is clamped to at least 1. With `k == 1` every `put` admits.
    pub fn with_history(capacity: usize, history_capacity: usize, k: usize) -> Self {
        Self {
            main: LruCore::new(capacity),
            history: LruCore::new(history_capacity),
            pending: FxHashMap::default(),
            k: k.max(1),
            #[cfg(feature = "metrics")]
            metrics: LrukMetrics::default(),
        }
    }

    pub fn history_capacity(&self) -> usize {
        self.history.capacity()
    }

    /// Number of keys currently tracked below the admission threshold.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Observations recorded for a tracked key, without refreshing it.
    pub fn history_count(&self, key: &K) -> Option<usize> {
        self.history.peek(key).copied()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    /// Admitted value for `key` without refreshing recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.main.peek(key)
    }

    /// Admitted keys from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.main.iter()
    }

    /// Counts one observation of `key` and returns the new count.
    ///
    /// A key new to a full history pushes out the least recently observed
    /// one, together with any value pending for it.
    fn record_access(&mut self, key: &K) -> usize {
        if let Some(count) = self.history.get_mut(key) {
            *count += 1;
            return *count;
        }

        if self.history.capacity() > 0 && self.history.len() >= self.history.capacity() {
            if let Some((forgotten, count)) = self.history.pop_lru() {
                let dropped_value = self.pending.remove(&forgotten).is_some();

                #[cfg(feature = "metrics")]
                self.metrics.record_history_forget();
                tracing::trace!(
                    count,
                    dropped_value,
                    history_capacity = self.history.capacity(),
                    "lru-k history forgot a tracked key"
                );
            }
        }
        self.history.insert(key.clone(), 1);
        1
    }

    fn admit(&mut self, key: K, value: V) {
        self.history.remove(&key);
        self.main.insert(key, value);

        #[cfg(feature = "metrics")]
        self.metrics.record_promotion();
        tracing::debug!(
            k = self.k,
            len = self.main.len(),
            history_len = self.history.len(),
            "lru-k admitted key into main cache"
        );
    }

    /// Checks both LRU structures and the membership rules between main,
    /// history and pending values.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.main.check_invariants()?;
        self.history.check_invariants()?;

        for (key, _) in self.main.iter() {
            ensure_invariant!(
                !self.pending.contains_key(key),
                "admitted key still has a pending value"
            );
        }
        for key in self.pending.keys() {
            match self.history.peek(key) {
                Some(&count) => ensure_invariant!(
                    count < self.k,
                    "pending key has {} observations with k = {}",
                    count,
                    self.k
                ),
                None => {
                    return Err(InvariantError::new(
                        "pending value for a key the history does not track",
                    ));
                },
            }
        }
        ensure_invariant!(self.k >= 1, "k must be at least 1");
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("{err}");
        }
    }
}

impl<K, V> CoreCache<K, V> for LrukCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Writes `value` for `key`.
    ///
    /// Admitted keys are updated in place. Otherwise the write counts as an
    /// observation: at `k` observations the value is admitted, below that it
    /// replaces the pending value. Returns the value it displaced, admitted or
    /// pending.
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if self.main.contains(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();
            return self.main.insert(key, value);
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        let count = self.record_access(&key);
        if count >= self.k {
            let previous = self.pending.remove(&key);
            self.admit(key, value);
            return previous;
        }

        if self.history.contains(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_pending_write();
            return self.pending.insert(key, value);
        }
        None
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        let count = self.record_access(key);
        if self.main.contains(key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_hit();
            return self.main.get(key);
        }

        if count >= self.k
            && let Some(value) = self.pending.remove(key)
        {
            self.admit(key.clone(), value);
            #[cfg(feature = "metrics")]
            self.metrics.record_get_hit();
            return self.main.peek(key);
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_get_miss();
        None
    }

    /// True only for admitted keys.
    fn contains(&self, key: &K) -> bool {
        self.main.contains(key)
    }

    fn len(&self) -> usize {
        self.main.len()
    }

    fn capacity(&self) -> usize {
        self.main.capacity()
    }

    fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.main.clear();
        self.history.clear();
        self.pending.clear();
    }
}

impl<K, V> MutableCache<K, V> for LrukCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Forgets `key` everywhere. Returns the admitted value, or else the
    /// pending one.
    fn remove(&mut self, key: &K) -> Option<V> {
        let admitted = self.main.remove(key);
        self.history.remove(key);
        let pending = self.pending.remove(key);
        admitted.or(pending)
    }
}

impl<K, V> LruCacheTrait<K, V> for LrukCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn pop_lru(&mut self) -> Option<(K, V)> {
        self.main.pop_lru()
    }

    fn peek_lru(&self) -> Option<(&K, &V)> {
        self.main.peek_lru()
    }

    fn touch(&mut self, key: &K) -> bool {
        self.main.touch(key)
    }

    fn recency_rank(&self, key: &K) -> Option<usize> {
        self.main.recency_rank(key)
    }
}

impl<K, V> LrukCacheTrait<K, V> for LrukCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn k_value(&self) -> usize {
        self.k
    }

    fn access_count(&self, key: &K) -> Option<usize> {
        self.history_count(key)
    }

    fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }
}

#[cfg(feature = "metrics")]
impl<K, V> LrukCore<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn metrics_snapshot(&self) -> LrukMetricsSnapshot {
        let main = self.main.metrics_snapshot();
        LrukMetricsSnapshot {
            get_calls: self.metrics.get_calls,
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_calls: self.metrics.insert_calls,
            insert_updates: self.metrics.insert_updates,
            insert_new: self.metrics.insert_new,
            evict_calls: main.evict_calls,
            evicted_entries: main.evicted_entries,
            clear_calls: self.metrics.clear_calls,
            promotions: self.metrics.promotions,
            history_forgets: self.metrics.history_forgets,
            pending_writes: self.metrics.pending_writes,
            cache_len: self.main.len(),
            capacity: self.main.capacity(),
            history_len: self.history.len(),
            pending_len: self.pending.len(),
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LrukMetricsSnapshot> for LrukCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> LrukMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for LrukCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LrukCore")
            .field("len", &self.main.len())
            .field("capacity", &self.main.capacity())
            .field("k", &self.k)
            .field("history_len", &self.history.len())
            .field("pending_len", &self.pending.len())
            .finish_non_exhaustive()
    }
}

/// Thread-safe LRU-K cache.
///
/// Main cache, history and pending values sit behind a single
/// `parking_lot::Mutex`, so each operation sees and leaves all three in a
/// consistent state.
///
/// # Example
///
/// ```
/// use kcache::policy::lru_k::ConcurrentLrukCache;
/// use kcache::traits::CachePolicy;
///
/// let cache = ConcurrentLrukCache::with_history(5, 4, 2);
/// cache.put(1, "One");
/// assert_eq!(cache.get(&1), Some("One"));
/// assert_eq!(cache.get(&1), Some("One"));
/// ```
pub struct ConcurrentLrukCache<K, V> {
    inner: Mutex<LrukCore<K, V>>,
}

impl<K, V> ConcurrentLrukCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LrukCore::new(capacity)),
        }
    }

    pub fn with_history(capacity: usize, history_capacity: usize, k: usize) -> Self {
        Self {
            inner: Mutex::new(LrukCore::with_history(capacity, history_capacity, k)),
        }
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().remove(key)
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

    pub fn k_value(&self) -> usize {
        self.inner.lock().k_value()
    }

    pub fn history_capacity(&self) -> usize {
        self.inner.lock().history_capacity()
    }

    pub fn history_count(&self, key: &K) -> Option<usize> {
        self.inner.lock().history_count(key)
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.inner.lock().is_pending(key)
    }

    pub fn pending_len(&self) -> usize {
        self.inner.lock().pending_len()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.lock().check_invariants()
    }

    pub fn with_core<R>(&self, f: impl FnOnce(&mut LrukCore<K, V>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<K, V> ConcurrentLrukCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn peek(&self, key: &K) -> Option<V> {
        self.inner.lock().peek(key).cloned()
    }
}

impl<K, V> CachePolicy<K, V> for ConcurrentLrukCache<K, V>
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

impl<K: Send, V: Send> ConcurrentCache for ConcurrentLrukCache<K, V> {}

#[cfg(feature = "metrics")]
impl<K, V> ConcurrentLrukCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn metrics_snapshot(&self) -> LrukMetricsSnapshot {
        self.inner.lock().metrics_snapshot()
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LrukMetricsSnapshot> for ConcurrentLrukCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> LrukMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for ConcurrentLrukCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.inner.lock();
        f.debug_struct("ConcurrentLrukCache")
            .field("len", &cache.len())
            .field("capacity", &cache.capacity())
            .field("k", &cache.k)
            .finish_non_exhaustive()
    }
}
