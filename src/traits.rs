//! # Cache Trait Hierarchy
//!
//! Two layers of contracts:
//!
//! - **Core traits** (`&mut self`): implemented by the single-threaded
//!   engines ([`LruCore`], [`LfuCore`], [`LrukCore`]). They hand out
//!   references and never lock.
//! - **[`CachePolicy`]** (`&self`): implemented by the locked engines and by
//!   the sharded wrappers. Values come back as clones, so store `Arc<T>` when
//!   values are expensive to copy.
//!
//! ## Architecture
//!
//! ```text
//!                    ┌──────────────────────────────────────┐
//!                    │           CoreCache<K, V>            │
//!                    │  insert(&mut, K, V) → Option<V>      │
//!                    │  get(&mut, &K) → Option<&V>          │
//!                    │  contains / len / is_empty           │
//!                    │  capacity / clear                    │
//!                    └──────────────────┬───────────────────┘
//!                                       │
//!                    ┌──────────────────▼───────────────────┐
//!                    │          MutableCache<K, V>          │
//!                    │  remove(&mut, &K) → Option<V>        │
//!                    └──┬───────────────┬────────────────┬──┘
//!                       │               │                │
//!            ┌──────────▼─────┐ ┌───────▼────────┐ ┌─────▼──────────┐
//!            │ LruCacheTrait  │ │ LfuCacheTrait  │ │ LrukCacheTrait │
//!            │ pop_lru        │ │ pop_lfu        │ │ k_value        │
//!            │ peek_lru       │ │ peek_lfu       │ │ access_count   │
//!            │ touch          │ │ frequency      │ │ is_pending     │
//!            │ recency_rank   │ │                │ │                │
//!            └────────────────┘ └────────────────┘ └────────────────┘
//!
//!   Thread-safe surface (locked engines, sharded wrappers):
//!
//!            ┌──────────────────────────────────────┐
//!            │          CachePolicy<K, V>           │
//!            │  put(&self, K, V)                    │
//!            │  get(&self, &K) → Option<V>          │
//!            │  get_or_default(&self, &K) → V       │
//!            └──────────────────────────────────────┘
//!                     + ConcurrentCache (Send + Sync marker)
//! ```
//!
//! ## Example
//!
//! ```
//! use kcache::policy::lfu::ConcurrentLfuCache;
//! use kcache::policy::lru::ConcurrentLruCache;
//! use kcache::traits::CachePolicy;
//!
//! fn warm<C: CachePolicy<u64, String>>(cache: &C) {
//!     for i in 0..4 {
//!         cache.put(i, format!("v{i}"));
//!     }
//! }
//!
//! let lru = ConcurrentLruCache::new(8);
//! let lfu = ConcurrentLfuCache::new(8);
//! warm(&lru);
//! warm(&lfu);
//! assert_eq!(lru.get(&2).as_deref(), Some("v2"));
//! assert_eq!(lfu.get_or_default(&9), String::new());
//! ```
//!
//! [`LruCore`]: crate::policy::lru::LruCore
//! [`LfuCore`]: crate::policy::lfu::LfuCore
//! [`LrukCore`]: crate::policy::lru_k::LrukCore

/// Thread-safe put/get contract shared by every locked engine and wrapper.
pub trait CachePolicy<K, V> {
    /// Inserts or updates `key`, applying the policy's recency/frequency rules.
    fn put(&self, key: K, value: V);

    /// Returns a clone of the value if present.
    ///
    /// A miss never mutates cached state. LRU-K is the one exception: a miss
    /// still counts as an observation of the key.
    fn get(&self, key: &K) -> Option<V>;

    /// Like [`get`](Self::get) but yields `V::default()` on a miss.
    fn get_or_default(&self, key: &K) -> V
    where
        V: Default,
    {
        self.get(key).unwrap_or_default()
    }
}

/// Single-threaded cache operations.
pub trait CoreCache<K, V> {
    /// Inserts or updates an entry, returning the previous value for `key`.
    ///
    /// Inserting a new key into a full cache evicts according to the policy.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Returns the value and records the access.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Membership test; does not record an access.
    fn contains(&self, key: &K) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;

    fn clear(&mut self);
}

/// Caches that support removal of arbitrary keys.
pub trait MutableCache<K, V>: CoreCache<K, V> {
    fn remove(&mut self, key: &K) -> Option<V>;

    fn remove_batch(&mut self, keys: &[K]) -> Vec<Option<V>> {
        keys.iter().map(|key| self.remove(key)).collect()
    }
}

/// Recency-ordered caches.
pub trait LruCacheTrait<K, V>: MutableCache<K, V> {
    /// Removes and returns the least recently used entry.
    fn pop_lru(&mut self) -> Option<(K, V)>;

    /// The entry [`pop_lru`](Self::pop_lru) would remove, without touching it.
    fn peek_lru(&self) -> Option<(&K, &V)>;

    /// Marks `key` as most recently used. Returns `false` if absent.
    fn touch(&mut self, key: &K) -> bool;

    /// Position in recency order, 0 being most recent. O(n).
    fn recency_rank(&self, key: &K) -> Option<usize>;
}

/// Frequency-ordered caches.
pub trait LfuCacheTrait<K, V>: MutableCache<K, V> {
    /// Removes and returns the entry with the lowest frequency, least recently
    /// touched among ties.
    fn pop_lfu(&mut self) -> Option<(K, V)>;

    fn peek_lfu(&self) -> Option<(&K, &V)>;

    fn frequency(&self, key: &K) -> Option<u64>;
}

/// Caches that require `k` observations before admitting a key.
pub trait LrukCacheTrait<K, V>: MutableCache<K, V> {
    fn k_value(&self) -> usize;

    /// Observations the history currently holds for `key`.
    ///
    /// Admitted keys count hits only. `None` if the history does not track
    /// the key.
    fn access_count(&self, key: &K) -> Option<usize>;

    /// Whether a value is waiting for `key` to reach `k` observations.
    fn is_pending(&self, key: &K) -> bool;
}

/// Marker for caches safe to share across threads.
///
/// ```
/// use kcache::traits::{CachePolicy, ConcurrentCache};
/// use std::sync::Arc;
///
/// fn share<C>(cache: Arc<C>)
/// where
///     C: CachePolicy<u64, u64> + ConcurrentCache + 'static,
/// {
///     let handle = std::thread::spawn({
///         let cache = Arc::clone(&cache);
///         move || cache.put(1, 1)
///     });
///     handle.join().unwrap();
///     assert_eq!(cache.get(&1), Some(1));
/// }
///
/// share(Arc::new(kcache::policy::lru::ConcurrentLruCache::new(4)));
/// ```
pub trait ConcurrentCache: Send + Sync {}
