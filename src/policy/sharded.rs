//! # Hash-Sharded Cache Wrapper
//!
//! Splits the key space over `N` independently locked engines. Each call
//! hashes the key, picks exactly one shard and delegates to it; there is no
//! wrapper-level lock and no cross-shard coordination.
//!
//! ## Architecture
//!
//! ```text
//!                        put(k, v) / get(k)
//!                               │
//!                               ▼
//!                ┌─────────────────────────────┐
//!                │ ShardSelector { n, seed }   │
//!                │ hash(seed, k) % n           │
//!                └──────────────┬──────────────┘
//!                               │
//!        ┌──────────────┬───────┴──────┬──────────────┐
//!        ▼              ▼              ▼              ▼
//!   ┌─────────┐    ┌─────────┐    ┌─────────┐    ┌─────────┐
//!   │ shard 0 │    │ shard 1 │    │ shard 2 │    │ shard 3 │
//!   │ Mutex   │    │ Mutex   │    │ Mutex   │    │ Mutex   │
//!   │ engine  │    │ engine  │    │ engine  │    │ engine  │
//!   └─────────┘    └─────────┘    └─────────┘    └─────────┘
//!     cap = ceil(capacity / n) each
//! ```
//!
//! ## Capacity
//!
//! Each shard gets `ceil(capacity / n)` entries, so the realized total can
//! exceed the requested one by up to `n - 1`. Eviction is per shard: a hot
//! shard evicts while a cold one still has room.
//!
//! ## Shard Count
//!
//! A shard count of 0 means one shard per available core, as reported by
//! `std::thread::available_parallelism`.
//!
//! ## Example
//!
//! ```
//! use kcache::policy::sharded::ShardedLruCache;
//! use kcache::traits::CachePolicy;
//!
//! let cache = ShardedLruCache::new(1024, 8);
//! cache.put("user:1", 42);
//! assert_eq!(cache.get(&"user:1"), Some(42));
//! assert_eq!(cache.shard_count(), 8);
//! assert_eq!(cache.shard_capacity(), 128);
//! ```

use std::fmt;
use std::hash::Hash;

use crate::ds::shard::{DEFAULT_SHARD_SEED, ShardSelector, per_shard_capacity, resolve_shard_count};
use crate::policy::lfu::ConcurrentLfuCache;
use crate::policy::lru::ConcurrentLruCache;
use crate::traits::{CachePolicy, ConcurrentCache};

/// Aging ceiling used by [`ShardedLfuCache::new`].
pub const DEFAULT_SHARDED_AGING_CEILING: u64 = 10;

/// Hash-partitioned set of caches, each with its own lock and capacity.
pub struct ShardedCache<C> {
    shards: Box<[C]>,
    selector: ShardSelector,
    shard_capacity: usize,
}

/// Sharded [`ConcurrentLruCache`].
pub type ShardedLruCache<K, V> = ShardedCache<ConcurrentLruCache<K, V>>;

/// Sharded [`ConcurrentLfuCache`].
pub type ShardedLfuCache<K, V> = ShardedCache<ConcurrentLfuCache<K, V>>;

impl<C> ShardedCache<C> {
    /// Builds `shard_count` shards by calling `factory(per_shard_capacity)`.
    ///
    /// ```
    /// use kcache::policy::lru_k::ConcurrentLrukCache;
    /// use kcache::policy::sharded::ShardedCache;
    ///
    /// let cache = ShardedCache::with_factory(100, 4, |cap| {
    ///     ConcurrentLrukCache::<u64, String>::with_history(cap, cap, 2)
    /// });
    /// assert_eq!(cache.shard_capacity(), 25);
    /// ```
    pub fn with_factory(
        capacity: usize,
        shard_count: usize,
        factory: impl FnMut(usize) -> C,
    ) -> Self {
        Self::with_factory_and_seed(capacity, shard_count, DEFAULT_SHARD_SEED, factory)
    }

    pub fn with_factory_and_seed(
        capacity: usize,
        shard_count: usize,
        seed: u64,
        mut factory: impl FnMut(usize) -> C,
    ) -> Self {
        let shard_count = resolve_shard_count(shard_count);
        let shard_capacity = per_shard_capacity(capacity, shard_count);
        let shards: Box<[C]> = (0..shard_count).map(|_| factory(shard_capacity)).collect();

        tracing::debug!(
            shard_count,
            shard_capacity,
            requested_capacity = capacity,
            "sharded cache created"
        );
        Self {
            shards,
            selector: ShardSelector::new(shard_count, seed),
            shard_capacity,
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn shard_capacity(&self) -> usize {
        self.shard_capacity
    }

    /// Shard index `key` routes to.
    pub fn shard_for_key<K: Hash + ?Sized>(&self, key: &K) -> usize {
        self.selector.shard_for_key(key)
    }

    pub fn shard(&self, index: usize) -> Option<&C> {
        self.shards.get(index)
    }

    pub fn shards(&self) -> &[C] {
        &self.shards
    }

    fn shard_of<K: Hash + ?Sized>(&self, key: &K) -> &C {
        &self.shards[self.selector.shard_for_key(key)]
    }
}

impl<K, V, C> CachePolicy<K, V> for ShardedCache<C>
where
    K: Hash,
    C: CachePolicy<K, V>,
{
    fn put(&self, key: K, value: V) {
        self.shard_of(&key).put(key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        self.shard_of(key).get(key)
    }
}

impl<C: ConcurrentCache> ConcurrentCache for ShardedCache<C> {}

impl<C> fmt::Debug for ShardedCache<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedCache")
            .field("shard_count", &self.shards.len())
            .field("shard_capacity", &self.shard_capacity)
            .field("seed", &self.selector.seed())
            .finish_non_exhaustive()
    }
}

impl<K, V> ShardedCache<ConcurrentLruCache<K, V>>
where
    K: Eq + Hash + Clone,
{
    /// `shard_count == 0` picks one shard per available core.
    pub fn new(capacity: usize, shard_count: usize) -> Self {
        Self::with_factory(capacity, shard_count, ConcurrentLruCache::new)
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.shard_of(key).remove(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.shard_of(key).contains(key)
    }

    /// Entries across all shards. Each shard is locked in turn, so the sum
    /// is not a snapshot under concurrent writes.
    pub fn len(&self) -> usize {
        self.shards.iter().map(ConcurrentLruCache::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(ConcurrentLruCache::is_empty)
    }

    /// Realized aggregate capacity, `shard_count * shard_capacity`.
    pub fn capacity(&self) -> usize {
        self.shards.iter().map(ConcurrentLruCache::capacity).sum()
    }

    pub fn clear(&self) {
        for shard in self.shards.iter() {
            shard.clear();
        }
    }
}

impl<K, V> ShardedCache<ConcurrentLfuCache<K, V>>
where
    K: Eq + Hash + Clone,
{
    /// Shards use [`DEFAULT_SHARDED_AGING_CEILING`].
    pub fn new(capacity: usize, shard_count: usize) -> Self {
        Self::with_aging_ceiling(capacity, shard_count, DEFAULT_SHARDED_AGING_CEILING)
    }

    pub fn with_aging_ceiling(capacity: usize, shard_count: usize, aging_ceiling: u64) -> Self {
        Self::with_factory(capacity, shard_count, |cap| {
            ConcurrentLfuCache::with_aging_ceiling(cap, aging_ceiling)
        })
    }

    /// Purges every shard, one lock at a time.
    pub fn purge(&self) {
        for shard in self.shards.iter() {
            shard.purge();
        }
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.shard_of(key).remove(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.shard_of(key).contains(key)
    }

    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.shard_of(key).frequency(key)
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(ConcurrentLfuCache::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(ConcurrentLfuCache::is_empty)
    }

    pub fn capacity(&self) -> usize {
        self.shards.iter().map(ConcurrentLfuCache::capacity).sum()
    }
}
