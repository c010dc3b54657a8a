//! Unified cache builder for all eviction policies.
//!
//! Picks an engine from a [`PolicyKind`] and hides it behind [`Cache`], which
//! implements [`CachePolicy`] by dispatching to the chosen engine.
//!
//! ## Example
//!
//! ```rust
//! use kcache::builder::{CacheBuilder, PolicyKind};
//! use kcache::traits::CachePolicy;
//!
//! let cache = CacheBuilder::new(100)
//!     .shards(4)
//!     .build::<u64, String>(PolicyKind::ShardedLfu);
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get(&1).as_deref(), Some("hello"));
//! ```
//!
//! `build` clamps out-of-range parameters the same way the engine
//! constructors do. `try_build` rejects them instead:
//!
//! ```rust
//! use kcache::builder::{CacheBuilder, PolicyKind};
//! use kcache::error::ConfigError;
//!
//! let result = CacheBuilder::new(10)
//!     .aging_ceiling(1)
//!     .try_build::<u64, u64>(PolicyKind::Lfu);
//! assert_eq!(result.err(), Some(ConfigError::AgingCeilingTooSmall(1)));
//! ```

use std::fmt;
use std::hash::Hash;

use crate::ds::shard::DEFAULT_SHARD_SEED;
use crate::error::ConfigError;
use crate::policy::lfu::{ConcurrentLfuCache, DEFAULT_AGING_CEILING, MIN_AGING_CEILING};
use crate::policy::lru::ConcurrentLruCache;
use crate::policy::lru_k::ConcurrentLrukCache;
use crate::policy::sharded::{DEFAULT_SHARDED_AGING_CEILING, ShardedCache, ShardedLfuCache, ShardedLruCache};
use crate::traits::{CachePolicy, ConcurrentCache};

/// Available eviction policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    /// Least Recently Used.
    Lru,
    /// Least Frequently Used with frequency aging.
    Lfu,
    /// LRU with admission after `k` observations.
    LruK { k: usize },
    /// Hash-sharded LRU.
    ShardedLru,
    /// Hash-sharded LFU.
    ShardedLfu,
}

/// Cache produced by [`CacheBuilder`].
pub struct Cache<K, V> {
    inner: CacheInner<K, V>,
    policy: PolicyKind,
}

enum CacheInner<K, V> {
    Lru(ConcurrentLruCache<K, V>),
    Lfu(ConcurrentLfuCache<K, V>),
    LruK(ConcurrentLrukCache<K, V>),
    ShardedLru(ShardedLruCache<K, V>),
    ShardedLfu(ShardedLfuCache<K, V>),
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn policy(&self) -> PolicyKind {
        self.policy
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        match &self.inner {
            CacheInner::Lru(c) => c.remove(key),
            CacheInner::Lfu(c) => c.remove(key),
            CacheInner::LruK(c) => c.remove(key),
            CacheInner::ShardedLru(c) => c.remove(key),
            CacheInner::ShardedLfu(c) => c.remove(key),
        }
    }

    /// Whether `key` is resident. For LRU-K, only admitted keys count.
    pub fn contains(&self, key: &K) -> bool {
        match &self.inner {
            CacheInner::Lru(c) => c.contains(key),
            CacheInner::Lfu(c) => c.contains(key),
            CacheInner::LruK(c) => c.contains(key),
            CacheInner::ShardedLru(c) => c.contains(key),
            CacheInner::ShardedLfu(c) => c.contains(key),
        }
    }

    pub fn len(&self) -> usize {
        match &self.inner {
            CacheInner::Lru(c) => c.len(),
            CacheInner::Lfu(c) => c.len(),
            CacheInner::LruK(c) => c.len(),
            CacheInner::ShardedLru(c) => c.len(),
            CacheInner::ShardedLfu(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Realized capacity; for sharded policies this is the rounded-up total.
    pub fn capacity(&self) -> usize {
        match &self.inner {
            CacheInner::Lru(c) => c.capacity(),
            CacheInner::Lfu(c) => c.capacity(),
            CacheInner::LruK(c) => c.capacity(),
            CacheInner::ShardedLru(c) => c.capacity(),
            CacheInner::ShardedLfu(c) => c.capacity(),
        }
    }

    /// Empties the cache. LFU variants also reset their access counters.
    pub fn clear(&self) {
        match &self.inner {
            CacheInner::Lru(c) => c.clear(),
            CacheInner::Lfu(c) => c.purge(),
            CacheInner::LruK(c) => c.clear(),
            CacheInner::ShardedLru(c) => c.clear(),
            CacheInner::ShardedLfu(c) => c.purge(),
        }
    }
}

impl<K, V> CachePolicy<K, V> for Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) {
        match &self.inner {
            CacheInner::Lru(c) => c.put(key, value),
            CacheInner::Lfu(c) => c.put(key, value),
            CacheInner::LruK(c) => c.put(key, value),
            CacheInner::ShardedLru(c) => c.put(key, value),
            CacheInner::ShardedLfu(c) => c.put(key, value),
        }
    }

    fn get(&self, key: &K) -> Option<V> {
        match &self.inner {
            CacheInner::Lru(c) => c.get(key),
            CacheInner::Lfu(c) => c.get(key),
            CacheInner::LruK(c) => c.get(key),
            CacheInner::ShardedLru(c) => c.get(key),
            CacheInner::ShardedLfu(c) => c.get(key),
        }
    }
}

impl<K: Send, V: Send> ConcurrentCache for Cache<K, V> {}

impl<K, V> fmt::Debug for Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("policy", &self.policy)
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

/// Builder for [`Cache`].
#[derive(Debug, Clone)]
pub struct CacheBuilder {
    capacity: usize,
    history_capacity: Option<usize>,
    aging_ceiling: Option<u64>,
    shards: usize,
    seed: u64,
}

impl CacheBuilder {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            history_capacity: None,
            aging_ceiling: None,
            shards: 0,
            seed: DEFAULT_SHARD_SEED,
        }
    }

    /// LRU-K history size. Defaults to the main capacity.
    pub fn history_capacity(mut self, history_capacity: usize) -> Self {
        self.history_capacity = Some(history_capacity);
        self
    }

    /// LFU aging ceiling. Defaults to `DEFAULT_AGING_CEILING` for a single
    /// engine and `DEFAULT_SHARDED_AGING_CEILING` for the sharded one.
    pub fn aging_ceiling(mut self, aging_ceiling: u64) -> Self {
        self.aging_ceiling = Some(aging_ceiling);
        self
    }

    /// Shard count for sharded policies; 0 means one per available core.
    pub fn shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builds the cache, clamping `k` and the aging ceiling into range.
    pub fn build<K, V>(self, policy: PolicyKind) -> Cache<K, V>
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        let capacity = self.capacity;
        let inner = match policy {
            PolicyKind::Lru => CacheInner::Lru(ConcurrentLruCache::new(capacity)),
            PolicyKind::Lfu => CacheInner::Lfu(ConcurrentLfuCache::with_aging_ceiling(
                capacity,
                self.aging_ceiling.unwrap_or(DEFAULT_AGING_CEILING),
            )),
            PolicyKind::LruK { k } => CacheInner::LruK(ConcurrentLrukCache::with_history(
                capacity,
                self.history_capacity.unwrap_or(capacity),
                k,
            )),
            PolicyKind::ShardedLru => CacheInner::ShardedLru(ShardedCache::with_factory_and_seed(
                capacity,
                self.shards,
                self.seed,
                ConcurrentLruCache::new,
            )),
            PolicyKind::ShardedLfu => {
                let ceiling = self.aging_ceiling.unwrap_or(DEFAULT_SHARDED_AGING_CEILING);
                CacheInner::ShardedLfu(ShardedCache::with_factory_and_seed(
                    capacity,
                    self.shards,
                    self.seed,
                    |cap| ConcurrentLfuCache::with_aging_ceiling(cap, ceiling),
                ))
            },
        };
        Cache { inner, policy }
    }

    /// Like [`build`](Self::build) but rejects invalid parameters.
    pub fn try_build<K, V>(self, policy: PolicyKind) -> Result<Cache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        if let PolicyKind::LruK { k: 0 } = policy {
            return Err(ConfigError::InvalidK);
        }
        if matches!(policy, PolicyKind::Lfu | PolicyKind::ShardedLfu)
            && let Some(ceiling) = self.aging_ceiling
            && ceiling < MIN_AGING_CEILING
        {
            return Err(ConfigError::AgingCeilingTooSmall(ceiling));
        }
        Ok(self.build(policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_every_policy() {
        let policies = [
            PolicyKind::Lru,
            PolicyKind::Lfu,
            PolicyKind::LruK { k: 1 },
            PolicyKind::ShardedLru,
            PolicyKind::ShardedLfu,
        ];
        for policy in policies {
            let cache = CacheBuilder::new(16).shards(2).build::<u32, String>(policy);
            assert_eq!(cache.policy(), policy);
            cache.put(1, "one".to_string());
            assert_eq!(cache.get(&1).as_deref(), Some("one"), "{policy:?}");
            assert!(cache.contains(&1));
            assert_eq!(cache.len(), 1);
            assert_eq!(cache.remove(&1).as_deref(), Some("one"));
            assert!(cache.is_empty());
        }
    }

    #[test]
    fn lru_k_uses_history_capacity() {
        let cache = CacheBuilder::new(5)
            .history_capacity(4)
            .build::<u32, &str>(PolicyKind::LruK { k: 2 });
        cache.put(1, "One");
        assert!(!cache.contains(&1));
        assert_eq!(cache.get(&1), Some("One"));
        assert!(cache.contains(&1));
    }

    #[test]
    fn sharded_capacity_reports_realized_total() {
        let cache = CacheBuilder::new(10)
            .shards(4)
            .seed(7)
            .build::<u32, u32>(PolicyKind::ShardedLru);
        assert_eq!(cache.capacity(), 12);
    }

    #[test]
    fn try_build_rejects_invalid_parameters() {
        assert_eq!(
            CacheBuilder::new(4)
                .try_build::<u8, u8>(PolicyKind::LruK { k: 0 })
                .err(),
            Some(ConfigError::InvalidK)
        );
        assert_eq!(
            CacheBuilder::new(4)
                .aging_ceiling(0)
                .try_build::<u8, u8>(PolicyKind::ShardedLfu)
                .err(),
            Some(ConfigError::AgingCeilingTooSmall(0))
        );
        // the ceiling only matters for LFU policies
        assert!(CacheBuilder::new(4)
            .aging_ceiling(0)
            .try_build::<u8, u8>(PolicyKind::Lru)
            .is_ok());
        // zero capacity is a valid, permanently empty cache
        let cache = CacheBuilder::new(0).try_build::<u8, u8>(PolicyKind::Lru).unwrap();
        cache.put(1, 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn build_clamps_where_try_build_rejects() {
        let cache = CacheBuilder::new(2).build::<u8, u8>(PolicyKind::LruK { k: 0 });
        cache.put(1, 1);
        assert!(cache.contains(&1));
    }

    #[test]
    fn clear_resets_lfu_counters() {
        let cache = CacheBuilder::new(4).build::<u8, u8>(PolicyKind::Lfu);
        cache.put(1, 1);
        cache.get(&1);
        cache.clear();
        assert!(cache.is_empty());
        assert!(format!("{cache:?}").contains("Lfu"));
    }
}
