//! Key-to-shard routing for the sharded cache wrappers.
//!
//! ```text
//!   key ──► DefaultHasher(seed, key) ──► finish() % shards ──► shard index
//!
//!   ┌─────────┬─────────┬─────────┬─────────┐
//!   │ Shard 0 │ Shard 1 │ Shard 2 │ Shard 3 │   each: own lock, own capacity
//!   └─────────┴─────────┴─────────┴─────────┘
//! ```
//!
//! `DefaultHasher::new()` uses fixed keys, so a given `(seed, key, shards)`
//! maps to the same shard for the lifetime of a wrapper and across runs.
//!
//! ```
//! use kcache::ds::ShardSelector;
//!
//! let selector = ShardSelector::new(4, 0);
//! let shard = selector.shard_for_key(&"user:123");
//! assert!(shard < 4);
//! assert_eq!(selector.shard_for_key(&"user:123"), shard);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

/// Seed used by the sharded wrappers unless one is configured.
pub const DEFAULT_SHARD_SEED: u64 = 0;

/// Deterministic seeded hash router onto `[0, shards)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardSelector {
    shards: usize,
    seed: u64,
}

impl ShardSelector {
    /// Creates a selector over `shards` shards. Zero is clamped to 1.
    pub fn new(shards: usize, seed: u64) -> Self {
        Self {
            shards: shards.max(1),
            seed,
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn shard_for_key<K: Hash + ?Sized>(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        key.hash(&mut hasher);
        (hasher.finish() % self.shards as u64) as usize
    }
}

impl Default for ShardSelector {
    fn default() -> Self {
        Self::new(1, DEFAULT_SHARD_SEED)
    }
}

/// Resolves a requested shard count; `0` means one shard per available core.
pub fn resolve_shard_count(requested: usize) -> usize {
    if requested > 0 {
        return requested;
    }
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Per-shard capacity: `ceil(capacity / shards)`.
///
/// The aggregate `shards * per_shard` may exceed `capacity` by up to
/// `shards - 1` entries.
pub fn per_shard_capacity(capacity: usize, shards: usize) -> usize {
    capacity.div_ceil(shards.max(1))
}
