//! kcache: in-memory key-value caches with LRU, LFU, and LRU-K eviction.
//!
//! Every policy has a single-threaded core (`LruCore`, `LfuCore`,
//! `LrukCore`) and a thread-safe wrapper that serializes access with a
//! mutex. [`policy::sharded`] splits the key space over independent
//! wrappers to cut contention, and [`builder`] selects an engine at runtime.
//!
//! ```
//! use kcache::prelude::*;
//!
//! let cache = ConcurrentLruCache::new(2);
//! cache.put(1, "one");
//! cache.put(2, "two");
//! cache.get(&1);
//! cache.put(3, "three");
//! assert_eq!(cache.get(&2), None);
//! ```

pub mod builder;
pub mod ds;
pub mod error;
pub mod policy;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod traits;
