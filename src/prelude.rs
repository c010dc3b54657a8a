pub use crate::builder::{Cache, CacheBuilder, PolicyKind};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::policy::lfu::{ConcurrentLfuCache, LfuCore};
pub use crate::policy::lru::{ConcurrentLruCache, LruCore};
pub use crate::policy::lru_k::{ConcurrentLrukCache, LrukCore};
pub use crate::policy::sharded::{ShardedCache, ShardedLfuCache, ShardedLruCache};
pub use crate::traits::{
    CachePolicy, ConcurrentCache, CoreCache, LfuCacheTrait, LruCacheTrait, LrukCacheTrait,
    MutableCache,
};

#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::{LfuMetricsSnapshot, LruMetricsSnapshot, LrukMetricsSnapshot};
