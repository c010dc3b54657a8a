pub mod frequency_buckets;
pub mod intrusive_list;
pub mod shard;
pub mod slot_arena;

pub use frequency_buckets::{DEFAULT_BUCKET_PREALLOC, FrequencyBuckets};
pub use intrusive_list::IntrusiveList;
pub use shard::{DEFAULT_SHARD_SEED, ShardSelector, per_shard_capacity, resolve_shard_count};
pub use slot_arena::{SlotArena, SlotId};
