#![no_main]

use kcache::ds::{ShardSelector, per_shard_capacity};
use libfuzzer_sys::fuzz_target;

// Routing is in range and deterministic for a given (shard count, seed).
fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let shard_count = usize::from(data[0] % 32);
    let seed = u64::from(data[1]);
    let selector = ShardSelector::new(shard_count, seed);
    let twin = ShardSelector::new(shard_count, seed);

    assert_eq!(selector.shard_count(), shard_count.max(1));

    for window in data[2..].windows(2) {
        let key = u16::from_le_bytes([window[0], window[1]]);
        let shard = selector.shard_for_key(&key);
        assert!(shard < selector.shard_count());
        assert_eq!(shard, twin.shard_for_key(&key));
    }

    let capacity = usize::from(data[2]) * 7;
    let per_shard = per_shard_capacity(capacity, selector.shard_count());
    assert!(per_shard * selector.shard_count() >= capacity);
    assert!(per_shard * selector.shard_count() < capacity + selector.shard_count());
});
