#![no_main]

use kcache::policy::lfu::LfuCore;
use kcache::traits::{CoreCache, LfuCacheTrait, MutableCache};
use libfuzzer_sys::fuzz_target;

// Small capacity and ceiling so eviction and aging both fire often.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let capacity = usize::from(data[0] % 8);
    let ceiling = u64::from(data[1] % 16);
    let mut cache: LfuCore<u8, u8> = LfuCore::with_aging_ceiling(capacity, ceiling);

    for pair in data[2..].chunks_exact(2) {
        let key = pair[1];
        match pair[0] % 5 {
            0 | 1 => {
                let victim = if cache.len() == cache.capacity() && !cache.contains(&key) {
                    cache.peek_lfu().map(|(k, _)| *k)
                } else {
                    None
                };
                cache.insert(key, pair[0]);
                if let Some(victim) = victim {
                    assert!(!cache.contains(&victim));
                }
            },
            2 => {
                let _ = cache.get(&key);
            },
            3 => {
                let _ = cache.remove(&key);
            },
            4 => {
                let _ = cache.pop_lfu();
            },
            _ => unreachable!(),
        }

        cache.check_invariants().unwrap();
        assert!(cache.len() <= cache.capacity());
    }
});
