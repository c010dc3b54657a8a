#![no_main]

use kcache::policy::lru_k::LrukCore;
use kcache::traits::{CoreCache, LrukCacheTrait, MutableCache};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }
    let capacity = usize::from(data[0] % 8);
    let history = usize::from(data[1] % 8);
    let k = usize::from(data[2] % 4);
    let mut cache: LrukCore<u8, u8> = LrukCore::with_history(capacity, history, k);

    for pair in data[3..].chunks_exact(2) {
        let key = pair[1];
        match pair[0] % 4 {
            0 | 1 => {
                cache.insert(key, pair[0]);
            },
            2 => {
                let _ = cache.get(&key);
            },
            3 => {
                cache.remove(&key);
                assert!(!cache.contains(&key));
                assert!(!cache.is_pending(&key));
            },
            _ => unreachable!(),
        }

        cache.check_invariants().unwrap();
        assert!(cache.len() <= cache.capacity());
        assert!(cache.history_len() <= cache.history_capacity());
        assert!(cache.k_value() >= 1);
    }
});
