#![no_main]

use kcache::ds::FrequencyBuckets;
use libfuzzer_sys::fuzz_target;

// Random sequences of insert, touch, remove, pop_min, decay_by and clear.
// Structural invariants are checked after every step.
fuzz_target!(|data: &[u8]| {
    let mut buckets: FrequencyBuckets<u8, u16> = FrequencyBuckets::new();

    for chunk in data.chunks_exact(3) {
        let key = chunk[1];
        let arg = chunk[2];

        match chunk[0] % 8 {
            0 => {
                let had = buckets.contains(&key);
                let previous = buckets.insert(key, u16::from(arg));
                assert_eq!(previous.is_some(), had);
            },
            1 => {
                let before = buckets.frequency(&key);
                let after = buckets.touch(&key);
                assert_eq!(after, before.map(|f| f + 1));
            },
            2 => {
                let before = buckets.frequency(&key);
                let removed = buckets.remove(&key);
                assert_eq!(removed.map(|(_, f)| f), before);
            },
            3 => {
                let min = buckets.min_freq();
                let popped = buckets.pop_min();
                assert_eq!(popped.map(|(_, _, f)| f), min);
            },
            4 => {
                let len = buckets.len();
                buckets.decay_by(u64::from(arg % 8));
                assert_eq!(buckets.len(), len);
                if let Some(min) = buckets.min_freq() {
                    assert!(min >= 1);
                }
            },
            5 => {
                if let Some((_, _, freq)) = buckets.peek_min() {
                    assert_eq!(Some(freq), buckets.min_freq());
                }
            },
            6 => {
                let total: u64 = buckets.iter().map(|(_, _, f)| f).sum();
                assert_eq!(total, buckets.frequency_sum());
            },
            7 => buckets.clear(),
            _ => unreachable!(),
        }

        buckets.check_invariants().unwrap();
        if buckets.is_empty() {
            assert_eq!(buckets.min_freq(), None);
            assert_eq!(buckets.bucket_count(), 0);
        }
    }
});
