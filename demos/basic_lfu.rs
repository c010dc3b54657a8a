use kcache::policy::lfu::ConcurrentLfuCache;
use kcache::traits::CachePolicy;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cache: ConcurrentLfuCache<u32, &str> = ConcurrentLfuCache::with_aging_ceiling(3, 100);

    cache.put(1, "One");
    cache.put(2, "Two");
    cache.put(3, "Three");
    for _ in 0..600 {
        cache.get(&1);
    }

    println!("freq 1 after aging: {:?}", cache.frequency(&1));
    println!("total accesses: {}", cache.total_access_count());

    cache.put(4, "Four");
    println!("contains 2? {}", cache.contains(&2));
    println!("get 1: {:?}", cache.get(&1));
}

// Expected output:
// freq 1 after aging: Some(251)
// total accesses: 253
// contains 2? false
// get 1: Some("One")
//
// Explanation: once the average frequency crosses the ceiling of 100, every
// entry is aged by 50 (floored at 1). Key 1 stays hot while keys 2 and 3 sit at
// frequency 1, and key 2 is the older of the two, so it is the victim.
