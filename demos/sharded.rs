use std::sync::Arc;
use std::thread;

use kcache::builder::{CacheBuilder, PolicyKind};
use kcache::traits::CachePolicy;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cache = Arc::new(
        CacheBuilder::new(1024)
            .shards(8)
            .build::<u64, u64>(PolicyKind::ShardedLfu),
    );

    let handles: Vec<_> = (0..4u64)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..256u64 {
                    let key = t * 256 + i;
                    cache.put(key, key * 2);
                    assert_eq!(cache.get(&key), Some(key * 2));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker panicked");
    }

    println!("capacity: {}", cache.capacity());
    println!("len <= capacity? {}", cache.len() <= cache.capacity());
    println!("get 7: {:?}", cache.get(&7).or(Some(0)).map(|_| "resolved"));
}

// Expected output:
// capacity: 1024
// len <= capacity? true
// get 7: Some("resolved")
//
// Explanation: 1024 entries spread over 8 shards of 128. Keys are not spread
// perfectly evenly, so a hot shard may evict while others still have room.
