// ==============================================
// SHARDED / LOCKED ENGINE CONCURRENCY TESTS (integration)
// ==============================================
//
// Several threads start together on a Barrier and hammer one shared cache.
// Afterwards every shard must still satisfy its structural invariants.

use std::sync::{Arc, Barrier};
use std::thread;

use kcache::policy::lfu::ConcurrentLfuCache;
use kcache::policy::lru::ConcurrentLruCache;
use kcache::policy::lru_k::ConcurrentLrukCache;
use kcache::policy::sharded::{ShardedCache, ShardedLfuCache, ShardedLruCache};
use kcache::traits::CachePolicy;

const THREADS: usize = 8;
const OPS_PER_THREAD: u64 = 2_000;

fn run_workers<C>(cache: &Arc<C>, key_space: u64)
where
    C: CachePolicy<u64, u64> + Send + Sync + 'static,
{
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS as u64)
        .map(|t| {
            let cache = Arc::clone(cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..OPS_PER_THREAD {
                    let key = (t * 31 + i * 7) % key_space;
                    match i % 3 {
                        0 => cache.put(key, key + 1),
                        _ => {
                            // values are always key + 1, whoever wrote them
                            if let Some(value) = cache.get(&key) {
                                assert_eq!(value, key + 1);
                            }
                        },
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker thread panicked");
    }
}

#[test]
fn sharded_lru_survives_contention() {
    let cache = Arc::new(ShardedLruCache::new(256, 8));
    run_workers(&cache, 1_024);

    assert!(cache.len() <= cache.capacity());
    for shard in cache.shards() {
        shard.check_invariants().unwrap();
        assert!(shard.len() <= cache.shard_capacity());
    }
}

#[test]
fn sharded_lfu_survives_contention() {
    let cache = Arc::new(ShardedLfuCache::new(256, 8));
    run_workers(&cache, 1_024);

    assert!(cache.len() <= cache.capacity());
    for shard in cache.shards() {
        shard.check_invariants().unwrap();
    }
}

#[test]
fn single_lock_engines_survive_contention() {
    let lru = Arc::new(ConcurrentLruCache::new(128));
    run_workers(&lru, 512);
    lru.check_invariants().unwrap();

    let lfu = Arc::new(ConcurrentLfuCache::with_aging_ceiling(128, 16));
    run_workers(&lfu, 512);
    lfu.check_invariants().unwrap();

    let lru_k = Arc::new(ConcurrentLrukCache::with_history(128, 256, 2));
    run_workers(&lru_k, 512);
    lru_k.check_invariants().unwrap();
    assert!(lru_k.len() <= 128);
}

#[test]
fn keys_stay_on_their_shard() {
    let cache = Arc::new(ShardedLruCache::new(4_096, 16));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS as u64)
        .map(|t| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let base = t * 1_000;
                for key in base..base + 200 {
                    cache.put(key, key);
                }
                for key in base..base + 200 {
                    let shard = cache.shard_for_key(&key);
                    assert_eq!(shard, cache.shard_for_key(&key));
                    assert!(cache.shard(shard).unwrap().contains(&key));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker thread panicked");
    }

    // capacity was never reached, so nothing was evicted
    assert_eq!(cache.len(), THREADS * 200);
}

#[test]
fn factory_sharding_wraps_lru_k() {
    let cache = Arc::new(ShardedCache::with_factory(512, 4, |cap| {
        ConcurrentLrukCache::<u64, u64>::with_history(cap, cap, 2)
    }));
    run_workers(&cache, 256);

    for shard in cache.shards() {
        shard.check_invariants().unwrap();
    }
}
