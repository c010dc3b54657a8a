use kcache::policy::lru::ConcurrentLruCache;
use kcache::traits::CachePolicy;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cache: ConcurrentLruCache<u32, String> = ConcurrentLruCache::new(3);

    cache.put(1, "One".to_string());
    cache.put(2, "Two".to_string());
    cache.put(3, "Three".to_string());
    cache.put(4, "Four".to_string());

    println!("get 1: {:?}", cache.get(&1));
    println!("get 2: {:?}", cache.get(&2));
    println!("get 4: {:?}", cache.get(&4));
}

// Expected output:
// get 1: None
// get 2: Some("Two")
// get 4: Some("Four")
//
// Explanation: capacity=3; inserting key 4 evicts key 1, the least recently
// used entry. Run with RUST_LOG=kcache=trace to see the eviction event.
