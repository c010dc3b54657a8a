use kcache::policy::lru_k::ConcurrentLrukCache;
use kcache::traits::CachePolicy;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // main capacity 5, history capacity 4, admit on the second observation
    let cache: ConcurrentLrukCache<u32, &str> = ConcurrentLrukCache::with_history(5, 4, 2);

    cache.put(1, "One");
    println!("admitted after put? {}", cache.contains(&1));
    println!("get 1: {:?}", cache.get(&1));
    println!("admitted after get? {}", cache.contains(&1));

    cache.put(2, "Two");
    println!("get 2: {:?}", cache.get(&2));
    println!("len: {}", cache.len());
}

// Expected output:
// admitted after put? false
// get 1: Some("One")
// admitted after get? true
// get 2: Some("Two")
// len: 2
//
// Explanation: the first put only records an observation and parks the value.
// The get is the second observation, which admits the key into the LRU cache.
