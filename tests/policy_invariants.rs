// ==============================================
// CROSS-POLICY BEHAVIOR TESTS (integration)
// ==============================================
//
// Behavior that spans several modules: the reference scenarios for each
// engine, capacity-0 handling, and the builder driving every policy through
// the same `CachePolicy` surface.

use kcache::builder::{CacheBuilder, PolicyKind};
use kcache::policy::lfu::ConcurrentLfuCache;
use kcache::policy::lru::ConcurrentLruCache;
use kcache::policy::lru_k::ConcurrentLrukCache;
use kcache::policy::sharded::{ShardedLfuCache, ShardedLruCache};
use kcache::traits::CachePolicy;

// ==============================================
// Reference Scenarios
// ==============================================

mod scenarios {
    use super::*;

    fn lru_after_fourth_put() -> ConcurrentLruCache<u32, String> {
        let cache = ConcurrentLruCache::new(3);
        cache.put(1, "One".to_string());
        cache.put(2, "Two".to_string());
        cache.put(3, "Three".to_string());
        cache.put(4, "Four".to_string());
        cache
    }

    #[test]
    fn lru_evicts_oldest_insert() {
        let cache = lru_after_fourth_put();
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&4).as_deref(), Some("Four"));
    }

    #[test]
    fn lru_get_protects_key_from_next_eviction() {
        let cache = lru_after_fourth_put();
        assert_eq!(cache.get(&2).as_deref(), Some("Two"));
        cache.put(5, "Five".to_string());
        assert_eq!(cache.get(&3), None);
        assert_eq!(cache.get(&2).as_deref(), Some("Two"));
        cache.check_invariants().unwrap();
    }

    #[test]
    fn lfu_hot_key_survives_aging() {
        let cache = ConcurrentLfuCache::with_aging_ceiling(3, 100);
        cache.put(1, "One");
        cache.put(2, "Two");
        cache.put(3, "Three");
        for _ in 0..600 {
            cache.get(&1);
        }

        let hot = cache.frequency(&1).unwrap();
        // without aging the count would have reached 601
        assert!(hot < 601);
        assert!(hot > cache.frequency(&2).unwrap());
        assert!(hot > cache.frequency(&3).unwrap());

        cache.put(4, "Four");
        assert!(cache.contains(&1));
        assert!(!(cache.contains(&2) && cache.contains(&3)));
        assert_eq!(cache.len(), 3);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn lru_k_admits_on_second_get() {
        let cache = ConcurrentLrukCache::with_history(5, 4, 2);
        cache.put(1, "One");
        assert!(!cache.contains(&1));
        assert!(cache.is_pending(&1));
        assert_eq!(cache.get(&1), Some("One"));
        assert!(cache.contains(&1));
    }

    #[test]
    fn lru_k_admits_on_second_put() {
        let cache = ConcurrentLrukCache::with_history(5, 4, 2);
        cache.put(1, "One");
        cache.put(1, "One");
        assert!(cache.contains(&1));
        assert_eq!(cache.get(&1), Some("One"));
        cache.check_invariants().unwrap();
    }
}

// ==============================================
// Capacity-0 Behavior
// ==============================================
//
// Every engine keeps a zero capacity: puts are dropped, gets miss.

mod zero_capacity {
    use super::*;

    fn assert_inert<C: CachePolicy<u32, u32>>(cache: &C) {
        for i in 0..8 {
            cache.put(i, i);
        }
        for i in 0..8 {
            assert_eq!(cache.get(&i), None);
        }
    }

    #[test]
    fn every_engine_stays_empty() {
        let lru = ConcurrentLruCache::new(0);
        assert_inert(&lru);
        assert_eq!(lru.len(), 0);
        assert_eq!(lru.capacity(), 0);

        let lfu = ConcurrentLfuCache::new(0);
        assert_inert(&lfu);
        assert_eq!(lfu.len(), 0);
        assert_eq!(lfu.total_access_count(), 0);

        let lru_k = ConcurrentLrukCache::new(0);
        assert_inert(&lru_k);
        assert_eq!(lru_k.len(), 0);
        assert_eq!(lru_k.pending_len(), 0);

        let sharded = ShardedLruCache::new(0, 4);
        assert_inert(&sharded);
        assert_eq!(sharded.len(), 0);
        assert_eq!(sharded.capacity(), 0);
    }

    #[test]
    fn lru_k_without_history_admits_nothing_below_k() {
        let cache = ConcurrentLrukCache::with_history(4, 0, 2);
        cache.put(1, 1);
        cache.put(1, 1);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.pending_len(), 0);

        // k = 1 bypasses the history entirely
        let eager = ConcurrentLrukCache::with_history(4, 0, 1);
        eager.put(1, 1);
        assert_eq!(eager.get(&1), Some(1));
    }
}

// ==============================================
// Shared CachePolicy Surface
// ==============================================

mod policy_surface {
    use super::*;

    const ALL: [PolicyKind; 5] = [
        PolicyKind::Lru,
        PolicyKind::Lfu,
        PolicyKind::LruK { k: 1 },
        PolicyKind::ShardedLru,
        PolicyKind::ShardedLfu,
    ];

    #[test]
    fn len_never_exceeds_capacity() {
        for policy in ALL {
            let cache = CacheBuilder::new(32).shards(4).build::<u64, u64>(policy);
            for i in 0..1_000u64 {
                cache.put(i % 97, i);
                cache.get(&(i % 13));
                assert!(cache.len() <= cache.capacity(), "{policy:?}");
            }
        }
    }

    #[test]
    fn put_overwrites_existing_value() {
        for policy in ALL {
            let cache = CacheBuilder::new(8).shards(2).build::<&str, u32>(policy);
            cache.put("k", 1);
            cache.put("k", 2);
            assert_eq!(cache.get(&"k"), Some(2), "{policy:?}");
            assert_eq!(cache.len(), 1);
        }
    }

    #[test]
    fn get_or_default_reports_misses_as_default() {
        for policy in ALL {
            let cache = CacheBuilder::new(4).build::<u8, String>(policy);
            assert_eq!(cache.get_or_default(&9), String::new());
            cache.put(9, "nine".to_string());
            assert_eq!(cache.get_or_default(&9), "nine");
        }
    }

    #[test]
    fn boxed_policies_share_one_interface() {
        let caches: Vec<Box<dyn CachePolicy<u32, u32> + Send + Sync>> = vec![
            Box::new(ConcurrentLruCache::new(4)),
            Box::new(ConcurrentLfuCache::new(4)),
            Box::new(ConcurrentLrukCache::with_history(4, 4, 1)),
            Box::new(ShardedLruCache::new(4, 2)),
            Box::new(ShardedLfuCache::new(4, 2)),
        ];
        for cache in &caches {
            cache.put(7, 49);
            assert_eq!(cache.get(&7), Some(49));
            assert_eq!(cache.get(&8), None);
        }
    }
}

// ==============================================
// Eviction Order Properties
// ==============================================

mod eviction_order {
    use super::*;

    #[test]
    fn lru_evicts_in_insertion_order_without_reads() {
        let capacity = 16u32;
        let extra = 5u32;
        let cache = ConcurrentLruCache::new(capacity as usize);
        for i in 0..capacity + extra {
            cache.put(i, i);
        }
        for i in 0..extra {
            assert!(!cache.contains(&i));
        }
        for i in extra..capacity + extra {
            assert!(cache.contains(&i));
        }
    }

    #[test]
    fn lfu_evicts_least_recent_among_lowest_frequency() {
        let cache = ConcurrentLfuCache::new(3);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);
        cache.get(&"a");
        cache.get(&"b");
        cache.get(&"b");
        // a: 2, b: 3, c: 1
        cache.put("d", 4);
        assert!(!cache.contains(&"c"));
        // d: 1 is now the only minimum
        cache.put("e", 5);
        assert!(!cache.contains(&"d"));
        assert!(cache.contains(&"a"));
        assert_eq!(cache.frequency(&"e"), Some(1));
    }

    #[test]
    fn lru_k_main_eviction_forgets_history() {
        let cache = ConcurrentLrukCache::with_history(1, 4, 2);
        cache.put(1, "one");
        cache.put(1, "one");
        cache.put(2, "two");
        cache.put(2, "two");
        // admitting 2 evicted 1; a single get does not readmit it
        assert!(!cache.contains(&1));
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.history_count(&1), Some(1));
    }
}
