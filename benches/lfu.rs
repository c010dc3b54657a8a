use kcache::policy::lfu::LfuCore;
use kcache::traits::{CoreCache, LfuCacheTrait};
use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn filled(capacity: u64, aging_ceiling: u64) -> LfuCore<u64, u64> {
    let mut cache = LfuCore::with_aging_ceiling(capacity as usize, aging_ceiling);
    for i in 0..capacity {
        cache.insert(i, i);
    }
    cache
}

fn bench_lfu_insert_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("lfu");
    group.throughput(Throughput::Elements(2048));
    group.bench_function("insert_get", |b| {
        b.iter_batched(
            || filled(1024, 1_000_000),
            |mut cache| {
                for i in 0..1024u64 {
                    cache.insert(std::hint::black_box(i + 10_000), i);
                    let _ = std::hint::black_box(cache.get(&std::hint::black_box(i)));
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_lfu_pop_lfu(c: &mut Criterion) {
    c.bench_function("lfu_pop_lfu", |b| {
        b.iter_batched(
            || {
                let mut cache = filled(1024, 1_000_000);
                for i in 0..1024u64 {
                    for _ in 0..(i % 8) {
                        cache.get(&i);
                    }
                }
                cache
            },
            |mut cache| {
                for _ in 0..1024u64 {
                    let _ = std::hint::black_box(cache.pop_lfu());
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_lfu_skewed_hits(c: &mut Criterion) {
    c.bench_function("lfu_skewed_hits", |b| {
        b.iter_batched(
            || (filled(1024, 1_000_000), SmallRng::seed_from_u64(42)),
            |(mut cache, mut rng)| {
                for _ in 0..4096u64 {
                    // three quarters of the traffic goes to 64 hot keys
                    let key = if rng.random::<u8>() < 192 {
                        rng.random::<u64>() % 64
                    } else {
                        rng.random::<u64>() % 8192
                    };
                    if cache.get(&key).is_none() {
                        cache.insert(key, key);
                    }
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_lfu_aging(c: &mut Criterion) {
    // a low ceiling makes most hits trigger a decay pass
    c.bench_function("lfu_aging_low_ceiling", |b| {
        b.iter_batched(
            || filled(256, 4),
            |mut cache| {
                for i in 0..4096u64 {
                    let _ = std::hint::black_box(cache.get(&std::hint::black_box(i % 16)));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_lfu_insert_get,
    bench_lfu_pop_lfu,
    bench_lfu_skewed_hits,
    bench_lfu_aging
);
criterion_main!(benches);
