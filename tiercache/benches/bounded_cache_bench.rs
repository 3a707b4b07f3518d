use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use std::thread;
use tiercache::BoundedCache;

fn bench_put_no_eviction(c: &mut Criterion) {
    let cache = BoundedCache::new(100_000);

    c.bench_function("bounded_put_overwrite", |b| {
        b.iter(|| {
            cache.put(black_box(42u64), black_box(7u64));
        });
    });
}

fn bench_put_with_eviction(c: &mut Criterion) {
    let mut group = c.benchmark_group("bounded_put_evicting");

    for capacity in [100usize, 10_000, 1_000_000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &capacity| {
                let cache = BoundedCache::new(capacity);
                let mut next = 0u64;
                b.iter(|| {
                    cache.put(black_box(next), black_box(next));
                    next += 1;
                });
            },
        );
    }
    group.finish();
}

fn bench_get_hit(c: &mut Criterion) {
    let cache = BoundedCache::new(10_000);

    // Pre-populate
    for i in 0..10_000u64 {
        cache.put(i, format!("value_{}", i));
    }

    let mut i = 0u64;
    c.bench_function("bounded_get_hit", |b| {
        b.iter(|| {
            i = (i + 7919) % 10_000;
            black_box(cache.get(&i));
        });
    });
}

fn bench_get_or_default(c: &mut Criterion) {
    let cache = BoundedCache::new(10_000);
    for i in 0..10_000u64 {
        cache.put(i, i);
    }

    c.bench_function("bounded_get_or_default", |b| {
        b.iter(|| black_box(cache.get_or_default(&black_box(5_000u64), 0)));
    });
}

fn bench_contended_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("bounded_contended");

    for threads in [2usize, 4, 8] {
        group.bench_with_input(
            BenchmarkId::from_parameter(threads),
            &threads,
            |b, &threads| {
                let cache = Arc::new(BoundedCache::new(1_000));
                b.iter(|| {
                    let handles: Vec<_> = (0..threads)
                        .map(|t| {
                            let cache = Arc::clone(&cache);
                            thread::spawn(move || {
                                for i in 0..1_000u64 {
                                    let key = (t as u64) * 1_000 + i % 2_000;
                                    if i % 4 == 0 {
                                        cache.put(key, i);
                                    } else {
                                        black_box(cache.get(&key));
                                    }
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        handle.join().unwrap();
                    }
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_put_no_eviction,
    bench_put_with_eviction,
    bench_get_hit,
    bench_get_or_default,
    bench_contended_mixed
);
criterion_main!(benches);
