use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use tiercache::{LocalStore, MemoryStore, Store, TieredCache};

fn setup(rt: &tokio::runtime::Runtime) -> TieredCache<String, String> {
    let local: Arc<LocalStore<String, String>> = Arc::new(LocalStore::with_capacity(1_000));
    let remote: Arc<MemoryStore<String, String>> = Arc::new(MemoryStore::new());

    // Pre-populate: key_0..key_999 in both tiers, key_1000..key_1999 remote only
    rt.block_on(async {
        for i in 0..2_000 {
            let key = format!("key_{}", i);
            if i < 1_000 {
                local.write(key.clone(), "value".to_string()).await.unwrap();
            }
            remote.write(key, "value".to_string()).await.unwrap();
        }
    });

    TieredCache::builder(local, remote)
        .runtime(rt.handle().clone())
        .build()
        .unwrap()
}

fn bench_read_local_hit(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let cache = setup(&rt);
    let key = "key_500".to_string();

    c.bench_function("tiered_read_local_hit", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(cache.read(black_box(&key)).await.unwrap());
        });
    });
}

fn bench_read_remote_hit(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let cache = setup(&rt);
    let key = "key_1500".to_string();

    c.bench_function("tiered_read_remote_hit", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(cache.read(black_box(&key)).await.unwrap());
        });
    });
}

fn bench_write_detached(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let cache = setup(&rt);

    c.bench_function("tiered_write_detached", |b| {
        b.iter(|| {
            cache
                .write(black_box("key_1".to_string()), black_box("v".to_string()))
                .detach();
        });
    });
}

fn bench_write_and_wait(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let cache = setup(&rt);

    c.bench_function("tiered_write_and_wait", |b| {
        b.to_async(&rt).iter(|| async {
            cache
                .write_and_wait(black_box("key_1".to_string()), black_box("v".to_string()))
                .await
                .unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_read_local_hit,
    bench_read_remote_hit,
    bench_write_detached,
    bench_write_and_wait
);
criterion_main!(benches);
