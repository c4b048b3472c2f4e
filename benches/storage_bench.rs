//! Benchmarks for postkv storage and pagination

use std::sync::Arc;

use bytes::Bytes;
use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use postkv::post::{post_key, POST_PREFIX};
use postkv::{JsonCodec, KeyValueStore, MemoryStore, Page, Paginator, Post, TypedStore};

fn seeded(n: usize) -> TypedStore<MemoryStore> {
    let store = TypedStore::new(Arc::new(MemoryStore::new()), JsonCodec);
    let base = Utc::now();
    for i in 0..n {
        let id = format!("post-{:06}", i);
        let post = Post::with_created_at(&id, "title", "content", base + Duration::seconds(i as i64));
        store.set(&post_key(&id), &post).unwrap();
    }
    store
}

fn storage_benchmarks(c: &mut Criterion) {
    let store = MemoryStore::new();
    let payload = Bytes::from(vec![0xAB; 256]);

    c.bench_function("set_overwrite", |b| {
        b.iter(|| store.set(black_box("posts:bench"), payload.clone()).unwrap())
    });

    store.set("posts:bench", payload.clone()).unwrap();
    c.bench_function("get_hit", |b| {
        b.iter(|| store.get(black_box("posts:bench")).unwrap())
    });
}

fn pagination_benchmarks(c: &mut Criterion) {
    let paginator = Paginator::default();
    let mut group = c.benchmark_group("first_page");

    for n in [100usize, 1_000, 10_000] {
        let store = seeded(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &store, |b, store| {
            b.iter(|| {
                let page: Page<Post> = paginator.page(store, POST_PREFIX, None, 20).unwrap();
                black_box(page)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, storage_benchmarks, pagination_benchmarks);
criterion_main!(benches);
