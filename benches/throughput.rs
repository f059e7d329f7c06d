//! Throughput Benchmark for stashkv
//!
//! This benchmark measures the performance of the store and the cursor
//! commit path under various workloads.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use serde_json::json;
use stashkv::storage::{Entry, Store};
use stashkv::txn::Cursor;
use std::sync::Arc;

fn bench_store_path() -> std::path::PathBuf {
    std::env::temp_dir().join("stashkv-bench.json")
}

/// Benchmark SET operations
fn bench_set(c: &mut Criterion) {
    let store = Arc::new(Store::new(bench_store_path()));

    let mut group = c.benchmark_group("set");
    group.throughput(Throughput::Elements(1));

    group.bench_function("set_scalar", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("key:{}", i);
            store.set(&key, Entry::new(json!("small_value")));
            i += 1;
        });
    });

    group.bench_function("set_structured", |b| {
        let mut i = 0u64;
        let value = json!({"items": (0..64).collect::<Vec<u32>>(), "label": "medium"});
        b.iter(|| {
            let key = format!("key:{}", i);
            store.set(&key, Entry::new(value.clone()));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark GET operations
fn bench_get(c: &mut Criterion) {
    let store = Arc::new(Store::new(bench_store_path()));

    // Pre-populate with data
    for i in 0..100_000 {
        let key = format!("key:{}", i);
        store.set(&key, Entry::new(json!(i)));
    }

    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_existing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("key:{}", i % 100_000);
            black_box(store.get(&key));
            i += 1;
        });
    });

    group.bench_function("get_missing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("missing:{}", i);
            black_box(store.get(&key));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark cursor commits
fn bench_commit(c: &mut Criterion) {
    let store = Arc::new(Store::new(bench_store_path()));

    let mut group = c.benchmark_group("commit");

    group.throughput(Throughput::Elements(1));
    group.bench_function("commit_single_key", |b| {
        let mut cursor = Cursor::new(Arc::clone(&store));
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("key:{}", i);
            cursor.set(&key, json!(i));
            cursor.commit();
            i += 1;
        });
    });

    group.throughput(Throughput::Elements(64));
    group.bench_function("commit_batch_64", |b| {
        let mut cursor = Cursor::new(Arc::clone(&store));
        let mut i = 0u64;
        b.iter(|| {
            for j in 0..64 {
                let key = format!("key:{}:{}", i, j);
                cursor.set(&key, json!(j));
            }
            cursor.commit();
            i += 1;
        });
    });

    group.finish();
}

criterion_group!(benches, bench_set, bench_get, bench_commit);
criterion_main!(benches);
