//! Benchmark comparing the ordex indexes against crossbeam-skiplist.
//!
//! Run with: cargo bench --package ordex-bench --bench index_benchmark

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;
use crossbeam_skiplist::SkipSet;
use mimalloc::MiMalloc;
use std::sync::Arc;
use std::thread;

use ordex_core::{
    AvlTree, ConcurrentAvlTree, ConcurrentIndex, ConcurrentSkipList, OrderedIndex, SkipList,
    SkipListConfig,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const OPS_PER_THREAD: usize = 10_000;
const SEARCHES_PER_INSERT: usize = 10;

// ============================================================================
// Generic benchmark helpers
// ============================================================================

/// Sequential ascending build - the AVL tree's rotation-heavy case
fn bench_sequential_build<I>(mut index: I, count: usize) -> I
where
    I: OrderedIndex<i64>,
{
    for key in 0..count as i64 {
        index.insert(key);
    }
    index
}

/// Search every key of a prebuilt index, plus one miss per key
fn bench_search<I>(index: &I, count: usize) -> usize
where
    I: OrderedIndex<i64>,
{
    let mut hits = 0;
    for key in 0..count as i64 {
        if index.search(&key) {
            hits += 1;
        }
        if index.search(&(key + count as i64)) {
            hits += 1;
        }
    }
    hits
}

/// Disjoint concurrent inserts
fn bench_concurrent_insert<C>(index: Arc<C>, thread_count: usize, ops_per_thread: usize)
where
    C: ConcurrentIndex<i64> + 'static,
{
    let mut handles = vec![];

    for t in 0..thread_count {
        let index_clone = Arc::clone(&index);
        let handle = thread::spawn(move || {
            let base = (t * ops_per_thread) as i64;
            for i in 0..ops_per_thread {
                index_clone.insert(base + i as i64);
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

/// Disjoint concurrent inserts, each followed by searches over the full range
fn bench_concurrent_insert_search<C>(index: Arc<C>, thread_count: usize, ops_per_thread: usize)
where
    C: ConcurrentIndex<i64> + 'static,
{
    let total = (thread_count * ops_per_thread) as i64;
    let mut handles = vec![];

    for t in 0..thread_count {
        let index_clone = Arc::clone(&index);
        let handle = thread::spawn(move || {
            let base = (t * ops_per_thread) as i64;
            let mut cursor = base;
            for i in 0..ops_per_thread {
                index_clone.insert(base + i as i64);
                for _ in 0..SEARCHES_PER_INSERT {
                    // Cheap deterministic walk over the key space.
                    cursor = (cursor * 31 + 17) % total;
                    black_box(index_clone.search(&cursor));
                }
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

fn bench_crossbeam_insert(thread_count: usize, ops_per_thread: usize) {
    let set: Arc<SkipSet<i64>> = Arc::new(SkipSet::new());
    let mut handles = vec![];

    for t in 0..thread_count {
        let set_clone = Arc::clone(&set);
        let handle = thread::spawn(move || {
            let base = (t * ops_per_thread) as i64;
            for i in 0..ops_per_thread {
                set_clone.insert(base + i as i64);
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

// ============================================================================
// Single-owner benchmarks
// ============================================================================

fn sequential_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_build");

    for size in [1_000, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::new("avl_tree", size), &size, |b, &size| {
            b.iter(|| bench_sequential_build(AvlTree::new(), black_box(size)))
        });
        group.bench_with_input(BenchmarkId::new("skip_list", size), &size, |b, &size| {
            b.iter(|| bench_sequential_build(SkipList::new(), black_box(size)))
        });
        group.bench_with_input(
            BenchmarkId::new("skip_list_sized", size),
            &size,
            |b, &size| {
                b.iter(|| {
                    bench_sequential_build(
                        SkipList::with_config(SkipListConfig::for_capacity(size)),
                        black_box(size),
                    )
                })
            },
        );
    }

    group.finish();
}

fn search_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    let size = 100_000;

    let tree = bench_sequential_build(AvlTree::new(), size);
    let list = bench_sequential_build(SkipList::new(), size);

    group.bench_function("avl_tree", |b| b.iter(|| bench_search(&tree, black_box(size))));
    group.bench_function("skip_list", |b| b.iter(|| bench_search(&list, black_box(size))));

    group.finish();
}

// ============================================================================
// Concurrent benchmarks
// ============================================================================

fn concurrent_insert_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_insert");

    for threads in [1, 2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("concurrent_avl_tree", threads),
            &threads,
            |b, &threads| {
                b.iter(|| {
                    bench_concurrent_insert(
                        Arc::new(ConcurrentAvlTree::new()),
                        black_box(threads),
                        black_box(OPS_PER_THREAD),
                    )
                })
            },
        );
        group.bench_with_input(
            BenchmarkId::new("concurrent_skip_list", threads),
            &threads,
            |b, &threads| {
                b.iter(|| {
                    bench_concurrent_insert(
                        Arc::new(ConcurrentSkipList::new()),
                        black_box(threads),
                        black_box(OPS_PER_THREAD),
                    )
                })
            },
        );
        group.bench_with_input(
            BenchmarkId::new("crossbeam_skipset", threads),
            &threads,
            |b, &threads| {
                b.iter(|| bench_crossbeam_insert(black_box(threads), black_box(OPS_PER_THREAD)))
            },
        );
    }

    group.finish();
}

fn concurrent_insert_search_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_insert_search");
    group.sample_size(10);

    for threads in [1, 2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("concurrent_avl_tree", threads),
            &threads,
            |b, &threads| {
                b.iter(|| {
                    bench_concurrent_insert_search(
                        Arc::new(ConcurrentAvlTree::new()),
                        black_box(threads),
                        black_box(OPS_PER_THREAD),
                    )
                })
            },
        );
        group.bench_with_input(
            BenchmarkId::new("concurrent_skip_list", threads),
            &threads,
            |b, &threads| {
                b.iter(|| {
                    bench_concurrent_insert_search(
                        Arc::new(ConcurrentSkipList::new()),
                        black_box(threads),
                        black_box(OPS_PER_THREAD),
                    )
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    sequential_benchmark,
    search_benchmark,
    concurrent_insert_benchmark,
    concurrent_insert_search_benchmark
);
criterion_main!(benches);
