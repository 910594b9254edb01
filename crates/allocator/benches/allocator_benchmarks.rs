//! Pool allocator benchmarks
//!
//! Covers the allocate/free cycle, first-fit scans over a fragmented
//! directory, and the three resize paths.

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use mempool_allocator::{PoolAllocator, PoolConfig};
use std::hint::black_box;

fn pool(capacity: usize) -> PoolAllocator {
    PoolAllocator::with_config(capacity, PoolConfig::performance()).unwrap()
}

/// Benchmark single allocation/free cycle
fn bench_single_allocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_allocation");

    for size in [16usize, 256, 4096] {
        group.bench_with_input(BenchmarkId::new("pool", size), &size, |b, &size| {
            let mut allocator = pool(1024 * 1024);
            b.iter(|| {
                let handle = allocator.allocate(size).unwrap();
                allocator.free(black_box(handle)).unwrap();
            });
        });
    }

    group.finish();
}

/// Benchmark batch allocations followed by frees in reverse order
fn bench_batch_allocations(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_allocations");
    group.throughput(Throughput::Elements(100));

    group.bench_function("pool_100x64b", |b| {
        let mut allocator = pool(1024 * 1024);
        b.iter(|| {
            let mut handles = Vec::with_capacity(100);
            for _ in 0..100 {
                handles.push(allocator.allocate(64).unwrap());
            }
            for handle in handles.into_iter().rev() {
                allocator.free(handle).unwrap();
            }
        });
    });

    group.finish();
}

/// First-fit scan cost when many small holes precede the only large block
fn bench_fragmented_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("fragmented_scan");

    for holes in [16usize, 128, 1024] {
        group.bench_with_input(BenchmarkId::new("holes", holes), &holes, |b, &holes| {
            let mut allocator = pool(holes * 16 + 4096);
            let pinned: Vec<_> = (0..holes * 2)
                .map(|_| allocator.allocate(8).unwrap())
                .collect();
            for handle in pinned.iter().step_by(2) {
                allocator.free(*handle).unwrap();
            }

            b.iter(|| {
                let handle = allocator.allocate(1024).unwrap();
                allocator.free(black_box(handle)).unwrap();
            });
        });
    }

    group.finish();
}

/// Resize paths: shrink, grow in place, and relocate
fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("resize");

    group.bench_function("shrink_grow_in_place", |b| {
        let mut allocator = pool(64 * 1024);
        let handle = allocator.allocate(4096).unwrap();
        b.iter(|| {
            let small = allocator.resize(Some(handle), 512).unwrap();
            let big = allocator.resize(small, 4096).unwrap();
            black_box(big);
        });
    });

    group.bench_function("relocate_2k_to_4k", |b| {
        b.iter_batched(
            || {
                let mut allocator = pool(8 * 1024);
                let handle = allocator.allocate(2048).unwrap();
                // a wall behind the block forces the copy path
                allocator.allocate(16).unwrap();
                (allocator, handle)
            },
            |(mut allocator, handle)| {
                let moved = allocator.resize(Some(handle), 4096).unwrap();
                black_box(moved);
                allocator
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_single_allocation,
    bench_batch_allocations,
    bench_fragmented_scan,
    bench_resize
);
criterion_main!(benches);
