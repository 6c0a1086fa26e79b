//! # Striped List Benchmark
//!
//! Measures concurrent appends into per-tile lists, the access pattern of
//! cluster assignment.
//!
//! Run with: `cargo bench --package lumina_core`

#![allow(missing_docs)]

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lumina_core::{StripedLists, WorkerPool};

/// Tile count of the default 16x8x24 grid.
const TILE_COUNT: usize = 3072;

fn bench_single_thread_push(c: &mut Criterion) {
    let mut lists = StripedLists::<u32>::with_capacity(TILE_COUNT, 8);
    c.bench_function("striped_push_single_thread", |b| {
        b.iter(|| {
            lists.clear();
            for tile in 0..TILE_COUNT {
                lists.push(tile, black_box(tile as u32));
            }
        });
    });
}

fn bench_pool_push(c: &mut Criterion) {
    let pool = WorkerPool::new(3);
    let mut group = c.benchmark_group("striped_push_pool");

    for jobs in [1usize, 3] {
        group.bench_with_input(BenchmarkId::from_parameter(jobs), &jobs, |b, &jobs| {
            b.iter(|| {
                let lists = Arc::new(StripedLists::<u32>::new(TILE_COUNT));
                let handles: Vec<_> = (0..jobs)
                    .map(|job| {
                        let lists = Arc::clone(&lists);
                        pool.spawn(move || {
                            for tile in 0..TILE_COUNT {
                                lists.push(tile, job as u32);
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().expect("job failed");
                }
                lists.total_len()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_thread_push, bench_pool_push);
criterion_main!(benches);
