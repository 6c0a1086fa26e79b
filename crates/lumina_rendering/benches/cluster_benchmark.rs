//! # Cluster Benchmark
//!
//! Measures light assignment into the default 16x8x24 grid, serial and
//! slice-parallel, plus batched frustum culling.
//!
//! Run with: `cargo bench --package lumina_rendering`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lumina_rendering::clustering::CompactedLights;
use lumina_rendering::culling::cull_spheres;
use lumina_rendering::math::{perspective, Float3};
use lumina_rendering::{ClusterAssigner, ClusterCamera, ClusterGrid, Frustum, GridDimensions, LightKind};

const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;

/// Deterministic light field spread through the view frustum.
fn lights(count: usize) -> Vec<(Float3, f32)> {
    let mut state = 0x2545_f491_u32;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        (state % 10_000) as f32 / 10_000.0
    };
    (0..count)
        .map(|_| {
            let z = NEAR + next() * 80.0;
            let x = (next() * 2.0 - 1.0) * z;
            let y = (next() * 2.0 - 1.0) * z * 0.5;
            ([x, y, z], 1.0 + next() * 9.0)
        })
        .collect()
}

fn assigner(parallel: bool) -> ClusterAssigner {
    let projection = perspective(std::f32::consts::FRAC_PI_2, 16.0 / 9.0, NEAR, FAR);
    ClusterAssigner::new(
        GridDimensions::default(),
        ClusterCamera::from_projection(&projection, NEAR, FAR),
        parallel,
    )
}

fn bench_assignment(c: &mut Criterion) {
    let mut group = c.benchmark_group("cluster_assign");

    for count in [64usize, 512] {
        let field = lights(count);
        for (name, parallel) in [("serial", false), ("parallel", true)] {
            let assigner = assigner(parallel);
            let mut grid = ClusterGrid::new(GridDimensions::default());
            group.bench_with_input(BenchmarkId::new(name, count), &field, |b, field| {
                b.iter(|| {
                    grid.reset();
                    let mut entries = 0;
                    for (index, &(position, radius)) in field.iter().enumerate() {
                        entries += assigner.assign(&grid, position, radius, index as u32, LightKind::Point);
                    }
                    black_box(entries)
                });
            });
        }
    }

    group.finish();
}

fn bench_compaction(c: &mut Criterion) {
    let assigner = assigner(true);
    let grid = ClusterGrid::new(GridDimensions::default());
    for (index, &(position, radius)) in lights(512).iter().enumerate() {
        assigner.assign(&grid, position, radius, index as u32, LightKind::Point);
    }
    let mut compacted = CompactedLights::new();

    c.bench_function("compact_512_lights", |b| {
        b.iter(|| {
            compacted.compact_from(&grid);
            black_box(compacted.indices().len())
        });
    });
}

fn bench_culling(c: &mut Criterion) {
    let projection = perspective(std::f32::consts::FRAC_PI_2, 16.0 / 9.0, NEAR, FAR);
    let frustum = Frustum::from_view_projection(&projection);
    let field = lights(4096);
    let centers: Vec<Float3> = field.iter().map(|(p, _)| *p).collect();
    let radii: Vec<f32> = field.iter().map(|(_, r)| *r).collect();
    let mut visible = Vec::with_capacity(field.len());

    c.bench_function("cull_4096_spheres", |b| {
        b.iter(|| {
            cull_spheres(&frustum, black_box(&centers), black_box(&radii), &mut visible);
            visible.len()
        });
    });
}

criterion_group!(benches, bench_assignment, bench_compaction, bench_culling);
criterion_main!(benches);
