//! # Cluster Assignment Integration Test
//!
//! Checks light-to-tile assignment and compaction against the properties
//! the GPU side relies on.

use std::sync::Arc;

use lumina_core::WorkerPool;
use lumina_rendering::clustering::reference::sphere_intersects_tile;
use lumina_rendering::clustering::{clip_bounds, ClipRect};
use lumina_rendering::math::{perspective, Float3};
use lumina_rendering::{
    ClusterAssigner, ClusterCamera, ClusterGrid, CompactedLights, Frustum, GridDimensions,
    LightKind,
};

const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;

fn assigner() -> ClusterAssigner {
    let projection = perspective(std::f32::consts::FRAC_PI_2, 16.0 / 9.0, NEAR, FAR);
    ClusterAssigner::new(
        GridDimensions::default(),
        ClusterCamera::from_projection(&projection, NEAR, FAR),
        true,
    )
}

/// Lights spread over and around the frustum.
fn sample_lights() -> Vec<(Float3, f32)> {
    vec![
        ([0.0, 0.0, 5.0], 10.0),
        ([2.0, 1.0, 3.0], 1.5),
        ([-8.0, 3.0, 20.0], 4.0),
        ([15.0, -6.0, 40.0], 12.0),
        ([0.5, 0.5, 0.2], 0.6),
        ([30.0, 0.0, 10.0], 5.0),
        ([0.0, -2.0, 90.0], 25.0),
        ([0.0, 0.0, -3.0], 2.0),
    ]
}

/// Test: the documented scenario covers depth slices 0 through 3.
#[test]
fn test_concrete_scenario_depth_slices() {
    let assigner = assigner();
    let grid = ClusterGrid::new(GridDimensions::default());
    let dims = grid.dimensions();

    let range = assigner.tile_range([0.0, 0.0, 5.0], 10.0);
    assert_eq!(range.z, 0..4);

    let added = assigner.assign(&grid, [0.0, 0.0, 5.0], 10.0, 0, LightKind::Point);
    assert!(added > 0);
    assert_eq!(grid.entry_count(), added);

    let mut slices_hit = [false; 24];
    for z in 0..dims.depth {
        for y in 0..dims.height {
            for x in 0..dims.width {
                if !grid.point_indices(dims.tile_index(x, y, z)).is_empty() {
                    slices_hit[z as usize] = true;
                }
            }
        }
    }
    assert_eq!(&slices_hit[..4], &[true; 4]);
    assert!(slices_hit[4..].iter().all(|hit| !hit));

    // The tiles around the screen center at the light's own depth.
    for (x, y) in [(7, 3), (8, 3), (7, 4), (8, 4)] {
        assert_eq!(grid.point_indices(dims.tile_index(x, y, 1)), vec![0]);
    }
}

/// Test: growing the range never shrinks the clip rectangle.
#[test]
fn test_clip_bounds_monotonic_in_range() {
    for (position, _) in sample_lights() {
        let mut previous = ClipRect::EMPTY;
        for step in 1..60 {
            let radius = step as f32 * 0.25;
            let rect = clip_bounds(position, radius, [0.5625, 1.0], NEAR);
            assert!(
                rect.contains(&previous),
                "clip rect shrank at {position:?} r={radius}: {previous:?} -> {rect:?}"
            );
            previous = rect;
        }
    }
}

/// Test: inside the candidate box, a tile is kept exactly when the
/// separation test does not reject it.
#[test]
fn test_tile_coverage_invariant() {
    let assigner = assigner();
    let dims = GridDimensions::default();

    for (index, (position, radius)) in sample_lights().into_iter().enumerate() {
        let grid = ClusterGrid::new(dims);
        let index = index as u32;
        assigner.assign(&grid, position, radius, index, LightKind::Spot);

        let range = assigner.tile_range(position, radius);
        for z in 0..dims.depth {
            for y in 0..dims.height {
                for x in 0..dims.width {
                    let listed = grid.spot_indices(dims.tile_index(x, y, z)).contains(&index);
                    let expected = range.contains(x, y, z)
                        && !assigner.is_separated(x, y, z, position, radius);
                    assert_eq!(listed, expected, "tile ({x},{y},{z}) light {index}");
                }
            }
        }
    }
}

/// Test: the heuristic never drops a tile the sphere provably reaches.
#[test]
fn test_heuristic_is_conservative() {
    let assigner = assigner();
    let dims = GridDimensions::default();

    for (position, radius) in sample_lights() {
        let grid = ClusterGrid::new(dims);
        assigner.assign(&grid, position, radius, 0, LightKind::Point);

        for z in 0..dims.depth {
            for y in 0..dims.height {
                for x in 0..dims.width {
                    if sphere_intersects_tile(&assigner, x, y, z, position, radius, 4) {
                        assert!(
                            !grid.point_indices(dims.tile_index(x, y, z)).is_empty(),
                            "tile ({x},{y},{z}) dropped for light at {position:?} r={radius}"
                        );
                    }
                }
            }
        }
    }
}

/// Test: concurrent assignment from the worker pool leaves no duplicate
/// index in any tile and loses no entry.
#[test]
fn test_concurrent_assignment_no_duplicates() {
    let pool = WorkerPool::new(3);
    let grid = Arc::new(ClusterGrid::new(GridDimensions::default()));
    let lights = sample_lights();

    let handles: Vec<_> = lights
        .chunks(3)
        .enumerate()
        .map(|(chunk, lights)| {
            let grid = Arc::clone(&grid);
            let lights = lights.to_vec();
            pool.spawn(move || {
                let assigner = assigner();
                lights
                    .iter()
                    .enumerate()
                    .map(|(i, (position, radius))| {
                        let index = (chunk * 3 + i) as u32;
                        assigner.assign(&grid, *position, *radius, index, LightKind::Point)
                    })
                    .sum::<usize>()
            })
        })
        .collect();

    let added: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(grid.entry_count(), added);

    for tile in 0..GridDimensions::default().tile_count() {
        let mut indices = grid.point_indices(tile);
        let len = indices.len();
        indices.sort_unstable();
        indices.dedup();
        assert_eq!(indices.len(), len, "duplicate index in tile {tile}");
    }
}

/// Test: compaction offsets are running sums in canonical tile order.
#[test]
fn test_compaction_after_assignment() {
    let assigner = assigner();
    let grid = ClusterGrid::new(GridDimensions::default());
    for (index, (position, radius)) in sample_lights().into_iter().enumerate() {
        let kind = if index % 2 == 0 {
            LightKind::Point
        } else {
            LightKind::Spot
        };
        assigner.assign(&grid, position, radius, index as u32, kind);
    }

    let mut compacted = CompactedLights::new();
    compacted.compact_from(&grid);

    assert_eq!(compacted.tiles().len(), 3072);
    assert_eq!(compacted.indices().len(), grid.entry_count());

    let mut running = 0u32;
    for (tile, record) in compacted.tiles().iter().enumerate() {
        assert_eq!(record.index_offset, running);
        let start = running as usize;
        let points = &compacted.indices()[start..start + usize::from(record.point_count)];
        assert_eq!(points, grid.point_indices(tile).as_slice());
        running = record.end();
    }
    assert_eq!(running as usize, compacted.indices().len());
}

/// Test: frustum culling keeps the center and rejects lights outside.
#[test]
fn test_frustum_culling_correctness() {
    let projection = perspective(std::f32::consts::FRAC_PI_2, 16.0 / 9.0, NEAR, FAR);
    let frustum = Frustum::from_view_projection(&projection);

    assert!(frustum.test_sphere([0.0, 0.0, 50.0], 0.0));
    for outside in [
        [0.0, 0.0, -10.0],
        [0.0, 0.0, 150.0],
        [200.0, 0.0, 50.0],
        [-200.0, 0.0, 50.0],
        [0.0, 120.0, 50.0],
        [0.0, -120.0, 50.0],
    ] {
        assert!(!frustum.test_sphere(outside, 1.0), "{outside:?} should be culled");
    }
}
