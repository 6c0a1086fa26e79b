//! Brute-force sphere/tile intersection.
//!
//! Far too slow for a frame, but straightforward. Used to check that the
//! separation heuristic of [`ClusterAssigner`] only ever errs towards
//! keeping a tile.

use crate::math::{length, sub, Float3};

use super::ClusterAssigner;

/// Returns true if the sphere contains a point of a lattice spanning tile
/// `(x, y, z)`, with `samples` points per axis including both edges.
///
/// A `true` result proves the sphere and tile intersect. Denser lattices
/// approach the exact answer.
#[must_use]
pub fn sphere_intersects_tile(
    assigner: &ClusterAssigner,
    x: u32,
    y: u32,
    z: u32,
    position: Float3,
    radius: f32,
    samples: u32,
) -> bool {
    let samples = samples.max(2);
    let step = 1.0 / (samples - 1) as f32;
    for k in 0..samples {
        for j in 0..samples {
            for i in 0..samples {
                let point = assigner.tile_point(
                    x,
                    y,
                    z,
                    i as f32 * step,
                    j as f32 * step,
                    k as f32 * step,
                );
                if length(sub(point, position)) <= radius {
                    return true;
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::{ClusterCamera, GridDimensions};
    use crate::math::perspective;

    #[test]
    fn test_light_inside_tile() {
        let projection = perspective(1.0, 1.5, 0.5, 50.0);
        let assigner = ClusterAssigner::new(
            GridDimensions::default(),
            ClusterCamera::from_projection(&projection, 0.5, 50.0),
            false,
        );
        let center = assigner.tile_point(8, 4, 3, 0.5, 0.5, 0.5);

        assert!(sphere_intersects_tile(&assigner, 8, 4, 3, center, 0.5, 3));
        assert!(!sphere_intersects_tile(&assigner, 0, 0, 20, center, 0.5, 5));
    }
}
