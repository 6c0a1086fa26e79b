//! Batched sphere-versus-frustum test.
//!
//! Spheres are processed four at a time in structure-of-arrays lanes. The
//! kernel is portable scalar code over `[f32; LANES]`, which the optimizer
//! turns into vector instructions where available.

use crate::culling::Frustum;
use crate::math::Float3;

/// Spheres tested per batch.
pub const LANES: usize = 4;

type Lane = [f32; LANES];

/// A batch of spheres in lane layout.
#[derive(Clone, Copy)]
struct SphereBatch {
    x: Lane,
    y: Lane,
    z: Lane,
    radius: Lane,
}

impl SphereBatch {
    /// Loads up to four spheres. Missing tail lanes get a zero sphere at the
    /// origin, whose result is discarded.
    fn load(centers: &[Float3], radii: &[f32]) -> Self {
        let mut batch = Self {
            x: [0.0; LANES],
            y: [0.0; LANES],
            z: [0.0; LANES],
            radius: [0.0; LANES],
        };
        for (lane, (center, radius)) in centers.iter().zip(radii).enumerate() {
            batch.x[lane] = center[0];
            batch.y[lane] = center[1];
            batch.z[lane] = center[2];
            batch.radius[lane] = *radius;
        }
        batch
    }

    /// Lanes outside at least one plane.
    fn outside(&self, frustum: &Frustum) -> [bool; LANES] {
        let mut outside = [false; LANES];
        for plane in &frustum.planes {
            let distance: Lane = std::array::from_fn(|i| {
                plane.a * self.x[i] + plane.b * self.y[i] + plane.c * self.z[i] + plane.d
            });
            for i in 0..LANES {
                outside[i] |= distance[i] < -self.radius[i];
            }
        }
        outside
    }
}

/// Writes one visibility flag per sphere into `visible`.
///
/// `visible` is cleared first. A sphere is visible unless it lies entirely
/// behind one of the frustum planes. Only the first
/// `min(centers.len(), radii.len())` spheres are tested.
pub fn cull_spheres(frustum: &Frustum, centers: &[Float3], radii: &[f32], visible: &mut Vec<bool>) {
    visible.clear();
    let count = centers.len().min(radii.len());
    if count == 0 {
        return;
    }
    visible.reserve(count);

    for (centers, radii) in centers[..count]
        .chunks(LANES)
        .zip(radii[..count].chunks(LANES))
    {
        let outside = SphereBatch::load(centers, radii).outside(frustum);
        visible.extend(outside[..centers.len()].iter().map(|o| !o));
    }
}
