//! Light-to-tile assignment.
//!
//! For one light: project its sphere to a box of candidate tiles, then keep
//! each candidate unless a plane facing away from the light separates the
//! tile from the sphere. The plane test is a conservative heuristic: it
//! never drops a tile the sphere reaches, but keeps some it does not.

use rayon::prelude::*;

use crate::math::{dot, length, scale, sub, Float3, Mat4};

use super::bounds::{clip_bounds, depth_slices, screen_bounds, screen_tiles, TileRange};
use super::{ClusterGrid, GridDimensions, LightKind};

/// The parts of a camera that shape the cluster grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterCamera {
    /// X and Y scale terms of the projection matrix.
    pub projection_scale: [f32; 2],
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
}

impl ClusterCamera {
    /// Reads the scale terms from a projection matrix.
    #[must_use]
    pub fn from_projection(projection: &Mat4, near: f32, far: f32) -> Self {
        Self {
            projection_scale: [projection[0][0], projection[1][1]],
            near,
            far,
        }
    }

    /// View depth of the near boundary of slice `z`.
    fn slice_depth(&self, z: u32, depth: u32) -> f32 {
        self.near + (self.far - self.near) * z as f32 / depth as f32
    }
}

/// Assigns lights to the tiles of a [`ClusterGrid`].
#[derive(Debug, Clone, Copy)]
pub struct ClusterAssigner {
    dims: GridDimensions,
    camera: ClusterCamera,
    parallel: bool,
}

impl ClusterAssigner {
    /// Creates an assigner for one camera.
    ///
    /// With `parallel` set, depth slices are processed on the rayon pool.
    #[must_use]
    pub const fn new(dims: GridDimensions, camera: ClusterCamera, parallel: bool) -> Self {
        Self {
            dims,
            camera,
            parallel,
        }
    }

    /// Grid shape.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dims
    }

    /// Camera the grid is built for.
    #[must_use]
    pub const fn camera(&self) -> ClusterCamera {
        self.camera
    }

    /// Candidate tiles for a view-space sphere.
    ///
    /// Empty for a non-positive radius or a sphere behind the near plane.
    #[must_use]
    pub fn tile_range(&self, position: Float3, radius: f32) -> TileRange {
        if radius <= 0.0 {
            return TileRange::empty();
        }
        let clip = clip_bounds(position, radius, self.camera.projection_scale, self.camera.near);
        if clip.is_empty() {
            return TileRange::empty();
        }
        let (x, y) = screen_tiles(&screen_bounds(&clip), self.dims);
        let z = depth_slices(
            position[2],
            radius,
            self.camera.near,
            self.camera.far,
            self.dims.depth,
        );
        TileRange { x, y, z }
    }

    /// Point inside tile `(x, y, z)` at normalized tile coordinates
    /// `(u, v, w)`, each in `[0, 1]`. `v = 0` is the top edge and `w = 0`
    /// the near edge.
    #[must_use]
    pub fn tile_point(&self, x: u32, y: u32, z: u32, u: f32, v: f32, w: f32) -> Float3 {
        let near = self.camera.slice_depth(z, self.dims.depth);
        let far = self.camera.slice_depth(z + 1, self.dims.depth);
        let depth = near + (far - near) * w;
        let ndc_x = -1.0 + 2.0 * (x as f32 + u) / self.dims.width as f32;
        let ndc_y = 1.0 - 2.0 * (y as f32 + v) / self.dims.height as f32;
        [
            ndc_x * depth / self.camera.projection_scale[0],
            ndc_y * depth / self.camera.projection_scale[1],
            depth,
        ]
    }

    /// The eight corners of tile `(x, y, z)`.
    #[must_use]
    pub fn tile_corners(&self, x: u32, y: u32, z: u32) -> [Float3; 8] {
        std::array::from_fn(|i| {
            let u = (i & 1) as f32;
            let v = ((i >> 1) & 1) as f32;
            let w = ((i >> 2) & 1) as f32;
            self.tile_point(x, y, z, u, v, w)
        })
    }

    /// Returns true if a plane separates tile `(x, y, z)` from the sphere.
    ///
    /// The plane faces from the light towards the tile center. The tile is
    /// separated when every corner lies farther than `radius` along it.
    #[must_use]
    pub fn is_separated(&self, x: u32, y: u32, z: u32, position: Float3, radius: f32) -> bool {
        let center = self.tile_point(x, y, z, 0.5, 0.5, 0.5);
        let to_center = sub(center, position);
        let len = length(to_center);
        if len <= 0.0 {
            return false;
        }
        let normal = scale(to_center, 1.0 / len);

        let nearest = self
            .tile_corners(x, y, z)
            .iter()
            .map(|corner| dot(normal, sub(*corner, position)))
            .fold(f32::INFINITY, f32::min);
        nearest > radius
    }

    /// Assigns one light and returns the number of tiles it was added to.
    ///
    /// `position` is in view space. `radius` is the full reach of the
    /// light. A non-positive radius adds the light nowhere.
    pub fn assign(
        &self,
        grid: &ClusterGrid,
        position: Float3,
        radius: f32,
        index: u32,
        kind: LightKind,
    ) -> usize {
        let range = self.tile_range(position, radius);
        if range.is_empty() {
            return 0;
        }

        let slice = |z: u32| self.assign_slice(grid, &range, z, position, radius, index, kind);
        if self.parallel && range.z.len() > 1 {
            range.z.clone().into_par_iter().map(slice).sum()
        } else {
            range.z.clone().map(slice).sum()
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn assign_slice(
        &self,
        grid: &ClusterGrid,
        range: &TileRange,
        z: u32,
        position: Float3,
        radius: f32,
        index: u32,
        kind: LightKind,
    ) -> usize {
        let mut added = 0;
        for y in range.y.clone() {
            for x in range.x.clone() {
                if !self.is_separated(x, y, z, position, radius) {
                    grid.insert(self.dims.tile_index(x, y, z), kind, index);
                    added += 1;
                }
            }
        }
        added
    }
}
