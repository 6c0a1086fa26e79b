//! Projected bounds of a light sphere.
//!
//! Clip bounds come from the planes through the camera tangent to the
//! sphere, solved per axis. They are exact for a sphere in front of the
//! camera and collapse to an empty rectangle once the sphere is entirely
//! behind the near plane.

use std::ops::Range;

use crate::math::Float3;

use super::GridDimensions;

/// A rectangle in clip space, `[-1, 1]` on both axes, Y up.
///
/// Empty when `min` exceeds `max` on either axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    /// Lower-left corner.
    pub min: [f32; 2],
    /// Upper-right corner.
    pub max: [f32; 2],
}

impl ClipRect {
    /// The empty rectangle.
    pub const EMPTY: Self = Self {
        min: [1.0, 1.0],
        max: [0.0, 0.0],
    };

    /// The whole clip space.
    pub const FULL: Self = Self {
        min: [-1.0, -1.0],
        max: [1.0, 1.0],
    };

    /// Returns true if the rectangle covers no area.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min[0] > self.max[0] || self.min[1] > self.max[1]
    }

    /// Returns true if `other` lies inside this rectangle.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        other.is_empty()
            || (self.min[0] <= other.min[0]
                && self.min[1] <= other.min[1]
                && self.max[0] >= other.max[0]
                && self.max[1] >= other.max[1])
    }
}

/// A rectangle in texture space, `[0, 1]` on both axes, Y down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    /// Top-left corner.
    pub min: [f32; 2],
    /// Bottom-right corner.
    pub max: [f32; 2],
}

/// Half-open tile ranges along each grid axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRange {
    /// Columns.
    pub x: Range<u32>,
    /// Rows, top to bottom.
    pub y: Range<u32>,
    /// Depth slices, near to far.
    pub z: Range<u32>,
}

impl TileRange {
    /// A range that covers no tiles.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            x: 0..0,
            y: 0..0,
            z: 0..0,
        }
    }

    /// Returns true if no tile is covered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    /// Number of covered tiles.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        self.x.len() * self.y.len() * self.z.len()
    }

    /// Returns true if tile `(x, y, z)` is covered.
    #[must_use]
    pub fn contains(&self, x: u32, y: u32, z: u32) -> bool {
        self.x.contains(&x) && self.y.contains(&y) && self.z.contains(&z)
    }
}

/// Narrows `[clip_min, clip_max]` with one tangent plane solution `nc`.
fn update_clip_root(
    nc: f32,
    lc: f32,
    lz: f32,
    radius: f32,
    camera_scale: f32,
    clip_min: &mut f32,
    clip_max: &mut f32,
) {
    let nz = (radius - nc * lc) / lz;
    let pz = (lc * lc + lz * lz - radius * radius) / (lz - (nz / nc) * lc);
    if pz > 0.0 {
        let c = -nz * camera_scale / nc;
        if nc > 0.0 {
            *clip_min = clip_min.max(c);
        } else {
            *clip_max = clip_max.min(c);
        }
    }
}

/// Narrows one clip axis using the tangent planes through the origin.
///
/// `lc` is the light coordinate on the axis, `lz` its depth.
fn update_clip_axis(
    lc: f32,
    lz: f32,
    radius: f32,
    camera_scale: f32,
    clip_min: &mut f32,
    clip_max: &mut f32,
) {
    let r_sq = radius * radius;
    let len_sq = lc * lc + lz * lz;
    let d = r_sq * lc * lc - len_sq * (r_sq - lz * lz);
    if d > 0.0 {
        let a = radius * lc;
        let b = d.sqrt();
        let nx0 = (a + b) / len_sq;
        let nx1 = (a - b) / len_sq;
        update_clip_root(nx0, lc, lz, radius, camera_scale, clip_min, clip_max);
        update_clip_root(nx1, lc, lz, radius, camera_scale, clip_min, clip_max);
    }
}

/// Clip-space bounding rectangle of a view-space sphere.
///
/// `projection_scale` holds the X and Y scale terms of the projection
/// matrix. A sphere containing the camera covers the whole screen.
#[must_use]
pub fn clip_bounds(position: Float3, radius: f32, projection_scale: [f32; 2], near: f32) -> ClipRect {
    if position[2] + radius < near {
        return ClipRect::EMPTY;
    }

    let mut rect = ClipRect::FULL;
    for axis in 0..2 {
        update_clip_axis(
            position[axis],
            position[2],
            radius,
            projection_scale[axis],
            &mut rect.min[axis],
            &mut rect.max[axis],
        );
    }
    rect
}

/// Remaps a clip rectangle to texture space, flipping Y.
#[must_use]
pub fn screen_bounds(clip: &ClipRect) -> ScreenRect {
    ScreenRect {
        min: [clip.min[0] * 0.5 + 0.5, 0.5 - clip.max[1] * 0.5],
        max: [clip.max[0] * 0.5 + 0.5, 0.5 - clip.min[1] * 0.5],
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_cell(value: f32, limit: u32) -> u32 {
    value.clamp(0.0, limit as f32) as u32
}

/// Tiles touched by a screen rectangle, clamped to the grid.
#[must_use]
pub(super) fn screen_tiles(screen: &ScreenRect, dims: GridDimensions) -> (Range<u32>, Range<u32>) {
    let width = dims.width as f32;
    let height = dims.height as f32;
    let x = to_cell((screen.min[0] * width).floor(), dims.width)
        ..to_cell((screen.max[0] * width).ceil(), dims.width);
    let y = to_cell((screen.min[1] * height).floor(), dims.height)
        ..to_cell((screen.max[1] * height).ceil(), dims.height);
    (x, y)
}

/// Depth slices touched by `[z - radius, z + radius]`, clamped to the grid.
#[must_use]
pub(super) fn depth_slices(z: f32, radius: f32, near: f32, far: f32, depth: u32) -> Range<u32> {
    let scale = depth as f32 / (far - near);
    let first = (((z - radius) - near) * scale).floor();
    let last = (((z + radius) - near) * scale).ceil();
    to_cell(first, depth)..to_cell(last, depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tangent_bounds() {
        // sin = 1/5, so the tangent slope is 1/sqrt(24).
        let rect = clip_bounds([0.0, 0.0, 5.0], 1.0, [1.0, 1.0], 0.1);
        let expected = 1.0 / 24f32.sqrt();
        assert!((rect.min[0] + expected).abs() < 1e-4);
        assert!((rect.max[0] - expected).abs() < 1e-4);
        assert!((rect.min[1] + expected).abs() < 1e-4);
        assert!((rect.max[1] - expected).abs() < 1e-4);
    }

    #[test]
    fn test_behind_near_is_empty() {
        let rect = clip_bounds([0.0, 0.0, -5.0], 1.0, [1.0, 1.0], 0.1);
        assert!(rect.is_empty());
        let (x, y) = screen_tiles(&screen_bounds(&rect), GridDimensions::default());
        assert!(x.is_empty() || y.is_empty());
    }

    #[test]
    fn test_sphere_around_camera_covers_screen() {
        let rect = clip_bounds([0.0, 0.0, 0.5], 2.0, [1.0, 1.0], 0.1);
        assert_eq!(rect, ClipRect::FULL);
        let (x, y) = screen_tiles(&screen_bounds(&rect), GridDimensions::default());
        assert_eq!(x, 0..16);
        assert_eq!(y, 0..8);
    }

    #[test]
    fn test_screen_y_flips() {
        let rect = ClipRect {
            min: [-1.0, 0.5],
            max: [-0.5, 1.0],
        };
        let screen = screen_bounds(&rect);
        assert_eq!(screen.min, [0.0, 0.0]);
        assert_eq!(screen.max, [0.25, 0.25]);
    }

    #[test]
    fn test_depth_slices() {
        assert_eq!(depth_slices(5.0, 10.0, 0.1, 100.0, 24), 0..4);
        assert_eq!(depth_slices(-50.0, 1.0, 0.1, 100.0, 24), 0..0);
        assert_eq!(depth_slices(500.0, 1.0, 0.1, 100.0, 24), 24..24);
    }
}
