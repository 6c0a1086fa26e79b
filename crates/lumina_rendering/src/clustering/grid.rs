//! Grid dimensions and the per-tile light index lists.

use std::sync::atomic::{AtomicUsize, Ordering};

use lumina_core::StripedLists;
use serde::Deserialize;

use crate::error::{RenderError, RenderResult};

/// Largest supported tile count.
///
/// Each tile contributes at most `2 * u16::MAX` indices, so this keeps
/// every index offset within `u32`.
pub const MAX_TILES: usize = 32_768;

/// Number of tiles along each axis of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridDimensions {
    /// Tiles across the screen.
    pub width: u32,
    /// Tiles down the screen.
    pub height: u32,
    /// Depth slices between the near and far clip planes.
    pub depth: u32,
}

impl Default for GridDimensions {
    fn default() -> Self {
        Self {
            width: 16,
            height: 8,
            depth: 24,
        }
    }
}

impl GridDimensions {
    /// Creates grid dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Total number of tiles.
    #[must_use]
    pub const fn tile_count(&self) -> usize {
        self.width as usize * self.height as usize * self.depth as usize
    }

    /// Canonical index of tile `(x, y, z)`.
    #[inline]
    #[must_use]
    pub const fn tile_index(&self, x: u32, y: u32, z: u32) -> usize {
        ((z as usize * self.height as usize) + y as usize) * self.width as usize + x as usize
    }

    /// Checks that every axis is non-empty and the tile count is supported.
    ///
    /// # Errors
    ///
    /// [`RenderError::InvalidConfig`] naming the problem.
    pub fn validate(&self) -> RenderResult<()> {
        if self.width == 0 || self.height == 0 || self.depth == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "grid dimensions must be at least 1, got {}x{}x{}",
                self.width, self.height, self.depth
            )));
        }
        if self.tile_count() > MAX_TILES {
            return Err(RenderError::InvalidConfig(format!(
                "grid has {} tiles, at most {MAX_TILES} are supported",
                self.tile_count()
            )));
        }
        Ok(())
    }
}

/// Which per-tile list a light index goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    /// Point light list.
    Point,
    /// Spot light list.
    Spot,
}

/// Per-tile point and spot light index lists for one frame.
///
/// Lists are lock-striped, one lock per tile, so concurrent assignment
/// of different lights only contends when two workers hit the same tile.
pub struct ClusterGrid {
    /// Grid shape.
    dims: GridDimensions,
    /// Point light indices per tile.
    point: StripedLists<u32>,
    /// Spot light indices per tile.
    spot: StripedLists<u32>,
    /// Entries across both lists and all tiles.
    entries: AtomicUsize,
}

impl ClusterGrid {
    /// Creates empty lists for every tile.
    #[must_use]
    pub fn new(dims: GridDimensions) -> Self {
        Self {
            dims,
            point: StripedLists::new(dims.tile_count()),
            spot: StripedLists::new(dims.tile_count()),
            entries: AtomicUsize::new(0),
        }
    }

    /// Grid shape.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dims
    }

    /// Empties the lists of one kind.
    ///
    /// Only the task that owns `kind` for this frame may call this.
    pub fn reset_kind(&self, kind: LightKind) {
        let (lists, removed) = match kind {
            LightKind::Point => (&self.point, self.point.total_len()),
            LightKind::Spot => (&self.spot, self.spot.total_len()),
        };
        lists.clear_shared();
        self.entries.fetch_sub(removed, Ordering::AcqRel);
    }

    /// Empties every list through exclusive access.
    pub fn reset(&mut self) {
        self.point.clear();
        self.spot.clear();
        *self.entries.get_mut() = 0;
    }

    /// Appends `index` to the `kind` list of `tile`.
    #[inline]
    pub fn insert(&self, tile: usize, kind: LightKind, index: u32) {
        match kind {
            LightKind::Point => self.point.push(tile, index),
            LightKind::Spot => self.spot.push(tile, index),
        }
        self.entries.fetch_add(1, Ordering::Relaxed);
    }

    /// Entries across both lists and all tiles.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.load(Ordering::Acquire)
    }

    /// Point light indices of `tile`.
    #[must_use]
    pub fn point_indices(&self, tile: usize) -> Vec<u32> {
        self.point.slot_to_vec(tile)
    }

    /// Spot light indices of `tile`.
    #[must_use]
    pub fn spot_indices(&self, tile: usize) -> Vec<u32> {
        self.spot.slot_to_vec(tile)
    }

    /// Calls `f` with the point and spot lists of `tile`.
    pub fn with_tile<R>(&self, tile: usize, f: impl FnOnce(&[u32], &[u32]) -> R) -> R {
        self.point
            .with_slot(tile, |point| self.spot.with_slot(tile, |spot| f(point, spot)))
    }
}

impl std::fmt::Debug for ClusterGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterGrid")
            .field("dims", &self.dims)
            .field("entries", &self.entry_count())
            .finish_non_exhaustive()
    }
}
