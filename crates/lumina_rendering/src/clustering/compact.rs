//! Flattening of per-tile light lists for GPU upload.

use bytemuck::{Pod, Zeroable};

use super::ClusterGrid;

/// Where a tile's light indices live in the flattened index buffer.
///
/// The tile's point light indices start at `index_offset`, followed
/// directly by its spot light indices.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct TileOffsetCount {
    /// First index of this tile.
    pub index_offset: u32,
    /// Point light indices.
    pub point_count: u16,
    /// Spot light indices.
    pub spot_count: u16,
}

impl TileOffsetCount {
    /// One past the last index of this tile.
    #[must_use]
    pub const fn end(&self) -> u32 {
        self.index_offset + self.point_count as u32 + self.spot_count as u32
    }
}

/// The flattened light lists of one frame.
///
/// Tile `i` of `tiles` describes the range
/// `indices[index_offset .. index_offset + point_count + spot_count]`, and
/// consecutive tiles are contiguous.
#[derive(Debug, Default)]
pub struct CompactedLights {
    tiles: Vec<TileOffsetCount>,
    indices: Vec<u32>,
    truncated_tiles: usize,
}

impl CompactedLights {
    /// Creates empty output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the output from `grid`, walking tiles in canonical order.
    ///
    /// A list longer than `u16::MAX` is cut to `u16::MAX` entries so that
    /// the stored count always matches what was written. Cut tiles are
    /// logged and counted in [`CompactedLights::truncated_tiles`].
    #[allow(clippy::cast_possible_truncation)]
    pub fn compact_from(&mut self, grid: &ClusterGrid) {
        let tile_count = grid.dimensions().tile_count();
        self.tiles.clear();
        self.tiles.reserve(tile_count);
        self.indices.clear();
        self.indices.reserve(grid.entry_count());
        self.truncated_tiles = 0;

        for tile in 0..tile_count {
            // Bounded by MAX_TILES * 2 * u16::MAX.
            let index_offset = self.indices.len() as u32;
            let (point_count, spot_count) = grid.with_tile(tile, |point, spot| {
                let point_count = point.len().min(usize::from(u16::MAX));
                let spot_count = spot.len().min(usize::from(u16::MAX));
                if point_count < point.len() || spot_count < spot.len() {
                    tracing::warn!(
                        tile,
                        point_lights = point.len(),
                        spot_lights = spot.len(),
                        "Tile light list exceeds 16-bit count, truncating"
                    );
                    self.truncated_tiles += 1;
                }
                self.indices.extend_from_slice(&point[..point_count]);
                self.indices.extend_from_slice(&spot[..spot_count]);
                (point_count as u16, spot_count as u16)
            });

            self.tiles.push(TileOffsetCount {
                index_offset,
                point_count,
                spot_count,
            });
        }
    }

    /// Per-tile records in canonical order.
    #[must_use]
    pub fn tiles(&self) -> &[TileOffsetCount] {
        &self.tiles
    }

    /// The flattened index buffer.
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Tiles whose lists were cut at `u16::MAX` entries.
    #[must_use]
    pub const fn truncated_tiles(&self) -> usize {
        self.truncated_tiles
    }

    /// Empties the output, keeping allocations.
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.indices.clear();
        self.truncated_tiles = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::{GridDimensions, LightKind};

    #[test]
    fn test_offsets_are_prefix_sums() {
        let grid = ClusterGrid::new(GridDimensions::new(3, 2, 2));
        let counts = [(2, 1), (0, 0), (1, 3), (0, 2), (4, 0), (0, 0), (1, 1), (0, 0), (0, 0), (2, 2), (0, 1), (3, 0)];
        for (tile, (points, spots)) in counts.iter().enumerate() {
            for i in 0..*points {
                grid.insert(tile, LightKind::Point, i);
            }
            for i in 0..*spots {
                grid.insert(tile, LightKind::Spot, 100 + i);
            }
        }

        let mut compacted = CompactedLights::new();
        compacted.compact_from(&grid);

        let total: u32 = counts.iter().map(|(p, s)| p + s).sum();
        assert_eq!(compacted.indices().len(), total as usize);
        assert_eq!(compacted.tiles().len(), 12);

        let mut running = 0;
        for (record, (points, spots)) in compacted.tiles().iter().zip(&counts) {
            assert_eq!(record.index_offset, running);
            assert_eq!(u32::from(record.point_count), *points);
            assert_eq!(u32::from(record.spot_count), *spots);
            running = record.end();
        }
        assert_eq!(running, total);
    }

    #[test]
    fn test_points_precede_spots() {
        let grid = ClusterGrid::new(GridDimensions::new(1, 1, 1));
        grid.insert(0, LightKind::Spot, 9);
        grid.insert(0, LightKind::Point, 4);
        grid.insert(0, LightKind::Point, 5);

        let mut compacted = CompactedLights::new();
        compacted.compact_from(&grid);

        assert_eq!(compacted.indices(), &[4, 5, 9]);
        assert_eq!(compacted.truncated_tiles(), 0);
    }

    #[test]
    fn test_overflowing_tile_is_truncated_not_wrapped() {
        let grid = ClusterGrid::new(GridDimensions::new(2, 1, 1));
        for i in 0..70_000 {
            grid.insert(0, LightKind::Point, i);
        }
        grid.insert(1, LightKind::Spot, 1);

        let mut compacted = CompactedLights::new();
        compacted.compact_from(&grid);

        let first = compacted.tiles()[0];
        assert_eq!(first.point_count, u16::MAX);
        assert_eq!(compacted.tiles()[1].index_offset, u32::from(u16::MAX));
        assert_eq!(compacted.indices().len(), usize::from(u16::MAX) + 1);
        assert_eq!(compacted.truncated_tiles(), 1);
    }
}
