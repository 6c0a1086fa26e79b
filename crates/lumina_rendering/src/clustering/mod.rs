//! # Light Clustering
//!
//! Partitions the view frustum into a 3D grid of tiles and records, per
//! tile, which point and spot lights can reach it.
//!
//! ```text
//!   screen X ──────────▶ width        depth slices (view Z)
//!   ┌────┬────┬────┬────┐            near ─┬─┬─┬─┬─┬─ far
//!   │    │    │    │    │ height           │ │ │ │ │
//!   ├────┼────┼────┼────┤                  z=0 ... depth-1
//!   │    │ ●  │    │    │
//!   └────┴────┴────┴────┘   tile index = (z * height + y) * width + x
//! ```
//!
//! Assignment runs on the lighting workers. Each (light, tile) pair is
//! decided once, so a light index appears at most once in a tile's list.
//! After the workers join, [`CompactedLights`] flattens every tile list
//! into one index buffer plus a per-tile offset/count record.

mod assign;
mod bounds;
mod compact;
mod grid;
pub mod reference;

pub use assign::{ClusterAssigner, ClusterCamera};
pub use bounds::{clip_bounds, screen_bounds, ClipRect, ScreenRect, TileRange};
pub use compact::{CompactedLights, TileOffsetCount};
pub use grid::{ClusterGrid, GridDimensions, LightKind, MAX_TILES};
