//! # LUMINA Rendering
//!
//! Clustered-lighting renderer core:
//! - Per-type light collections packed for direct GPU upload
//! - Batched frustum culling of point and spot lights
//! - Light-to-cluster assignment over a 3D grid of view-frustum tiles
//! - Compaction of per-tile light lists into one index buffer
//! - Draw-call batching and the shader pass state machine
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         RENDER CALL                              │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  Scene lights → Visibility Culler → Light Collections            │
//! │                       ↓                                          │
//! │              Cluster Assignment (workers, z-slices in parallel)  │
//! │                       ↓                                          │
//! │              Light Index Compactor → GPU buffers                 │
//! │                                                                  │
//! │  Draw calls → sort → shader runs → draw-order buckets            │
//! │                       ↓                                          │
//! │              Pass loop (Forward | Deferred | Compute)            │
//! │                       ↓                                          │
//! │              Filters → Camera target composite                   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//!
//! - Only the thread that owns the [`Renderer`] touches the graphics device
//! - Workers compute CPU-side data only: visibility, tile lists, light records
//! - Resource failures are logged and skip one pass or shader run

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::perf)]

pub mod batching;
pub mod clustering;
pub mod config;
pub mod culling;
pub mod device;
pub mod error;
pub mod lights;
pub mod math;
pub mod pipeline;
pub mod shader;

pub use batching::{DrawCall, DrawCallKey, DrawCallQueue, DrawPlan};
pub use clustering::{ClusterAssigner, ClusterCamera, ClusterGrid, CompactedLights, GridDimensions, LightKind, TileOffsetCount};
pub use config::{BufferGrowth, RendererConfig};
pub use culling::{Frustum, Plane};
pub use device::{GraphicsDevice, HeadlessDevice};
pub use error::{RenderError, RenderResult};
pub use lights::{LightCollection, LightScene, SceneLights};
pub use pipeline::{FrameState, FrameStats, FrameTime, RenderCall, RenderCallQueue, Renderer, RendererStats};
pub use shader::{
    FilterHandle, MaterialHandle, PassMode, PluginHandle, RenderPass, ResourceProvider, Shader,
    ShaderHandle,
};
