//! # Frame Orchestration
//!
//! [`Renderer::render_frame`] drains the render call queue. For each
//! render call:
//!
//! ```text
//!   Idle ─▶ LightingGather ─────────────────────────────▶ Compositing ─▶ Done
//!           collect draw calls                            pass loop
//!           sort + bucket                                 filters
//!           ┌ worker: directional lights ┐                camera target blit
//!           ├ worker: point cull+assign  ├─ join ─▶ compact, upload
//!           └ worker: spot cull+assign   ┘
//!           main: upload engine/camera constants
//! ```
//!
//! Workers fill CPU-side records and tile lists only. Every device call,
//! buffer growth included, happens on the thread that owns the renderer,
//! after the join. Failures are logged and skip one unit of work.

mod frame;
mod lighting;
mod stats;

pub use frame::{CameraConstants, EngineConstants, FrameState, FrameTime, RenderCall, RenderCallQueue};
pub use lighting::{LightBindings, LIGHT_RESOURCE_SLOT};
pub use stats::{FrameStats, RendererStats};

use std::sync::Arc;

use bytemuck::Pod;
use lumina_core::WorkerPool;

use crate::batching::{run_pass, DrawCallQueue, DrawPlan};
use crate::clustering::{ClusterAssigner, ClusterCamera, CompactedLights, TileOffsetCount};
use crate::config::{BufferGrowth, RendererConfig};
use crate::device::{
    upload, BufferDescriptor, BufferHandle, GraphicsDevice, GrowableBuffer, Stage, TargetHandle,
};
use crate::error::{RenderError, RenderResult};
use crate::lights::{LightCollection, LightRecord, LightScene};
use crate::math::Mat4;
use crate::shader::{PassMode, ResourceProvider};

use lighting::{
    gather_directional, gather_points, gather_spots, FrameLighting, GatherCounts, LightingCamera,
};

/// Constant buffer slot of [`EngineConstants`].
pub const ENGINE_CONSTANTS_SLOT: u32 = 0;
/// Constant buffer slot of [`CameraConstants`].
pub const CAMERA_CONSTANTS_SLOT: u32 = 1;
/// Texture slot the composite pass reads the rendered image from.
pub const COMPOSITE_TEXTURE_SLOT: u32 = 0;

/// Clustered-lighting renderer driving one [`GraphicsDevice`].
pub struct Renderer<D: GraphicsDevice> {
    config: RendererConfig,
    device: D,
    resources: Arc<dyn ResourceProvider>,
    scene: Arc<dyn LightScene>,
    pool: WorkerPool,
    lighting: Arc<FrameLighting>,
    compacted: CompactedLights,
    tile_buffer: GrowableBuffer,
    index_buffer: GrowableBuffer,
    engine_constants: BufferHandle,
    camera_constants: BufferHandle,
    render_calls: RenderCallQueue,
    draw_calls: DrawCallQueue,
    state: FrameState,
    stats: RendererStats,
}

impl<D: GraphicsDevice> Renderer<D> {
    /// Creates a renderer and its constant buffers.
    ///
    /// # Errors
    ///
    /// [`RenderError::InvalidConfig`] if `config` does not validate, or
    /// [`RenderError::BufferCreate`] if a constant buffer cannot be created.
    pub fn new(
        config: RendererConfig,
        mut device: D,
        resources: Arc<dyn ResourceProvider>,
        scene: Arc<dyn LightScene>,
    ) -> RenderResult<Self> {
        config.validate()?;

        let engine_constants = create_constants::<D, EngineConstants>(&mut device, "engine constants")?;
        let camera_constants = create_constants::<D, CameraConstants>(&mut device, "camera constants")?;

        tracing::info!(
            "Renderer created: grid {}x{}x{}, {} lighting workers",
            config.grid.width,
            config.grid.height,
            config.grid.depth,
            config.worker_threads
        );

        Ok(Self {
            pool: WorkerPool::new(config.worker_threads),
            lighting: Arc::new(FrameLighting::new(config.grid)),
            compacted: CompactedLights::new(),
            tile_buffer: GrowableBuffer::for_type::<TileOffsetCount>("light tiles"),
            index_buffer: GrowableBuffer::for_type::<u32>("light indices"),
            engine_constants,
            camera_constants,
            render_calls: RenderCallQueue::new(),
            draw_calls: DrawCallQueue::new(Arc::clone(&resources)),
            state: FrameState::Idle,
            stats: RendererStats::default(),
            config,
            device,
            resources,
            scene,
        })
    }

    /// Queues one camera for the next [`Renderer::render_frame`].
    pub fn queue_render_call(
        &self,
        view: Mat4,
        projection: Mat4,
        near_clip: f32,
        far_clip: f32,
        target: Option<TargetHandle>,
    ) {
        self.render_calls
            .push(RenderCall::new(view, projection, near_clip, far_clip, target));
    }

    /// Queues a prepared render call.
    pub fn queue(&self, call: RenderCall) {
        self.render_calls.push(call);
    }

    /// A handle other threads can queue render calls through.
    #[must_use]
    pub fn render_call_queue(&self) -> RenderCallQueue {
        self.render_calls.clone()
    }

    /// The queue draw calls are collected into.
    #[must_use]
    pub fn draw_call_queue(&self) -> &DrawCallQueue {
        &self.draw_calls
    }

    /// Progress of the render call in flight.
    #[must_use]
    pub const fn state(&self) -> FrameState {
        self.state
    }

    /// Lifetime statistics.
    #[must_use]
    pub const fn stats(&self) -> RendererStats {
        self.stats
    }

    /// Configuration.
    #[must_use]
    pub const fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// The graphics device.
    #[must_use]
    pub const fn device(&self) -> &D {
        &self.device
    }

    /// The graphics device, mutably.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Flattened light lists of the last render call that needed lighting.
    #[must_use]
    pub const fn compacted_lights(&self) -> &CompactedLights {
        &self.compacted
    }

    /// Renders every queued render call and returns one [`FrameStats`]
    /// each.
    ///
    /// `collect` is called once per render call to queue its draw calls,
    /// and must return only once all of them are queued.
    pub fn render_frame<F>(&mut self, time: FrameTime, mut collect: F) -> Vec<FrameStats>
    where
        F: FnMut(&RenderCall, &DrawCallQueue),
    {
        self.stats.frames += 1;
        let mut frames = Vec::new();
        while let Some(call) = self.render_calls.try_pop() {
            let frame = self.render_call(&call, time, &mut collect);
            self.stats.accumulate(&frame);
            frames.push(frame);
        }
        self.set_state(FrameState::Idle);
        frames
    }

    fn set_state(&mut self, state: FrameState) {
        if self.state != state {
            tracing::trace!(from = ?self.state, to = ?state, "Frame state");
            self.state = state;
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn render_call<F>(&mut self, call: &RenderCall, time: FrameTime, collect: &mut F) -> FrameStats
    where
        F: FnMut(&RenderCall, &DrawCallQueue),
    {
        let mut stats = FrameStats::default();
        self.set_state(FrameState::LightingGather);

        self.draw_calls.clear();
        collect(call, &self.draw_calls);
        let calls = self.draw_calls.take();
        stats.draw_calls = calls.len() as u32;

        if calls.is_empty() {
            self.set_state(FrameState::Compositing);
            self.composite(call, &mut stats);
            self.set_state(FrameState::Done);
            tracing::debug!("Render call with no draw calls, composite only");
            return stats;
        }

        let plan = DrawPlan::build(calls, self.resources.as_ref());
        stats.skipped_runs = plan.skipped_runs();

        let bindings = if plan.needs_lighting() || self.filters_need_lighting(call) {
            stats.lighting = true;
            self.build_lighting(call, time, &mut stats)
        } else {
            self.upload_constants(call, time, &mut stats);
            LightBindings::default()
        };

        self.set_state(FrameState::Compositing);
        self.bind_constants();
        plan.execute(&mut self.device, self.resources.as_ref(), &bindings, &mut stats);
        self.run_filters(call, &bindings, &mut stats);
        self.composite(call, &mut stats);
        self.set_state(FrameState::Done);

        tracing::debug!(
            draw_calls = stats.draw_calls,
            shader_runs = stats.shader_runs,
            passes = stats.total_passes(),
            lights = stats.total_lights(),
            tile_entries = stats.tile_light_entries,
            "Render call complete"
        );
        stats
    }

    /// Runs the three gather tasks, uploads constants meanwhile, then
    /// compacts and uploads every light buffer.
    #[allow(clippy::cast_possible_truncation)]
    fn build_lighting(&mut self, call: &RenderCall, time: FrameTime, stats: &mut FrameStats) -> LightBindings {
        let camera = LightingCamera {
            view: call.view,
            frustum: call.frustum,
            assigner: ClusterAssigner::new(
                self.config.grid,
                ClusterCamera::from_projection(&call.projection, call.near_clip, call.far_clip),
                self.config.parallel_slices,
            ),
        };

        let directional = self.pool.spawn({
            let lighting = Arc::clone(&self.lighting);
            let scene = Arc::clone(&self.scene);
            move || gather_directional(&lighting, scene.as_ref(), &camera.view)
        });
        let point = self.pool.spawn({
            let lighting = Arc::clone(&self.lighting);
            let scene = Arc::clone(&self.scene);
            move || gather_points(&lighting, scene.as_ref(), &camera)
        });
        let spot = self.pool.spawn({
            let lighting = Arc::clone(&self.lighting);
            let scene = Arc::clone(&self.scene);
            move || gather_spots(&lighting, scene.as_ref(), &camera)
        });

        self.upload_constants(call, time, stats);

        stats.directional_lights = directional.join().unwrap_or_else(|e| {
            tracing::warn!("Directional light gather failed: {}", RenderError::from(e));
            0
        });
        let point = point.join().unwrap_or_else(|e| {
            tracing::warn!("Point light gather failed: {}", RenderError::from(e));
            GatherCounts::default()
        });
        let spot = spot.join().unwrap_or_else(|e| {
            tracing::warn!("Spot light gather failed: {}", RenderError::from(e));
            GatherCounts::default()
        });
        stats.visible_point_lights = point.visible;
        stats.culled_point_lights = point.culled;
        stats.visible_spot_lights = spot.visible;
        stats.culled_spot_lights = spot.culled;

        let growth = self.config.buffer_growth;
        let light_minimum = self.config.initial_light_capacity;
        let directional = upload_collection(
            &mut self.device,
            &mut *self.lighting.directional.lock(),
            growth,
            light_minimum,
            stats,
        );
        let point = upload_collection(
            &mut self.device,
            &mut *self.lighting.point.lock(),
            growth,
            light_minimum,
            stats,
        );
        let spot = upload_collection(
            &mut self.device,
            &mut *self.lighting.spot.lock(),
            growth,
            light_minimum,
            stats,
        );

        self.compacted.compact_from(&self.lighting.grid);
        stats.tile_light_entries = self.compacted.indices().len() as u32;
        stats.truncated_tiles = self.compacted.truncated_tiles() as u32;

        upload_growable(
            &mut self.device,
            &mut self.tile_buffer,
            self.compacted.tiles(),
            growth,
            self.config.grid.tile_count(),
            stats,
        );
        if !self.compacted.indices().is_empty() {
            upload_growable(
                &mut self.device,
                &mut self.index_buffer,
                self.compacted.indices(),
                growth,
                self.config.initial_index_capacity,
                stats,
            );
        }

        LightBindings {
            resources: [
                directional,
                point,
                spot,
                self.tile_buffer.handle(),
                self.index_buffer.handle(),
            ],
        }
    }

    fn upload_constants(&mut self, call: &RenderCall, time: FrameTime, stats: &mut FrameStats) {
        let engine = EngineConstants::from(time);
        let camera = CameraConstants::from(call);
        for (buffer, bytes) in [
            (self.engine_constants, bytemuck::bytes_of(&engine)),
            (self.camera_constants, bytemuck::bytes_of(&camera)),
        ] {
            if let Err(e) = upload(&mut self.device, buffer, bytes) {
                tracing::warn!("Constant upload to {:?} skipped: {}", buffer, e);
                stats.skipped_uploads += 1;
            }
        }
    }

    fn bind_constants(&mut self) {
        let buffers = [Some(self.engine_constants), Some(self.camera_constants)];
        for stage in [Stage::Vertex, Stage::Pixel, Stage::Compute] {
            self.device
                .set_constant_buffers(stage, ENGINE_CONSTANTS_SLOT, &buffers);
        }
    }

    /// Returns true if any resolvable filter of `call` has an enabled pass
    /// that requires lighting.
    fn filters_need_lighting(&self, call: &RenderCall) -> bool {
        call.filters.iter().any(|&handle| {
            self.resources
                .filter(handle)
                .is_some_and(|filter| filter.requires_lighting())
        })
    }

    /// Runs each filter's passes full-screen, in order.
    fn run_filters(&mut self, call: &RenderCall, bindings: &LightBindings, stats: &mut FrameStats) {
        for &handle in &call.filters {
            let Some(filter) = self.resources.filter(handle) else {
                tracing::warn!("{}, skipping", RenderError::FilterMissing(handle));
                stats.skipped_filters += 1;
                continue;
            };
            for pass in filter.passes() {
                let mode = run_pass(&mut self.device, pass.as_ref(), bindings, &mut |device| {
                    device.draw_primitive(3, 0);
                });
                if matches!(mode, Some(mode) if mode != PassMode::None) {
                    stats.filter_passes += 1;
                }
            }
        }
    }

    /// Blits the rendered image onto the camera target, if one was given.
    fn composite(&mut self, call: &RenderCall, stats: &mut FrameStats) {
        let Some(target) = call.target else {
            return;
        };
        let screen = self.device.screen_target();
        self.device.set_render_target(Some(target));
        self.device
            .set_texture(Stage::Pixel, COMPOSITE_TEXTURE_SLOT, Some(screen));
        self.device.draw_primitive(3, 0);
        self.device.set_texture(Stage::Pixel, COMPOSITE_TEXTURE_SLOT, None);
        self.device.set_render_target(None);
        stats.composited = true;
    }
}

impl<D: GraphicsDevice> std::fmt::Debug for Renderer<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("stats", &self.stats)
            .field("queued", &self.render_calls.len())
            .finish_non_exhaustive()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn create_constants<D: GraphicsDevice, T: Pod>(device: &mut D, label: &'static str) -> RenderResult<BufferHandle> {
    let descriptor = BufferDescriptor::constant(label, std::mem::size_of::<T>() as u32);
    device
        .create_buffer(&descriptor)
        .map_err(|reason| RenderError::BufferCreate { label, reason })
}

/// Uploads a light collection, logging a failure as a skipped upload.
///
/// Returns the handle to bind, which after a failed map still holds the
/// previous frame's records.
fn upload_collection<D: GraphicsDevice, T: LightRecord>(
    device: &mut D,
    collection: &mut LightCollection<T>,
    growth: BufferGrowth,
    minimum: usize,
    stats: &mut FrameStats,
) -> Option<BufferHandle> {
    let before = collection.allocations();
    if let Err(e) = collection.update_buffer(device, growth, minimum) {
        tracing::warn!("Light upload skipped: {}", e);
        stats.skipped_uploads += 1;
    }
    stats.buffer_allocations += collection.allocations() - before;
    collection.buffer()
}

fn upload_growable<D: GraphicsDevice, T: Pod>(
    device: &mut D,
    buffer: &mut GrowableBuffer,
    data: &[T],
    growth: BufferGrowth,
    minimum: usize,
    stats: &mut FrameStats,
) {
    let before = buffer.allocations();
    if let Err(e) = buffer.upload(device, data, growth, minimum) {
        tracing::warn!("Light upload skipped: {}", e);
        stats.skipped_uploads += 1;
    }
    stats.buffer_allocations += buffer.allocations() - before;
}
