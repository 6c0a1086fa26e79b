//! Render calls and per-render-call GPU constants.

use bytemuck::{Pod, Zeroable};
use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::culling::Frustum;
use crate::device::TargetHandle;
use crate::math::{mul, Mat4};
use crate::shader::FilterHandle;

/// One camera's request to be rendered this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCall {
    /// World to view.
    pub view: Mat4,
    /// View to clip.
    pub projection: Mat4,
    /// World-space frustum derived from `projection * view`.
    pub frustum: Frustum,
    /// Near clip distance.
    pub near_clip: f32,
    /// Far clip distance.
    pub far_clip: f32,
    /// Off-screen target to composite onto, if any.
    pub target: Option<TargetHandle>,
    /// Post-process filters, in order.
    pub filters: Vec<FilterHandle>,
}

impl RenderCall {
    /// Creates a render call and derives its frustum.
    #[must_use]
    pub fn new(
        view: Mat4,
        projection: Mat4,
        near_clip: f32,
        far_clip: f32,
        target: Option<TargetHandle>,
    ) -> Self {
        Self {
            view,
            projection,
            frustum: Frustum::from_view_projection(&mul(&projection, &view)),
            near_clip,
            far_clip,
            target,
            filters: Vec::new(),
        }
    }

    /// Adds post-process filters.
    #[must_use]
    pub fn with_filters(mut self, filters: impl IntoIterator<Item = FilterHandle>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Vertical field of view in radians, read back from the projection.
    #[must_use]
    pub fn field_of_view(&self) -> f32 {
        2.0 * (1.0 / self.projection[1][1]).atan()
    }
}

/// Thread-safe queue of render calls.
///
/// Clones share the same queue, so any thread may submit cameras while the
/// render thread drains them.
#[derive(Debug, Clone)]
pub struct RenderCallQueue {
    sender: Sender<RenderCall>,
    receiver: Receiver<RenderCall>,
}

impl RenderCallQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Enqueues a render call.
    pub fn push(&self, call: RenderCall) {
        // Both ends live in `self`, so the channel cannot be disconnected.
        let _ = self.sender.send(call);
    }

    /// Dequeues the oldest render call.
    #[must_use]
    pub fn try_pop(&self) -> Option<RenderCall> {
        self.receiver.try_recv().ok()
    }

    /// Queued render calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for RenderCallQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Time passed to a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the world started.
    pub world_time: f32,
    /// Seconds since the previous frame.
    pub frame_time: f32,
}

/// Progress of the render call in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FrameState {
    /// No render call in flight.
    #[default]
    Idle,
    /// Collecting draw calls, gathering lights and uploading their buffers.
    LightingGather,
    /// Executing passes, filters and the camera target composite.
    Compositing,
    /// The render call has been fully submitted.
    Done,
}

/// Engine-wide constants, bound once per render call.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct EngineConstants {
    /// Seconds since the world started.
    pub world_time: f32,
    /// Seconds since the previous frame.
    pub frame_time: f32,
    /// Padding for alignment.
    pub _pad: [f32; 2],
}

impl From<FrameTime> for EngineConstants {
    fn from(time: FrameTime) -> Self {
        Self {
            world_time: time.world_time,
            frame_time: time.frame_time,
            _pad: [0.0; 2],
        }
    }
}

/// Camera constants, bound once per render call.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct CameraConstants {
    /// Vertical field of view in radians.
    pub field_of_view: f32,
    /// Near clip distance.
    pub near_clip: f32,
    /// Far clip distance.
    pub far_clip: f32,
    /// Padding for alignment.
    pub _pad: f32,
    /// World to view.
    pub view: Mat4,
    /// View to clip.
    pub projection: Mat4,
}

impl From<&RenderCall> for CameraConstants {
    fn from(call: &RenderCall) -> Self {
        Self {
            field_of_view: call.field_of_view(),
            near_clip: call.near_clip,
            far_clip: call.far_clip,
            _pad: 0.0,
            view: call.view,
            projection: call.projection,
        }
    }
}
