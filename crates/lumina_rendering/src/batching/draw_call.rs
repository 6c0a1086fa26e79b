//! Draw calls and the per-frame queue they are submitted to.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::device::GraphicsDevice;
use crate::shader::{MaterialHandle, PluginHandle, ResourceProvider};

use super::DrawCallKey;

/// Issues the geometry of one draw call.
pub type DrawFn = Box<dyn Fn(&mut dyn GraphicsDevice) + Send + Sync>;

/// One queued draw.
pub struct DrawCall {
    key: DrawCallKey,
    draw: DrawFn,
}

impl DrawCall {
    /// Creates a draw call.
    #[must_use]
    pub fn new(key: DrawCallKey, draw: DrawFn) -> Self {
        Self { key, draw }
    }

    /// Sort key.
    #[must_use]
    pub const fn key(&self) -> DrawCallKey {
        self.key
    }

    /// Issues the geometry.
    pub fn draw(&self, device: &mut dyn GraphicsDevice) {
        (self.draw)(device);
    }
}

impl std::fmt::Debug for DrawCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawCall").field("key", &self.key).finish_non_exhaustive()
    }
}

/// Thread-safe per-frame list of draw calls.
///
/// Cloning shares the same list, so scene collectors may fan out across
/// threads while the renderer waits.
#[derive(Clone)]
pub struct DrawCallQueue {
    calls: Arc<Mutex<Vec<DrawCall>>>,
    resources: Arc<dyn ResourceProvider>,
}

impl DrawCallQueue {
    /// Creates an empty queue that validates handles against `resources`.
    #[must_use]
    pub fn new(resources: Arc<dyn ResourceProvider>) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            resources,
        }
    }

    /// Queues a draw of `plugin` geometry with `material`.
    ///
    /// Does nothing and returns `false` if either handle is null or stale,
    /// the material has no shader, or a handle is too large to pack.
    pub fn queue_draw_call<F>(&self, plugin: PluginHandle, material: MaterialHandle, draw: F) -> bool
    where
        F: Fn(&mut dyn GraphicsDevice) + Send + Sync + 'static,
    {
        if !plugin.is_valid() || !material.is_valid() || !self.resources.is_plugin_valid(plugin) {
            tracing::trace!(?plugin, ?material, "Draw call with invalid handle ignored");
            return false;
        }
        let Some(shader) = self.resources.material_shader(material) else {
            tracing::trace!(?material, "Draw call for material without shader ignored");
            return false;
        };
        let Some(key) = DrawCallKey::pack(shader, plugin, material) else {
            tracing::warn!(?shader, ?plugin, ?material, "Draw call handles do not fit the sort key");
            return false;
        };

        self.calls.lock().push(DrawCall::new(key, Box::new(draw)));
        true
    }

    /// Number of queued draw calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }

    /// Drops every queued draw call.
    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    /// Removes and returns every queued draw call.
    #[must_use]
    pub fn take(&self) -> Vec<DrawCall> {
        std::mem::take(&mut *self.calls.lock())
    }
}

impl std::fmt::Debug for DrawCallQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawCallQueue").field("len", &self.len()).finish_non_exhaustive()
    }
}
