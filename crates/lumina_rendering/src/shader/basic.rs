//! In-memory shaders, filters and a resource registry.
//!
//! Enough to drive the renderer headless: passes that report a fixed mode
//! and a registry that hands out handles and records every bind.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::device::{GraphicsDevice, TargetHandle};

use super::{
    Filter, FilterHandle, MaterialHandle, PassMode, PluginHandle, RenderPass, ResourceProvider,
    Shader, ShaderHandle,
};

/// A pass with a fixed mode and an optional render target.
#[derive(Debug)]
pub struct BasicPass {
    name: String,
    mode: PassMode,
    lighting: bool,
    target: Option<TargetHandle>,
    enabled: AtomicBool,
}

impl BasicPass {
    /// Creates an enabled pass.
    #[must_use]
    pub fn new(name: impl Into<String>, mode: PassMode) -> Self {
        Self {
            name: name.into(),
            mode,
            lighting: false,
            target: None,
            enabled: AtomicBool::new(true),
        }
    }

    /// Requires the light buffers while executing.
    #[must_use]
    pub fn with_lighting(mut self) -> Self {
        self.lighting = true;
        self
    }

    /// Renders into `target`, restored to the default when cleared.
    #[must_use]
    pub fn with_target(mut self, target: TargetHandle) -> Self {
        self.target = Some(target);
        self
    }

    /// Enables or disables the pass.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }
}

impl RenderPass for BasicPass {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    fn is_lighting_required(&self) -> bool {
        self.lighting
    }

    fn prepare(&self, device: &mut dyn GraphicsDevice) -> PassMode {
        if let Some(target) = self.target {
            device.set_render_target(Some(target));
        }
        self.mode
    }

    fn clear(&self, device: &mut dyn GraphicsDevice) {
        if self.target.is_some() {
            device.set_render_target(None);
        }
    }
}

/// A shader made of [`RenderPass`] objects.
pub struct BasicShader {
    name: String,
    draw_order: i32,
    passes: Vec<Arc<dyn RenderPass>>,
}

impl BasicShader {
    /// Creates a shader with no passes.
    #[must_use]
    pub fn new(name: impl Into<String>, draw_order: i32) -> Self {
        Self {
            name: name.into(),
            draw_order,
            passes: Vec::new(),
        }
    }

    /// Appends a pass.
    #[must_use]
    pub fn with_pass(mut self, pass: Arc<dyn RenderPass>) -> Self {
        self.passes.push(pass);
        self
    }
}

impl Shader for BasicShader {
    fn name(&self) -> &str {
        &self.name
    }

    fn draw_order(&self) -> i32 {
        self.draw_order
    }

    fn passes(&self) -> &[Arc<dyn RenderPass>] {
        &self.passes
    }
}

/// A filter made of [`RenderPass`] objects.
pub struct BasicFilter {
    name: String,
    passes: Vec<Arc<dyn RenderPass>>,
}

impl BasicFilter {
    /// Creates a filter with no passes.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passes: Vec::new(),
        }
    }

    /// Appends a pass.
    #[must_use]
    pub fn with_pass(mut self, pass: Arc<dyn RenderPass>) -> Self {
        self.passes.push(pass);
        self
    }
}

impl Filter for BasicFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn passes(&self) -> &[Arc<dyn RenderPass>] {
        &self.passes
    }
}

/// A bind issued through a [`ResourceRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindEvent {
    /// A plugin was bound.
    Plugin(PluginHandle),
    /// A material was bound.
    Material(MaterialHandle),
}

/// A [`ResourceProvider`] backed by hash maps.
///
/// Handles are allocated from one counter starting at 1. Removing a shader
/// or filter makes its handle stop resolving.
#[derive(Default)]
pub struct ResourceRegistry {
    next_id: AtomicU32,
    shaders: RwLock<HashMap<ShaderHandle, Arc<dyn Shader>>>,
    filters: RwLock<HashMap<FilterHandle, Arc<dyn Filter>>>,
    materials: RwLock<HashMap<MaterialHandle, ShaderHandle>>,
    plugins: RwLock<Vec<PluginHandle>>,
    binds: Mutex<Vec<BindEvent>>,
}

impl ResourceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&self) -> u32 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Registers a shader.
    pub fn register_shader(&self, shader: Arc<dyn Shader>) -> ShaderHandle {
        let handle = ShaderHandle(self.allocate());
        self.shaders.write().insert(handle, shader);
        handle
    }

    /// Removes a shader. Materials using it keep pointing at the handle.
    pub fn remove_shader(&self, handle: ShaderHandle) -> bool {
        self.shaders.write().remove(&handle).is_some()
    }

    /// Registers a filter.
    pub fn register_filter(&self, filter: Arc<dyn Filter>) -> FilterHandle {
        let handle = FilterHandle(self.allocate());
        self.filters.write().insert(handle, filter);
        handle
    }

    /// Registers a material that renders with `shader`.
    pub fn register_material(&self, shader: ShaderHandle) -> MaterialHandle {
        let handle = MaterialHandle(self.allocate());
        self.materials.write().insert(handle, shader);
        handle
    }

    /// Registers a plugin.
    pub fn register_plugin(&self) -> PluginHandle {
        let handle = PluginHandle(self.allocate());
        self.plugins.write().push(handle);
        handle
    }

    /// Takes the binds recorded so far.
    pub fn take_binds(&self) -> Vec<BindEvent> {
        std::mem::take(&mut *self.binds.lock())
    }
}

impl ResourceProvider for ResourceRegistry {
    fn shader(&self, handle: ShaderHandle) -> Option<Arc<dyn Shader>> {
        self.shaders.read().get(&handle).cloned()
    }

    fn filter(&self, handle: FilterHandle) -> Option<Arc<dyn Filter>> {
        self.filters.read().get(&handle).cloned()
    }

    fn material_shader(&self, material: MaterialHandle) -> Option<ShaderHandle> {
        self.materials.read().get(&material).copied()
    }

    fn is_plugin_valid(&self, plugin: PluginHandle) -> bool {
        self.plugins.read().contains(&plugin)
    }

    fn bind_plugin(&self, _device: &mut dyn GraphicsDevice, plugin: PluginHandle) {
        self.binds.lock().push(BindEvent::Plugin(plugin));
    }

    fn bind_material(&self, _device: &mut dyn GraphicsDevice, material: MaterialHandle) {
        self.binds.lock().push(BindEvent::Material(material));
    }
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("shaders", &self.shaders.read().len())
            .field("filters", &self.filters.read().len())
            .field("materials", &self.materials.read().len())
            .field("plugins", &self.plugins.read().len())
            .finish()
    }
}
