//! Sorted, bucketed draw calls and the pass loop that executes them.

use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;

use crate::device::GraphicsDevice;
use crate::error::RenderError;
use crate::pipeline::{FrameStats, LightBindings};
use crate::shader::{PassMode, RenderPass, ResourceProvider, Shader, ShaderHandle};

use super::DrawCall;

/// A maximal run of sorted draw calls sharing one resolved shader.
pub struct ShaderRun {
    handle: ShaderHandle,
    shader: Arc<dyn Shader>,
    calls: Range<usize>,
}

impl ShaderRun {
    /// Shader handle.
    #[must_use]
    pub const fn handle(&self) -> ShaderHandle {
        self.handle
    }

    /// Resolved shader.
    #[must_use]
    pub fn shader(&self) -> &Arc<dyn Shader> {
        &self.shader
    }

    /// Draw calls in the run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Returns true if the run has no draw calls.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

impl std::fmt::Debug for ShaderRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderRun")
            .field("handle", &self.handle)
            .field("shader", &self.shader.name())
            .field("calls", &self.calls)
            .finish()
    }
}

/// One frame's draw calls, sorted and grouped for execution.
#[derive(Debug, Default)]
pub struct DrawPlan {
    calls: Vec<DrawCall>,
    buckets: BTreeMap<i32, Vec<ShaderRun>>,
    skipped_runs: u32,
}

impl DrawPlan {
    /// Sorts `calls` by key, cuts shader runs and buckets them by draw
    /// order. Runs whose shader does not resolve are logged and dropped.
    #[must_use]
    pub fn build(mut calls: Vec<DrawCall>, resources: &dyn ResourceProvider) -> Self {
        calls.sort_unstable_by_key(DrawCall::key);

        let mut buckets: BTreeMap<i32, Vec<ShaderRun>> = BTreeMap::new();
        let mut skipped_runs = 0;
        let mut start = 0;
        while start < calls.len() {
            let handle = calls[start].key().shader();
            let end = calls[start..]
                .iter()
                .position(|call| call.key().shader() != handle)
                .map_or(calls.len(), |len| start + len);

            if let Some(shader) = resources.shader(handle) {
                buckets.entry(shader.draw_order()).or_default().push(ShaderRun {
                    handle,
                    shader,
                    calls: start..end,
                });
            } else {
                tracing::warn!(
                    draw_calls = end - start,
                    "{}, skipping its draw calls",
                    RenderError::ShaderMissing(handle)
                );
                skipped_runs += 1;
            }
            start = end;
        }

        Self {
            calls,
            buckets,
            skipped_runs,
        }
    }

    /// Draw calls, including those of skipped runs.
    #[must_use]
    pub fn draw_call_count(&self) -> usize {
        self.calls.len()
    }

    /// Returns true if there are no draw calls.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Runs whose shader resolved.
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Runs dropped because their shader did not resolve.
    #[must_use]
    pub const fn skipped_runs(&self) -> u32 {
        self.skipped_runs
    }

    /// Runs in execution order.
    pub fn runs(&self) -> impl Iterator<Item = &ShaderRun> {
        self.buckets.values().flatten()
    }

    /// Returns true if any enabled pass of any run requires lighting.
    #[must_use]
    pub fn needs_lighting(&self) -> bool {
        self.runs().any(|run| run.shader.requires_lighting())
    }

    /// Executes every run's passes in ascending draw order.
    pub fn execute(
        &self,
        device: &mut dyn GraphicsDevice,
        resources: &dyn ResourceProvider,
        lighting: &LightBindings,
        stats: &mut FrameStats,
    ) {
        for run in self.runs() {
            let calls = &self.calls[run.calls.clone()];
            tracing::trace!(
                shader = run.shader.name(),
                draw_calls = calls.len(),
                "Executing shader run"
            );
            for pass in run.shader.passes() {
                let mut forward = |device: &mut dyn GraphicsDevice| {
                    draw_coalesced(device, resources, calls, stats);
                };
                let mode = run_pass(device, pass.as_ref(), lighting, &mut forward);
                count_pass(stats, mode);
            }
            stats.shader_runs += 1;
        }
    }
}

/// Invokes each draw call, binding plugin and material only on change.
fn draw_coalesced(
    device: &mut dyn GraphicsDevice,
    resources: &dyn ResourceProvider,
    calls: &[DrawCall],
    stats: &mut FrameStats,
) {
    let mut plugin = None;
    let mut material = None;
    for call in calls {
        let key = call.key();
        if plugin != Some(key.plugin()) {
            resources.bind_plugin(device, key.plugin());
            plugin = Some(key.plugin());
            stats.plugin_binds += 1;
        }
        if material != Some(key.material()) {
            resources.bind_material(device, key.material());
            material = Some(key.material());
            stats.material_binds += 1;
        }
        call.draw(device);
    }
}

fn count_pass(stats: &mut FrameStats, mode: Option<PassMode>) {
    match mode {
        Some(PassMode::Forward) => stats.forward_passes += 1,
        Some(PassMode::Deferred) => stats.deferred_passes += 1,
        Some(PassMode::Compute { .. }) => stats.compute_passes += 1,
        Some(PassMode::None) | None => {}
    }
}

/// Prepares, executes and clears one pass.
///
/// Light buffers are bound only while a pass that requires them executes.
/// `forward` runs for [`PassMode::Forward`]. Returns `None` if the pass is
/// disabled.
pub(crate) fn run_pass(
    device: &mut dyn GraphicsDevice,
    pass: &dyn RenderPass,
    lighting: &LightBindings,
    forward: &mut dyn FnMut(&mut dyn GraphicsDevice),
) -> Option<PassMode> {
    if !pass.is_enabled() {
        return None;
    }

    let mode = pass.prepare(device);
    let bind_lighting = pass.is_lighting_required() && mode != PassMode::None;
    if bind_lighting {
        lighting.bind(device, mode.stage());
    }

    match mode {
        PassMode::Forward => forward(device),
        PassMode::Deferred => device.draw_primitive(3, 0),
        PassMode::Compute { groups } => device.dispatch(groups[0], groups[1], groups[2]),
        PassMode::None => {}
    }

    if bind_lighting {
        lighting.unbind(device, mode.stage());
    }
    pass.clear(device);
    Some(mode)
}
