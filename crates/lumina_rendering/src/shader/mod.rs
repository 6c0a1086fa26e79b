//! # Shaders, Filters and Passes
//!
//! The renderer does not load or compile shaders. It resolves handles
//! through a [`ResourceProvider`] and walks the ordered pass list each
//! resolved [`Shader`] or [`Filter`] exposes.
//!
//! A pass is prepared, executed according to the [`PassMode`] it returns,
//! and cleared before the next pass begins.

mod basic;

use std::sync::Arc;

use crate::device::{GraphicsDevice, Stage};

pub use basic::{BasicFilter, BasicPass, BasicShader, BindEvent, ResourceRegistry};

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            /// The null handle.
            pub const INVALID: Self = Self(0);

            /// Returns true unless this is the null handle.
            #[inline]
            #[must_use]
            pub const fn is_valid(self) -> bool {
                self.0 != 0
            }
        }
    };
}

define_handle!(
    /// Names a shader. Zero is the null handle.
    ShaderHandle
);
define_handle!(
    /// Names a filter. Zero is the null handle.
    FilterHandle
);
define_handle!(
    /// Names a material. Zero is the null handle.
    MaterialHandle
);
define_handle!(
    /// Names a plugin, the geometry layout a draw call feeds. Zero is the
    /// null handle.
    PluginHandle
);

/// How a prepared pass consumes the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassMode {
    /// Invoke every draw call of the shader run.
    Forward,
    /// Draw one full-screen triangle.
    Deferred,
    /// Dispatch compute thread groups.
    Compute {
        /// Thread groups along X, Y and Z.
        groups: [u32; 3],
    },
    /// Nothing to execute.
    None,
}

impl PassMode {
    /// Stage whose resource slots the pass reads.
    #[must_use]
    pub const fn stage(self) -> Stage {
        match self {
            Self::Compute { .. } => Stage::Compute,
            Self::Forward | Self::Deferred | Self::None => Stage::Pixel,
        }
    }
}

/// One pass of a shader or filter.
pub trait RenderPass: Send + Sync {
    /// Pass name, for logs.
    fn name(&self) -> &str;

    /// Disabled passes are skipped.
    fn is_enabled(&self) -> bool;

    /// Whether the light buffers must be bound while the pass executes.
    fn is_lighting_required(&self) -> bool;

    /// Binds pipeline state and returns how to execute the pass.
    fn prepare(&self, device: &mut dyn GraphicsDevice) -> PassMode;

    /// Unbinds whatever [`RenderPass::prepare`] bound.
    fn clear(&self, device: &mut dyn GraphicsDevice);
}

/// A shader: an ordered list of passes applied to its draw calls.
pub trait Shader: Send + Sync {
    /// Shader name, for logs.
    fn name(&self) -> &str;

    /// Lower draw orders execute first.
    fn draw_order(&self) -> i32;

    /// Passes in execution order.
    fn passes(&self) -> &[Arc<dyn RenderPass>];

    /// Returns true if any enabled pass requires lighting.
    fn requires_lighting(&self) -> bool {
        self.passes()
            .iter()
            .any(|pass| pass.is_enabled() && pass.is_lighting_required())
    }
}

/// A post-process filter: full-screen passes over the rendered image.
pub trait Filter: Send + Sync {
    /// Filter name, for logs.
    fn name(&self) -> &str;

    /// Passes in execution order.
    fn passes(&self) -> &[Arc<dyn RenderPass>];

    /// Returns true if any enabled pass requires lighting.
    fn requires_lighting(&self) -> bool {
        self.passes()
            .iter()
            .any(|pass| pass.is_enabled() && pass.is_lighting_required())
    }
}

/// Resolves handles to live resources and binds per-draw state.
///
/// Resolution may fail at any time, for instance when a shader is
/// hot-reloaded between submission and rendering.
pub trait ResourceProvider: Send + Sync {
    /// Resolves a shader.
    fn shader(&self, handle: ShaderHandle) -> Option<Arc<dyn Shader>>;

    /// Resolves a filter.
    fn filter(&self, handle: FilterHandle) -> Option<Arc<dyn Filter>>;

    /// The shader a material renders with.
    fn material_shader(&self, material: MaterialHandle) -> Option<ShaderHandle>;

    /// Returns true if the plugin is live.
    fn is_plugin_valid(&self, plugin: PluginHandle) -> bool;

    /// Binds the geometry layout of a plugin.
    fn bind_plugin(&self, device: &mut dyn GraphicsDevice, plugin: PluginHandle);

    /// Binds the resources of a material.
    fn bind_material(&self, device: &mut dyn GraphicsDevice, material: MaterialHandle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handles() {
        assert!(!ShaderHandle::INVALID.is_valid());
        assert!(!MaterialHandle::default().is_valid());
        assert!(PluginHandle(3).is_valid());
    }

    #[test]
    fn test_pass_stage() {
        assert_eq!(PassMode::Forward.stage(), Stage::Pixel);
        assert_eq!(PassMode::Compute { groups: [1, 1, 1] }.stage(), Stage::Compute);
    }
}
