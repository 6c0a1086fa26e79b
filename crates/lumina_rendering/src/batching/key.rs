//! Packed sort key of a draw call.

use crate::shader::{MaterialHandle, PluginHandle, ShaderHandle};

/// `(shader, plugin, material)` packed into one integer.
///
/// ```text
///   63        48 47        32 31                         0
///   ┌──────────┬────────────┬────────────────────────────┐
///   │  shader  │   plugin   │          material          │
///   └──────────┴────────────┴────────────────────────────┘
/// ```
///
/// Comparing keys orders by shader, then plugin, then material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawCallKey(u64);

impl DrawCallKey {
    /// Bits holding the shader handle.
    pub const SHADER_BITS: u32 = 16;
    /// Bits holding the plugin handle.
    pub const PLUGIN_BITS: u32 = 16;
    /// Bits holding the material handle.
    pub const MATERIAL_BITS: u32 = 32;

    const PLUGIN_SHIFT: u32 = Self::MATERIAL_BITS;
    const SHADER_SHIFT: u32 = Self::MATERIAL_BITS + Self::PLUGIN_BITS;

    /// Packs three handles, or returns `None` if a handle does not fit its
    /// field.
    #[must_use]
    pub fn pack(shader: ShaderHandle, plugin: PluginHandle, material: MaterialHandle) -> Option<Self> {
        let shader = u16::try_from(shader.0).ok()?;
        let plugin = u16::try_from(plugin.0).ok()?;
        Some(Self(
            u64::from(shader) << Self::SHADER_SHIFT
                | u64::from(plugin) << Self::PLUGIN_SHIFT
                | u64::from(material.0),
        ))
    }

    /// Shader handle.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn shader(self) -> ShaderHandle {
        ShaderHandle((self.0 >> Self::SHADER_SHIFT) as u32)
    }

    /// Plugin handle.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn plugin(self) -> PluginHandle {
        PluginHandle(((self.0 >> Self::PLUGIN_SHIFT) & 0xFFFF) as u32)
    }

    /// Material handle.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn material(self) -> MaterialHandle {
        MaterialHandle(self.0 as u32)
    }

    /// The packed value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_unpack() {
        let key = DrawCallKey::pack(ShaderHandle(7), PluginHandle(65_535), MaterialHandle(u32::MAX))
            .unwrap();
        assert_eq!(key.shader(), ShaderHandle(7));
        assert_eq!(key.plugin(), PluginHandle(65_535));
        assert_eq!(key.material(), MaterialHandle(u32::MAX));
    }

    #[test]
    fn test_order_is_shader_plugin_material() {
        let key = |s, p, m| {
            DrawCallKey::pack(ShaderHandle(s), PluginHandle(p), MaterialHandle(m)).unwrap()
        };
        assert!(key(1, 9, 9) < key(2, 0, 0));
        assert!(key(1, 1, 9) < key(1, 2, 0));
        assert!(key(1, 1, 1) < key(1, 1, 2));
    }

    #[test]
    fn test_oversized_handles_rejected() {
        assert!(DrawCallKey::pack(ShaderHandle(70_000), PluginHandle(1), MaterialHandle(1)).is_none());
        assert!(DrawCallKey::pack(ShaderHandle(1), PluginHandle(70_000), MaterialHandle(1)).is_none());
    }
}
