//! GPU light records.
//!
//! Tightly packed, pointer-free, 16-byte aligned rows uploaded verbatim into
//! structured buffers. Positions and directions are in view space.

use bytemuck::{Pod, Zeroable};

use super::collection::LightRecord;

/// A directional light.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct DirectionalLightData {
    /// Color multiplied by intensity.
    pub radiance: [f32; 3],
    /// Padding for alignment.
    pub _pad0: f32,
    /// Direction the light travels, view space, unit length.
    pub direction: [f32; 3],
    /// Padding for alignment.
    pub _pad1: f32,
}

impl DirectionalLightData {
    /// Creates a directional light record.
    #[must_use]
    pub const fn new(radiance: [f32; 3], direction: [f32; 3]) -> Self {
        Self {
            radiance,
            _pad0: 0.0,
            direction,
            _pad1: 0.0,
        }
    }
}

/// A point light.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PointLightData {
    /// Color multiplied by intensity.
    pub radiance: [f32; 3],
    /// Radius of the emitting sphere.
    pub radius: f32,
    /// Position, view space.
    pub position: [f32; 3],
    /// Distance beyond the radius at which the light fades out.
    pub range: f32,
}

impl PointLightData {
    /// Creates a point light record.
    #[must_use]
    pub const fn new(radiance: [f32; 3], position: [f32; 3], radius: f32, range: f32) -> Self {
        Self {
            radiance,
            radius,
            position,
            range,
        }
    }

    /// Radius of the sphere the light can affect.
    #[must_use]
    pub fn extent(&self) -> f32 {
        self.radius + self.range
    }
}

/// A spot light.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct SpotLightData {
    /// Color multiplied by intensity.
    pub radiance: [f32; 3],
    /// Radius of the emitting sphere.
    pub radius: f32,
    /// Position, view space.
    pub position: [f32; 3],
    /// Distance beyond the radius at which the light fades out.
    pub range: f32,
    /// Cone axis, view space, unit length.
    pub direction: [f32; 3],
    /// Exponent applied between the inner and outer cone.
    pub cone_falloff: f32,
    /// Cosine of the inner cone half-angle.
    pub inner_angle: f32,
    /// Cosine of the outer cone half-angle.
    pub outer_angle: f32,
    /// Padding for alignment.
    pub _pad: [f32; 2],
}

impl SpotLightData {
    /// Radius of the sphere the light can affect.
    #[must_use]
    pub fn extent(&self) -> f32 {
        self.radius + self.range
    }
}

impl LightRecord for DirectionalLightData {
    const LABEL: &'static str = "directional lights";
}

impl LightRecord for PointLightData {
    const LABEL: &'static str = "point lights";
}

impl LightRecord for SpotLightData {
    const LABEL: &'static str = "spot lights";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sizes() {
        assert_eq!(std::mem::size_of::<DirectionalLightData>(), 32);
        assert_eq!(std::mem::size_of::<PointLightData>(), 32);
        assert_eq!(std::mem::size_of::<SpotLightData>(), 64);
    }

    #[test]
    fn test_extent() {
        let light = PointLightData::new([1.0; 3], [0.0, 0.0, 5.0], 0.5, 10.0);
        assert_eq!(light.extent(), 10.5);
    }
}
