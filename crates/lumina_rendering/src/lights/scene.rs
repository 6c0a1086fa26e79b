//! The scene as seen by the light gather.
//!
//! The renderer never owns entities. It visits the light-bearing ones
//! through [`LightScene`], once per light type per render call, from worker
//! threads.

/// Position and orientation of an entity, world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// World position.
    pub position: [f32; 3],
    /// Unit quaternion `[x, y, z, w]`. Lights shine along rotated +Z.
    pub rotation: [f32; 4],
}

impl Transform {
    /// A transform at `position` with no rotation.
    #[must_use]
    pub const fn from_position(position: [f32; 3]) -> Self {
        Self {
            position,
            rotation: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::from_position([0.0; 3])
    }
}

/// Linear RGB color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub [f32; 3]);

impl Default for Color {
    fn default() -> Self {
        Self([1.0; 3])
    }
}

/// A light that shines everywhere from one direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Scales the color into radiance.
    pub intensity: f32,
}

/// A light that shines in every direction from a sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// Scales the color into radiance.
    pub intensity: f32,
    /// Radius of the emitting sphere.
    pub radius: f32,
    /// Distance beyond the radius at which the light fades out.
    pub range: f32,
}

/// A light that shines in a cone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    /// Scales the color into radiance.
    pub intensity: f32,
    /// Radius of the emitting sphere.
    pub radius: f32,
    /// Distance beyond the radius at which the light fades out.
    pub range: f32,
    /// Inner cone half-angle, radians.
    pub inner_angle: f32,
    /// Outer cone half-angle, radians.
    pub outer_angle: f32,
    /// Exponent applied between the inner and outer cone.
    pub cone_falloff: f32,
}

/// Enumerates the light-bearing entities of a scene.
///
/// Called concurrently from the lighting workers, one light type per worker.
pub trait LightScene: Send + Sync {
    /// Visits every directional light.
    fn for_each_directional(&self, visit: &mut dyn FnMut(&Transform, &Color, &DirectionalLight));

    /// Visits every point light.
    fn for_each_point(&self, visit: &mut dyn FnMut(&Transform, &Color, &PointLight));

    /// Visits every spot light.
    fn for_each_spot(&self, visit: &mut dyn FnMut(&Transform, &Color, &SpotLight));
}

/// A [`LightScene`] backed by plain vectors.
#[derive(Debug, Clone, Default)]
pub struct SceneLights {
    directional: Vec<(Transform, Color, DirectionalLight)>,
    point: Vec<(Transform, Color, PointLight)>,
    spot: Vec<(Transform, Color, SpotLight)>,
}

impl SceneLights {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directional light.
    pub fn add_directional(&mut self, transform: Transform, color: Color, light: DirectionalLight) {
        self.directional.push((transform, color, light));
    }

    /// Adds a point light.
    pub fn add_point(&mut self, transform: Transform, color: Color, light: PointLight) {
        self.point.push((transform, color, light));
    }

    /// Adds a spot light.
    pub fn add_spot(&mut self, transform: Transform, color: Color, light: SpotLight) {
        self.spot.push((transform, color, light));
    }

    /// Total number of lights.
    #[must_use]
    pub fn len(&self) -> usize {
        self.directional.len() + self.point.len() + self.spot.len()
    }

    /// Returns true if the scene has no lights.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every light.
    pub fn clear(&mut self) {
        self.directional.clear();
        self.point.clear();
        self.spot.clear();
    }
}

impl LightScene for SceneLights {
    fn for_each_directional(&self, visit: &mut dyn FnMut(&Transform, &Color, &DirectionalLight)) {
        for (transform, color, light) in &self.directional {
            visit(transform, color, light);
        }
    }

    fn for_each_point(&self, visit: &mut dyn FnMut(&Transform, &Color, &PointLight)) {
        for (transform, color, light) in &self.point {
            visit(transform, color, light);
        }
    }

    fn for_each_spot(&self, visit: &mut dyn FnMut(&Transform, &Color, &SpotLight)) {
        for (transform, color, light) in &self.spot {
            visit(transform, color, light);
        }
    }
}
