//! Per-frame lighting context and the gather tasks that fill it.
//!
//! The three gather tasks run on the worker pool, one per light type. Each
//! owns its collection and its half of the tile lists for the duration of
//! the gather, then the render thread takes over for upload.

use parking_lot::Mutex;

use crate::clustering::{ClusterAssigner, ClusterGrid, GridDimensions, LightKind};
use crate::culling::{cull_spheres, Frustum};
use crate::device::{BufferHandle, GraphicsDevice, Stage};
use crate::lights::{
    Color, DirectionalLightData, LightCollection, LightScene, PointLightData, SpotLightData,
};
use crate::math::{normalize, rotate, scale, transform_point, transform_vector, Float3, Mat4};

/// First resource slot of the light buffers.
pub const LIGHT_RESOURCE_SLOT: u32 = 0;

/// Light buffers bound around passes that require lighting.
///
/// Slots, from [`LIGHT_RESOURCE_SLOT`]: directional lights, point lights,
/// spot lights, tile offset/count records, light indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightBindings {
    /// Buffers in slot order.
    pub resources: [Option<BufferHandle>; 5],
}

impl LightBindings {
    /// Binds the light buffers on `stage`.
    pub fn bind(&self, device: &mut dyn GraphicsDevice, stage: Stage) {
        device.set_resources(stage, LIGHT_RESOURCE_SLOT, &self.resources);
    }

    /// Clears the light buffer slots on `stage`.
    pub fn unbind(&self, device: &mut dyn GraphicsDevice, stage: Stage) {
        device.set_resources(stage, LIGHT_RESOURCE_SLOT, &[None; 5]);
    }
}

/// Everything a gather task needs to know about the camera.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LightingCamera {
    /// World to view.
    pub view: Mat4,
    /// World-space frustum.
    pub frustum: Frustum,
    /// Tile assignment for this camera.
    pub assigner: ClusterAssigner,
}

/// Light collections and tile lists for the render call in flight.
#[derive(Debug)]
pub(crate) struct FrameLighting {
    pub directional: Mutex<LightCollection<DirectionalLightData>>,
    pub point: Mutex<LightCollection<PointLightData>>,
    pub spot: Mutex<LightCollection<SpotLightData>>,
    pub grid: ClusterGrid,
}

impl FrameLighting {
    pub fn new(dims: GridDimensions) -> Self {
        Self {
            directional: Mutex::new(LightCollection::new()),
            point: Mutex::new(LightCollection::new()),
            spot: Mutex::new(LightCollection::new()),
            grid: ClusterGrid::new(dims),
        }
    }
}

/// Visible and culled counts of one gather.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct GatherCounts {
    pub visible: u32,
    pub culled: u32,
}

fn radiance(color: &Color, intensity: f32) -> Float3 {
    scale(color.0, intensity)
}

/// View-space direction a light with `rotation` shines along.
fn view_direction(view: &Mat4, rotation: [f32; 4]) -> Float3 {
    normalize(transform_vector(view, rotate(rotation, [0.0, 0.0, 1.0])))
}

/// Collects every directional light. Directional lights are never culled.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn gather_directional(lighting: &FrameLighting, scene: &dyn LightScene, view: &Mat4) -> u32 {
    let mut collection = lighting.directional.lock();
    collection.clear();
    scene.for_each_directional(&mut |transform, color, light| {
        collection.push(DirectionalLightData::new(
            radiance(color, light.intensity),
            view_direction(view, transform.rotation),
        ));
    });
    collection.len() as u32
}

/// A light that survived scene enumeration, before culling.
struct Candidate<T> {
    record: T,
    world: Float3,
}

/// Culls `candidates`, then stores and assigns the visible ones.
#[allow(clippy::cast_possible_truncation)]
fn cull_and_assign<T: crate::lights::LightRecord>(
    collection: &mut LightCollection<T>,
    grid: &ClusterGrid,
    camera: &LightingCamera,
    kind: LightKind,
    candidates: Vec<Candidate<T>>,
    extent: impl Fn(&T) -> f32,
    to_view: impl Fn(&mut T, Float3),
) -> GatherCounts {
    let centers: Vec<Float3> = candidates.iter().map(|c| c.world).collect();
    let radii: Vec<f32> = candidates.iter().map(|c| extent(&c.record)).collect();
    let mut visible = Vec::with_capacity(candidates.len());
    cull_spheres(&camera.frustum, &centers, &radii, &mut visible);

    let mut counts = GatherCounts::default();
    for (candidate, visible) in candidates.into_iter().zip(visible) {
        if !visible {
            counts.culled += 1;
            continue;
        }
        let mut record = candidate.record;
        let position = transform_point(&camera.view, candidate.world);
        to_view(&mut record, position);
        let reach = extent(&record);
        let index = collection.push(record);
        camera.assigner.assign(grid, position, reach, index, kind);
        counts.visible += 1;
    }
    counts
}

/// Culls point lights, stores the visible ones and assigns them to tiles.
pub(crate) fn gather_points(
    lighting: &FrameLighting,
    scene: &dyn LightScene,
    camera: &LightingCamera,
) -> GatherCounts {
    let mut collection = lighting.point.lock();
    collection.clear();
    lighting.grid.reset_kind(LightKind::Point);

    let mut candidates = Vec::new();
    scene.for_each_point(&mut |transform, color, light| {
        candidates.push(Candidate {
            record: PointLightData::new(
                radiance(color, light.intensity),
                transform.position,
                light.radius,
                light.range,
            ),
            world: transform.position,
        });
    });

    cull_and_assign(
        &mut collection,
        &lighting.grid,
        camera,
        LightKind::Point,
        candidates,
        PointLightData::extent,
        |record, position| record.position = position,
    )
}

/// Culls spot lights, stores the visible ones and assigns them to tiles.
///
/// A spot light is culled and assigned by the sphere around its cone.
pub(crate) fn gather_spots(
    lighting: &FrameLighting,
    scene: &dyn LightScene,
    camera: &LightingCamera,
) -> GatherCounts {
    let mut collection = lighting.spot.lock();
    collection.clear();
    lighting.grid.reset_kind(LightKind::Spot);

    let mut candidates = Vec::new();
    scene.for_each_spot(&mut |transform, color, light| {
        candidates.push(Candidate {
            record: SpotLightData {
                radiance: radiance(color, light.intensity),
                radius: light.radius,
                position: transform.position,
                range: light.range,
                direction: view_direction(&camera.view, transform.rotation),
                cone_falloff: light.cone_falloff,
                inner_angle: light.inner_angle.cos(),
                outer_angle: light.outer_angle.cos(),
                _pad: [0.0; 2],
            },
            world: transform.position,
        });
    });

    cull_and_assign(
        &mut collection,
        &lighting.grid,
        camera,
        LightKind::Spot,
        candidates,
        SpotLightData::extent,
        |record, position| record.position = position,
    )
}
