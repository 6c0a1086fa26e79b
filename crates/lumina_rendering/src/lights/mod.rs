//! Light collections.
//!
//! Per-type containers of GPU-ready light records, rebuilt every frame from
//! the light-bearing entities of the scene.

mod collection;
mod data;
mod scene;

pub use collection::{LightCollection, LightRecord};
pub use data::{DirectionalLightData, PointLightData, SpotLightData};
pub use scene::{
    Color, DirectionalLight, LightScene, PointLight, SceneLights, SpotLight, Transform,
};
