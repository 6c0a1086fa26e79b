//! Visibility culling of lights against the camera frustum.

mod frustum;
mod visibility;

pub use frustum::{Frustum, Plane};
pub use visibility::{cull_spheres, LANES};
