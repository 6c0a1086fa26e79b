//! Frustum planes extracted from a view-projection matrix.

use crate::math::{dot, Float3, Mat4};

/// A plane `a*x + b*y + c*z + d = 0` with a unit normal pointing inwards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Plane {
    /// Normal X component.
    pub a: f32,
    /// Normal Y component.
    pub b: f32,
    /// Normal Z component.
    pub c: f32,
    /// Distance from origin.
    pub d: f32,
}

impl Plane {
    /// Creates a new plane.
    #[must_use]
    pub const fn new(a: f32, b: f32, c: f32, d: f32) -> Self {
        Self { a, b, c, d }
    }

    /// Normalizes the plane.
    #[must_use]
    pub fn normalized(self) -> Self {
        let len = (self.a * self.a + self.b * self.b + self.c * self.c).sqrt();
        if len > 0.0 {
            Self {
                a: self.a / len,
                b: self.b / len,
                c: self.c / len,
                d: self.d / len,
            }
        } else {
            self
        }
    }

    /// Plane normal.
    #[inline]
    #[must_use]
    pub const fn normal(&self) -> Float3 {
        [self.a, self.b, self.c]
    }

    /// Signed distance from a point to the plane, positive inside.
    #[inline]
    #[must_use]
    pub fn distance_to_point(&self, p: Float3) -> f32 {
        dot(self.normal(), p) + self.d
    }

    /// Row `r` of `m`, as plane coefficients.
    fn row(m: &Mat4, r: usize) -> [f32; 4] {
        [m[0][r], m[1][r], m[2][r], m[3][r]]
    }

    fn combine(a: [f32; 4], b: [f32; 4], sign: f32) -> Self {
        Self::new(
            a[0] + sign * b[0],
            a[1] + sign * b[1],
            a[2] + sign * b[2],
            a[3] + sign * b[3],
        )
        .normalized()
    }
}

/// View frustum for culling.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frustum {
    /// Left, right, bottom, top, near, far planes.
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Left plane index.
    pub const LEFT: usize = 0;
    /// Right plane index.
    pub const RIGHT: usize = 1;
    /// Bottom plane index.
    pub const BOTTOM: usize = 2;
    /// Top plane index.
    pub const TOP: usize = 3;
    /// Near plane index.
    pub const NEAR: usize = 4;
    /// Far plane index.
    pub const FAR: usize = 5;

    /// Extracts frustum planes from a view-projection matrix.
    ///
    /// The matrix is column-major and maps depth to `[0, 1]`, so the near
    /// plane is row 2 alone rather than `row3 + row2`.
    #[must_use]
    pub fn from_view_projection(m: &Mat4) -> Self {
        let row0 = Plane::row(m, 0);
        let row1 = Plane::row(m, 1);
        let row2 = Plane::row(m, 2);
        let row3 = Plane::row(m, 3);

        let mut planes = [Plane::default(); 6];
        planes[Self::LEFT] = Plane::combine(row3, row0, 1.0);
        planes[Self::RIGHT] = Plane::combine(row3, row0, -1.0);
        planes[Self::BOTTOM] = Plane::combine(row3, row1, 1.0);
        planes[Self::TOP] = Plane::combine(row3, row1, -1.0);
        planes[Self::NEAR] = Plane::combine(row2, [0.0; 4], 0.0);
        planes[Self::FAR] = Plane::combine(row3, row2, -1.0);

        Self { planes }
    }

    /// Tests if a sphere intersects the frustum.
    #[must_use]
    pub fn test_sphere(&self, center: Float3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(center) >= -radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::perspective;

    #[test]
    fn test_plane_normalization() {
        let plane = Plane::new(3.0, 4.0, 0.0, 10.0);
        let normalized = plane.normalized();

        // 3-4-5 triangle, so length is 5
        assert!((normalized.a - 0.6).abs() < 0.001);
        assert!((normalized.b - 0.8).abs() < 0.001);
        assert!((normalized.d - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_near_and_far_planes() {
        let frustum =
            Frustum::from_view_projection(&perspective(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0));

        let near = frustum.planes[Frustum::NEAR];
        assert!((near.distance_to_point([0.0, 0.0, 0.1])).abs() < 1e-4);
        assert!(near.distance_to_point([0.0, 0.0, 1.0]) > 0.0);

        let far = frustum.planes[Frustum::FAR];
        assert!((far.distance_to_point([0.0, 0.0, 100.0])).abs() < 1e-3);
        assert!(far.distance_to_point([0.0, 0.0, 50.0]) > 0.0);
    }

    #[test]
    fn test_sphere_inside_and_outside() {
        let frustum =
            Frustum::from_view_projection(&perspective(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0));

        assert!(frustum.test_sphere([0.0, 0.0, 50.0], 0.0));
        assert!(!frustum.test_sphere([0.0, 0.0, -5.0], 1.0));
        // 90 degree fov: x = z is the right edge.
        assert!(!frustum.test_sphere([20.0, 0.0, 10.0], 1.0));
        assert!(frustum.test_sphere([10.5, 0.0, 10.0], 1.0));
    }
}
