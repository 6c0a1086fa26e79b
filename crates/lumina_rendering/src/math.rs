//! Small vector and matrix helpers.
//!
//! Matrices are column-major `[[f32; 4]; 4]` (`m[column][row]`) and act on
//! column vectors: `clip = projection * view * position`. View space looks
//! down +Z and projections map depth to `[0, 1]`.

/// 3-component vector.
pub type Float3 = [f32; 3];

/// Column-major 4x4 matrix.
pub type Mat4 = [[f32; 4]; 4];

/// Identity matrix.
pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Dot product.
#[inline]
#[must_use]
pub fn dot(a: Float3, b: Float3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Component-wise `a - b`.
#[inline]
#[must_use]
pub fn sub(a: Float3, b: Float3) -> Float3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Component-wise `a * s`.
#[inline]
#[must_use]
pub fn scale(a: Float3, s: f32) -> Float3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

/// Cross product.
#[inline]
#[must_use]
pub fn cross(a: Float3, b: Float3) -> Float3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Euclidean length.
#[inline]
#[must_use]
pub fn length(a: Float3) -> f32 {
    dot(a, a).sqrt()
}

/// Unit vector along `a`, or `a` unchanged if it has zero length.
#[must_use]
pub fn normalize(a: Float3) -> Float3 {
    let len = length(a);
    if len > 0.0 {
        scale(a, 1.0 / len)
    } else {
        a
    }
}

/// Matrix product `a * b`.
#[must_use]
pub fn mul(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = [[0.0; 4]; 4];
    for (column, out_column) in out.iter_mut().enumerate() {
        for (row, value) in out_column.iter_mut().enumerate() {
            *value = (0..4).map(|k| a[k][row] * b[column][k]).sum();
        }
    }
    out
}

/// Transforms a point (w = 1).
#[must_use]
pub fn transform_point(m: &Mat4, p: Float3) -> Float3 {
    [
        m[0][0] * p[0] + m[1][0] * p[1] + m[2][0] * p[2] + m[3][0],
        m[0][1] * p[0] + m[1][1] * p[1] + m[2][1] * p[2] + m[3][1],
        m[0][2] * p[0] + m[1][2] * p[1] + m[2][2] * p[2] + m[3][2],
    ]
}

/// Transforms a direction (w = 0).
#[must_use]
pub fn transform_vector(m: &Mat4, v: Float3) -> Float3 {
    [
        m[0][0] * v[0] + m[1][0] * v[1] + m[2][0] * v[2],
        m[0][1] * v[0] + m[1][1] * v[1] + m[2][1] * v[2],
        m[0][2] * v[0] + m[1][2] * v[1] + m[2][2] * v[2],
    ]
}

/// Rotates `v` by the unit quaternion `q = [x, y, z, w]`.
#[must_use]
pub fn rotate(q: [f32; 4], v: Float3) -> Float3 {
    let axis = [q[0], q[1], q[2]];
    let t = scale(cross(axis, v), 2.0);
    let u = cross(axis, t);
    [
        v[0] + q[3] * t[0] + u[0],
        v[1] + q[3] * t[1] + u[1],
        v[2] + q[3] * t[2] + u[2],
    ]
}

/// Left-handed perspective projection with `[0, 1]` depth.
#[must_use]
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let y_scale = 1.0 / (fov_y * 0.5).tan();
    let x_scale = y_scale / aspect;
    let depth = far - near;
    [
        [x_scale, 0.0, 0.0, 0.0],
        [0.0, y_scale, 0.0, 0.0],
        [0.0, 0.0, far / depth, 1.0],
        [0.0, 0.0, -near * far / depth, 0.0],
    ]
}

/// Translation matrix.
#[must_use]
pub fn translation(offset: Float3) -> Mat4 {
    let mut m = IDENTITY;
    m[3] = [offset[0], offset[1], offset[2], 1.0];
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perspective_maps_near_and_far() {
        let proj = perspective(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        let clip_z = |z: f32| (proj[2][2] * z + proj[3][2]) / z;

        assert!(clip_z(0.1).abs() < 1e-5);
        assert!((clip_z(100.0) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_mul_translation() {
        let m = mul(&translation([1.0, 2.0, 3.0]), &translation([1.0, 1.0, 1.0]));
        assert_eq!(transform_point(&m, [0.0, 0.0, 0.0]), [2.0, 3.0, 4.0]);
        assert_eq!(transform_vector(&m, [1.0, 0.0, 0.0]), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_rotate_quarter_turn_about_y() {
        let half = std::f32::consts::FRAC_PI_4;
        let q = [0.0, half.sin(), 0.0, half.cos()];
        let v = rotate(q, [0.0, 0.0, 1.0]);

        assert!((v[0] - 1.0).abs() < 1e-5);
        assert!(v[2].abs() < 1e-5);
    }
}
