//! Vectors and matrices, as used in 3d graphics. Similar to the `cgmath` and `glam` crates,
//! but with only what the demos need.
//! Matrices are column-major, right-handed, and project depth to 0..1 to match WGPU's clip space.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use crate::types::F32_SIZE;

const EPS: f32 = 0.0000001;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
/// A len-3 column vector
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<[f32; 3]> for Vec3 {
    fn from(v: [f32; 3]) -> Self {
        Self {
            x: v[0],
            y: v[1],
            z: v[2],
        }
    }
}

impl From<Vec3> for [f32; 3] {
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}

impl Add<Self> for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl AddAssign<Self> for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub<Self> for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

impl SubAssign<Self> for Vec3 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
            z: self.z * rhs,
        }
    }
}

impl Div<f32> for Vec3 {
    type Output = Self;

    fn div(self, rhs: f32) -> Self::Output {
        Self {
            x: self.x / rhs,
            y: self.y / rhs,
            z: self.z / rhs,
        }
    }
}

impl Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn new_zero() -> Self {
        Self {
            x: 0.,
            y: 0.,
            z: 0.,
        }
    }

    /// Calculates the Euclidean (L2) norm.
    pub fn magnitude(&self) -> f32 {
        (self.x.powi(2) + self.y.powi(2) + self.z.powi(2)).sqrt()
    }

    pub fn distance(&self, other: Self) -> f32 {
        (*self - other).magnitude()
    }

    /// Returns the normalised version of the vector. A zero-length vector is returned unchanged.
    pub fn to_normalized(self) -> Self {
        let mag = self.magnitude();
        if mag < EPS {
            return self;
        }
        self / mag
    }

    pub fn cross(&self, rhs: Self) -> Self {
        Self {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    pub fn dot(&self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Drops the vertical component; useful for movement and steering along the ground.
    pub fn ground_projected(&self) -> Self {
        Self::new(self.x, 0., self.z)
    }

    /// Uniforms pad vec3s to 16 bytes.
    pub fn to_bytes_uniform(&self) -> [u8; 16] {
        let mut result = [0; 16];

        result[0..4].clone_from_slice(&self.x.to_le_bytes());
        result[4..8].clone_from_slice(&self.y.to_le_bytes());
        result[8..12].clone_from_slice(&self.z.to_le_bytes());

        result
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn xyz(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// A 4x4 matrix. Data and operations are column-major.
pub struct Mat4 {
    pub data: [f32; 16],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::new_identity()
    }
}

impl Mat4 {
    pub fn new(data: [f32; 16]) -> Self {
        Self { data }
    }

    /// Field of view is in radians. Aspect is width / height.
    /// https://docs.rs/glam/latest/glam/f32/struct.Mat4.html#method.perspective_rh
    #[rustfmt::skip]
    pub fn new_perspective_rh(fov_y: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        let f = 1. / (fov_y / 2.).tan();
        let range_inv = 1. / (near - far);

        Self {
            data: [
                f / aspect_ratio, 0., 0., 0.,
                0., f, 0., 0.,
                0., 0., far * range_inv, -1.,
                0., 0., far * near * range_inv, 0.
            ]
        }
    }

    /// An orthographic projection, as used for directional-light shadow maps.
    #[rustfmt::skip]
    pub fn new_orthographic_rh(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let rcp_width = 1. / (right - left);
        let rcp_height = 1. / (top - bottom);
        let range_inv = 1. / (near - far);

        Self {
            data: [
                2. * rcp_width, 0., 0., 0.,
                0., 2. * rcp_height, 0., 0.,
                0., 0., range_inv, 0.,
                -(left + right) * rcp_width, -(top + bottom) * rcp_height, near * range_inv, 1.
            ]
        }
    }

    /// A view matrix looking from `eye` towards `target`.
    #[rustfmt::skip]
    pub fn new_look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let f = (target - eye).to_normalized();
        let s = f.cross(up).to_normalized();
        let u = s.cross(f);

        Self {
            data: [
                s.x, u.x, -f.x, 0.,
                s.y, u.y, -f.y, 0.,
                s.z, u.z, -f.z, 0.,
                -s.dot(eye), -u.dot(eye), f.dot(eye), 1.
            ]
        }
    }

    /// Rotation around the X axis, in radians.
    #[rustfmt::skip]
    pub fn new_rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            data: [
                1., 0., 0., 0.,
                0., c, s, 0.,
                0., -s, c, 0.,
                0., 0., 0., 1.
            ]
        }
    }

    /// Rotation around the Y axis, in radians.
    #[rustfmt::skip]
    pub fn new_rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            data: [
                c, 0., -s, 0.,
                0., 1., 0., 0.,
                s, 0., c, 0.,
                0., 0., 0., 1.
            ]
        }
    }

    /// Rotation around the Z axis, in radians.
    #[rustfmt::skip]
    pub fn new_rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            data: [
                c, s, 0., 0.,
                -s, c, 0., 0.,
                0., 0., 1., 0.,
                0., 0., 0., 1.
            ]
        }
    }

    pub fn new_scaler(scale: f32) -> Self {
        Self::new_scale(Vec3::new(scale, scale, scale))
    }

    #[rustfmt::skip]
    pub fn new_scale(scale: Vec3) -> Self {
        Self {
            data: [
                scale.x, 0., 0., 0.,
                0., scale.y, 0., 0.,
                0., 0., scale.z, 0.,
                0., 0., 0., 1.,
            ]
        }
    }

    #[rustfmt::skip]
    /// Create a translation matrix. Note that the matrix is 4x4, but it takes len-3 vectors -
    /// this is so we can compose it with other 4x4 matrices.
    pub fn new_translation(val: Vec3) -> Self {
        Self {
            data: [
                1., 0., 0., 0.,
                0., 1., 0., 0.,
                0., 0., 1., 0.,
                val.x, val.y, val.z, 1.
            ]
        }
    }

    #[rustfmt::skip]
    pub fn new_identity() -> Self {
        Self {
            data: [
                1., 0., 0., 0.,
                0., 1., 0., 0.,
                0., 0., 1., 0.,
                0., 0., 0., 1.,
            ]
        }
    }

    /// Element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[col * 4 + row]
    }

    pub fn set(&mut self, row: usize, col: usize, val: f32) {
        self.data[col * 4 + row] = val;
    }

    /// Transpose the matrix
    #[rustfmt::skip]
    pub fn transpose(&self) -> Self {
        let d = self.data; // code shortener.
        Self {
            data: [
                d[0], d[4], d[8], d[12],
                d[1], d[5], d[9], d[13],
                d[2], d[6], d[10], d[14],
                d[3], d[7], d[11], d[15]
            ]
        }
    }

    /// The upper-left 3x3 block, with no translation. The transpose of a view matrix's rotation
    /// turns a quad to face the camera.
    pub fn rotation_part(&self) -> Self {
        let mut result = *self;
        result.data[3] = 0.;
        result.data[7] = 0.;
        result.data[11] = 0.;
        result.data[12] = 0.;
        result.data[13] = 0.;
        result.data[14] = 0.;
        result.data[15] = 1.;
        result
    }

    /// The translation column.
    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.data[12], self.data[13], self.data[14])
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        let v = *self * Vec4::new(point.x, point.y, point.z, 1.);
        if (v.w - 1.).abs() > EPS && v.w.abs() > EPS {
            return v.xyz() / v.w;
        }
        v.xyz()
    }

    /// Cofactor expansion. Returns `None` for a singular matrix.
    pub fn inverse(&self) -> Option<Self> {
        let m = self.data;
        let mut inv = [0.; 16];

        inv[0] = m[5] * m[10] * m[15] - m[5] * m[11] * m[14] - m[9] * m[6] * m[15]
            + m[9] * m[7] * m[14]
            + m[13] * m[6] * m[11]
            - m[13] * m[7] * m[10];
        inv[4] = -m[4] * m[10] * m[15] + m[4] * m[11] * m[14] + m[8] * m[6] * m[15]
            - m[8] * m[7] * m[14]
            - m[12] * m[6] * m[11]
            + m[12] * m[7] * m[10];
        inv[8] = m[4] * m[9] * m[15] - m[4] * m[11] * m[13] - m[8] * m[5] * m[15]
            + m[8] * m[7] * m[13]
            + m[12] * m[5] * m[11]
            - m[12] * m[7] * m[9];
        inv[12] = -m[4] * m[9] * m[14] + m[4] * m[10] * m[13] + m[8] * m[5] * m[14]
            - m[8] * m[6] * m[13]
            - m[12] * m[5] * m[10]
            + m[12] * m[6] * m[9];
        inv[1] = -m[1] * m[10] * m[15] + m[1] * m[11] * m[14] + m[9] * m[2] * m[15]
            - m[9] * m[3] * m[14]
            - m[13] * m[2] * m[11]
            + m[13] * m[3] * m[10];
        inv[5] = m[0] * m[10] * m[15] - m[0] * m[11] * m[14] - m[8] * m[2] * m[15]
            + m[8] * m[3] * m[14]
            + m[12] * m[2] * m[11]
            - m[12] * m[3] * m[10];
        inv[9] = -m[0] * m[9] * m[15] + m[0] * m[11] * m[13] + m[8] * m[1] * m[15]
            - m[8] * m[3] * m[13]
            - m[12] * m[1] * m[11]
            + m[12] * m[3] * m[9];
        inv[13] = m[0] * m[9] * m[14] - m[0] * m[10] * m[13] - m[8] * m[1] * m[14]
            + m[8] * m[2] * m[13]
            + m[12] * m[1] * m[10]
            - m[12] * m[2] * m[9];
        inv[2] = m[1] * m[6] * m[15] - m[1] * m[7] * m[14] - m[5] * m[2] * m[15]
            + m[5] * m[3] * m[14]
            + m[13] * m[2] * m[7]
            - m[13] * m[3] * m[6];
        inv[6] = -m[0] * m[6] * m[15] + m[0] * m[7] * m[14] + m[4] * m[2] * m[15]
            - m[4] * m[3] * m[14]
            - m[12] * m[2] * m[7]
            + m[12] * m[3] * m[6];
        inv[10] = m[0] * m[5] * m[15] - m[0] * m[7] * m[13] - m[4] * m[1] * m[15]
            + m[4] * m[3] * m[13]
            + m[12] * m[1] * m[7]
            - m[12] * m[3] * m[5];
        inv[14] = -m[0] * m[5] * m[14] + m[0] * m[6] * m[13] + m[4] * m[1] * m[14]
            - m[4] * m[2] * m[13]
            - m[12] * m[1] * m[6]
            + m[12] * m[2] * m[5];
        inv[3] = -m[1] * m[6] * m[11] + m[1] * m[7] * m[10] + m[5] * m[2] * m[11]
            - m[5] * m[3] * m[10]
            - m[9] * m[2] * m[7]
            + m[9] * m[3] * m[6];
        inv[7] = m[0] * m[6] * m[11] - m[0] * m[7] * m[10] - m[4] * m[2] * m[11]
            + m[4] * m[3] * m[10]
            + m[8] * m[2] * m[7]
            - m[8] * m[3] * m[6];
        inv[11] = -m[0] * m[5] * m[11] + m[0] * m[7] * m[9] + m[4] * m[1] * m[11]
            - m[4] * m[3] * m[9]
            - m[8] * m[1] * m[7]
            + m[8] * m[3] * m[5];
        inv[15] = m[0] * m[5] * m[10] - m[0] * m[6] * m[9] - m[4] * m[1] * m[10]
            + m[4] * m[2] * m[9]
            + m[8] * m[1] * m[6]
            - m[8] * m[2] * m[5];

        let det = m[0] * inv[0] + m[1] * inv[4] + m[2] * inv[8] + m[3] * inv[12];
        if det.abs() < EPS {
            return None;
        }

        let det_inv = 1. / det;
        for v in inv.iter_mut() {
            *v *= det_inv;
        }

        Some(Self { data: inv })
    }

    pub fn to_bytes(&self) -> [u8; 16 * F32_SIZE] {
        let mut result = [0; 16 * F32_SIZE];

        for (i, val) in self.data.iter().enumerate() {
            result[i * 4..i * 4 + 4].clone_from_slice(&val.to_le_bytes());
        }

        result
    }
}

impl Mul<Self> for Mat4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        let a = self.data; // code shortener
        let b = rhs.data;
        let mut data = [0.; 16];

        for col in 0..4 {
            for row in 0..4 {
                data[col * 4 + row] = a[row] * b[col * 4]
                    + a[4 + row] * b[col * 4 + 1]
                    + a[8 + row] * b[col * 4 + 2]
                    + a[12 + row] * b[col * 4 + 3];
            }
        }

        Self { data }
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    fn mul(self, rhs: Vec4) -> Self::Output {
        let d = self.data;
        Vec4 {
            x: rhs.x * d[0] + rhs.y * d[4] + rhs.z * d[8] + rhs.w * d[12],
            y: rhs.x * d[1] + rhs.y * d[5] + rhs.z * d[9] + rhs.w * d[13],
            z: rhs.x * d[2] + rhs.y * d[6] + rhs.z * d[10] + rhs.w * d[14],
            w: rhs.x * d[3] + rhs.y * d[7] + rhs.z * d[11] + rhs.w * d[15],
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert_relative_eq!(a.x, b.x, epsilon = 1e-4);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-4);
        assert_relative_eq!(a.z, b.z, epsilon = 1e-4);
    }

    #[test]
    fn translation_then_scale_order() {
        let m = Mat4::new_translation(Vec3::new(1., 2., 3.)) * Mat4::new_scaler(2.);
        assert_vec_eq(m.transform_point(Vec3::new(1., 1., 1.)), Vec3::new(3., 4., 5.));
    }

    #[test]
    fn rotation_y_quarter_turn() {
        let m = Mat4::new_rotation_y(std::f32::consts::FRAC_PI_2);
        // Counter-clockwise, looking down from +Y.
        assert_vec_eq(m.transform_point(Vec3::new(1., 0., 0.)), Vec3::new(0., 0., -1.));
    }

    #[test]
    fn look_at_puts_target_down_negative_z() {
        let eye = Vec3::new(0., 3.5, 5.);
        let view = Mat4::new_look_at_rh(eye, Vec3::new(0., 3.5, 0.), Vec3::new(0., 1., 0.));

        assert_vec_eq(view.transform_point(eye), Vec3::new_zero());
        assert_vec_eq(
            view.transform_point(Vec3::new(0., 3.5, 0.)),
            Vec3::new(0., 0., -5.),
        );
    }

    #[test]
    fn orthographic_maps_near_far_to_unit_depth() {
        let proj = Mat4::new_orthographic_rh(-20., 20., -20., 20., 1., 50.);

        assert_relative_eq!(proj.transform_point(Vec3::new(0., 0., -1.)).z, 0., epsilon = 1e-6);
        assert_relative_eq!(proj.transform_point(Vec3::new(0., 0., -50.)).z, 1., epsilon = 1e-6);
        assert_relative_eq!(proj.transform_point(Vec3::new(20., 0., -5.)).x, 1., epsilon = 1e-6);
    }

    #[test]
    fn perspective_depth_range() {
        let proj = Mat4::new_perspective_rh(45_f32.to_radians(), 1.5, 0.1, 100.);

        assert_relative_eq!(proj.transform_point(Vec3::new(0., 0., -0.1)).z, 0., epsilon = 1e-5);
        assert_relative_eq!(proj.transform_point(Vec3::new(0., 0., -100.)).z, 1., epsilon = 1e-5);
    }

    #[test]
    fn inverse_round_trip() {
        let m = Mat4::new_translation(Vec3::new(4., -2., 7.))
            * Mat4::new_rotation_y(1.1)
            * Mat4::new_rotation_x(0.3)
            * Mat4::new_rotation_z(-0.4)
            * Mat4::new_scale(Vec3::new(2., 3., 0.5));

        let inv = m.inverse().unwrap();
        let ident = m * inv;

        for (a, b) in ident.data.iter().zip(Mat4::new_identity().data.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-4);
        }
    }

    #[test]
    fn singular_has_no_inverse() {
        assert!(Mat4::new_scaler(0.).inverse().is_none());
    }
}
