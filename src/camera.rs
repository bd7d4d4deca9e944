//! Code to manage the camera.

use crate::{
    lin_alg::{Mat4, Vec3},
    types::{F32_SIZE, MAT4_SIZE},
};

pub const UP_VEC: Vec3 = Vec3::new(0., 1., 0.);

/// proj * view, the view's rotation inverse (for billboards), and position.
pub const CAM_UNIFORM_SIZE: usize = 2 * MAT4_SIZE + 4 * F32_SIZE;

/// A first-person camera, oriented with yaw and pitch. Angles are in degrees; a yaw of -90 looks
/// down -Z.
#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov_y: f32,  // Vertical field of view in radians.
    pub aspect: f32, // width / height.
    pub near: f32,
    pub far: f32,
    /// We store the projection matrix here since it only changes when we change the camera cfg.
    pub proj_mat: Mat4,
}

impl Camera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut result = Self {
            position,
            yaw,
            pitch,
            ..Default::default()
        };
        result.update_proj_mat();
        result
    }

    /// Run this whenever we change camera parameters like FOV and aspect ratio.
    pub fn update_proj_mat(&mut self) {
        self.proj_mat = Mat4::new_perspective_rh(self.fov_y, self.aspect, self.near, self.far);
    }

    /// Unit vector the camera points along.
    pub fn look_dir(&self) -> Vec3 {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());

        Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).to_normalized()
    }

    pub fn right_dir(&self) -> Vec3 {
        self.look_dir().cross(UP_VEC).to_normalized()
    }

    pub fn view_mat(&self) -> Mat4 {
        Mat4::new_look_at_rh(self.position, self.position + self.look_dir(), UP_VEC)
    }

    /// Camera-to-world transform. Used to attach models to the view, eg a held staff.
    pub fn view_mat_inv(&self) -> Mat4 {
        self.view_mat().inverse().unwrap_or_default()
    }

    /// Rotates a camera-facing quad. The transpose of the view's rotation is its inverse.
    pub fn billboard_mat(&self) -> Mat4 {
        self.view_mat().rotation_part().transpose()
    }

    pub fn to_bytes(&self) -> [u8; CAM_UNIFORM_SIZE] {
        let mut result = [0; CAM_UNIFORM_SIZE];

        let proj_view = self.proj_mat * self.view_mat();

        result[0..MAT4_SIZE].clone_from_slice(&proj_view.to_bytes());
        result[MAT4_SIZE..2 * MAT4_SIZE].clone_from_slice(&self.billboard_mat().to_bytes());
        result[2 * MAT4_SIZE..CAM_UNIFORM_SIZE].clone_from_slice(&self.position.to_bytes_uniform());

        result
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0., 2., 10.),
            yaw: -90.,
            pitch: 0.,
            fov_y: 45_f32.to_radians(),
            aspect: 4. / 3.,
            near: 0.1,
            far: 100.,
            proj_mat: Mat4::new_identity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn default_yaw_looks_down_negative_z() {
        let cam = Camera::new(Vec3::new(0., 3.5, 5.), -90., 0.);
        let look = cam.look_dir();

        assert_relative_eq!(look.x, 0., epsilon = 1e-6);
        assert_relative_eq!(look.y, 0., epsilon = 1e-6);
        assert_relative_eq!(look.z, -1., epsilon = 1e-6);

        let right = cam.right_dir();
        assert_relative_eq!(right.x, 1., epsilon = 1e-6);
    }

    #[test]
    fn view_inverse_recovers_position() {
        let cam = Camera::new(Vec3::new(3., 1.8, 15.), -60., 20.);
        let pos = cam.view_mat_inv().translation();

        assert_relative_eq!(pos.x, 3., epsilon = 1e-4);
        assert_relative_eq!(pos.y, 1.8, epsilon = 1e-4);
        assert_relative_eq!(pos.z, 15., epsilon = 1e-4);
    }
}
