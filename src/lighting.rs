//! Scene lighting: ambient, one directional "sun" that casts the shadow map, and a small
//! fixed-capacity set of point lights.

use crate::{
    lin_alg::{Mat4, Vec3},
    types::{F32_SIZE, MAT4_SIZE, VEC4_SIZE},
};

/// The shader's point light array has this capacity; extras are dropped.
pub const MAX_POINT_LIGHTS: usize = 10;

pub const POINT_LIGHT_SIZE: usize = 2 * VEC4_SIZE;
pub const LIGHTING_SIZE: usize = MAT4_SIZE + 4 * VEC4_SIZE + MAX_POINT_LIGHTS * POINT_LIGHT_SIZE;

/// Point light falloff with distance. Must match `attenuation` in `shader.wgsl`.
pub fn attenuation(intensity: f32, dist: f32) -> f32 {
    intensity / (1. + 0.1 * dist + 0.02 * dist * dist)
}

/// An orthographic light used to render the shadow map.
#[derive(Clone, Debug)]
pub struct ShadowCaster {
    pub position: Vec3,
    pub target: Vec3,
    /// Half the width and height of the light's box.
    pub half_extent: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ShadowCaster {
    fn default() -> Self {
        Self {
            position: Vec3::new(10., 20., 10.),
            target: Vec3::new_zero(),
            half_extent: 20.,
            near: 1.,
            far: 50.,
        }
    }
}

impl ShadowCaster {
    /// Light-space matrix: world to the shadow map's clip space.
    pub fn matrix(&self) -> Mat4 {
        let e = self.half_extent;
        let proj = Mat4::new_orthographic_rh(-e, e, -e, e, self.near, self.far);

        // Looking straight down would make `up` parallel to the view direction.
        let dir = (self.target - self.position).to_normalized();
        let up = if dir.cross(Vec3::new(0., 1., 0.)).magnitude() < 0.001 {
            Vec3::new(0., 0., -1.)
        } else {
            Vec3::new(0., 1., 0.)
        };

        proj * Mat4::new_look_at_rh(self.position, self.target, up)
    }
}

#[derive(Clone, Debug)]
pub struct Sun {
    /// The direction light travels in.
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for Sun {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-0.5, -1., -0.5).to_normalized(),
            color: Vec3::new(1., 1., 1.),
            intensity: 1.,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl PointLight {
    pub fn new(position: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            position,
            color,
            intensity,
        }
    }

    pub fn to_bytes(&self) -> [u8; POINT_LIGHT_SIZE] {
        let mut result = [0; POINT_LIGHT_SIZE];

        result[0..16].clone_from_slice(&self.position.to_bytes_uniform());
        result[16..28].clone_from_slice(&self.color.to_bytes_uniform()[0..12]);
        result[28..32].clone_from_slice(&self.intensity.to_le_bytes());

        result
    }
}

#[derive(Clone, Debug)]
pub struct Lighting {
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
    pub sun: Sun,
    pub shadow: ShadowCaster,
    pub point_lights: Vec<PointLight>,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient_color: Vec3::new(1., 1., 1.),
            ambient_intensity: 0.2,
            sun: Default::default(),
            shadow: Default::default(),
            point_lights: Vec::new(),
        }
    }
}

impl Lighting {
    pub fn to_bytes(&self) -> [u8; LIGHTING_SIZE] {
        let mut result = [0; LIGHTING_SIZE];

        result[0..MAT4_SIZE].clone_from_slice(&self.shadow.matrix().to_bytes());

        let mut i = MAT4_SIZE;
        let ambient = self.ambient_color * self.ambient_intensity;
        result[i..i + 16].clone_from_slice(&ambient.to_bytes_uniform());
        i += VEC4_SIZE;

        result[i..i + 16].clone_from_slice(&self.sun.direction.to_normalized().to_bytes_uniform());
        i += VEC4_SIZE;

        result[i..i + 16].clone_from_slice(&self.sun.color.to_bytes_uniform());
        result[i + 12..i + 16].clone_from_slice(&self.sun.intensity.to_le_bytes());
        i += VEC4_SIZE;

        let count = self.point_lights.len().min(MAX_POINT_LIGHTS) as u32;
        result[i..i + F32_SIZE].clone_from_slice(&count.to_le_bytes());
        i += VEC4_SIZE;

        for light in self.point_lights.iter().take(MAX_POINT_LIGHTS) {
            result[i..i + POINT_LIGHT_SIZE].clone_from_slice(&light.to_bytes());
            i += POINT_LIGHT_SIZE;
        }

        result
    }
}
