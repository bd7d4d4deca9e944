//! Types shared between the engine and the demo programs: vertices, meshes, entities, and the scene.
//! https://sotrh.github.io/learn-wgpu/beginner/tutorial9-models/#rendering-a-mesh

use std::path::PathBuf;

use crate::{
    camera::Camera,
    lighting::Lighting,
    lin_alg::{Mat4, Vec3},
};

pub const F32_SIZE: usize = 4;

pub const VEC3_SIZE: usize = 3 * F32_SIZE;
pub const VEC4_SIZE: usize = 4 * F32_SIZE;
pub const MAT4_SIZE: usize = 16 * F32_SIZE;

pub const VERTEX_SIZE: usize = 2 * VEC3_SIZE + 2 * F32_SIZE;
pub const INSTANCE_SIZE: usize = MAT4_SIZE + 3 * VEC4_SIZE;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    /// Where the vertex is located in space
    pub position: [f32; 3],
    /// AKA UV mapping. https://en.wikipedia.org/wiki/UV_mapping
    pub tex_coords: [f32; 2],
    /// The direction the vertex normal is facing in
    pub normal: [f32; 3],
}

impl Vertex {
    pub fn new(position: [f32; 3], tex_coords: [f32; 2], normal: Vec3) -> Self {
        Self {
            position,
            tex_coords,
            normal: normal.into(),
        }
    }

    pub fn to_bytes(&self) -> [u8; VERTEX_SIZE] {
        let mut result = [0; VERTEX_SIZE];

        result[0..4].clone_from_slice(&self.position[0].to_le_bytes());
        result[4..8].clone_from_slice(&self.position[1].to_le_bytes());
        result[8..12].clone_from_slice(&self.position[2].to_le_bytes());
        result[12..16].clone_from_slice(&self.tex_coords[0].to_le_bytes());
        result[16..20].clone_from_slice(&self.tex_coords[1].to_le_bytes());
        result[20..24].clone_from_slice(&self.normal[0].to_le_bytes());
        result[24..28].clone_from_slice(&self.normal[1].to_le_bytes());
        result[28..32].clone_from_slice(&self.normal[2].to_le_bytes());

        result
    }

    /// Create the vertex buffer memory layout, for our vertices.
    pub(crate) fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: VERTEX_SIZE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Vertex position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Texture coordinates
                wgpu::VertexAttribute {
                    offset: VEC3_SIZE as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                // Normal vector
                wgpu::VertexAttribute {
                    offset: (VEC3_SIZE + 2 * F32_SIZE) as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Mesh - represents geometry. All meshes in a scene share one vertex buffer and one index buffer
/// on the GPU.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    /// Each consecutive triplet of indices defines a triangle.
    pub indices: Vec<u32>,
}

/// Where a texture comes from. Index into `Scene::textures` from `Entity::texture`.
#[derive(Clone, Debug)]
pub enum TextureSource {
    /// An image file. If it can't be loaded, a 1x1 texture of `fallback` is used instead.
    File { path: PathBuf, fallback: [u8; 4] },
    /// A 1x1 solid color.
    Color([u8; 4]),
}

/// Represents an entity in the world. This is not fundamental to the WGPU system.
#[derive(Clone, Debug)]
pub struct Entity {
    /// Index of the mesh this entity references.
    pub mesh: usize,
    /// Index into `Scene::textures`.
    pub texture: usize,
    /// Model matrix: translation, rotation, and scale (and shear, for the bleachers).
    pub transform: Mat4,
    /// Multiplies the texture color. Alpha below 1 blends.
    pub color: [f32; 4],
    /// RGB the fragment is pushed towards, and how far (0 - 1).
    pub flash: ([f32; 3], f32),
    /// 0 is fully lit; 1 ignores lighting.
    pub emissive: f32,
    pub casts_shadow: bool,
}

impl Default for Entity {
    fn default() -> Self {
        Self {
            mesh: 0,
            texture: 0,
            transform: Mat4::new_identity(),
            color: [1., 1., 1., 1.],
            flash: ([1., 0., 0.], 0.),
            emissive: 0.,
            casts_shadow: true,
        }
    }
}

impl Entity {
    pub fn new(mesh: usize, texture: usize, transform: Mat4) -> Self {
        Self {
            mesh,
            texture,
            transform,
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn with_flash(mut self, color: [f32; 3], strength: f32) -> Self {
        self.flash = (color, strength);
        self
    }

    pub fn with_emissive(mut self, emissive: f32) -> Self {
        self.emissive = emissive;
        self
    }

    pub fn no_shadow(mut self) -> Self {
        self.casts_shadow = false;
        self
    }

    pub(crate) fn to_instance(&self) -> Instance {
        Instance {
            model: self.transform,
            color: self.color,
            flash: [
                self.flash.0[0],
                self.flash.0[1],
                self.flash.0[2],
                self.flash.1.clamp(0., 1.),
            ],
            params: [self.emissive.clamp(0., 1.), 0., 0., 0.],
        }
    }
}

/// Per-entity data sent to the GPU.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Instance {
    pub model: Mat4,
    pub color: [f32; 4],
    pub flash: [f32; 4],
    /// x: emissive.
    pub params: [f32; 4],
}

impl Instance {
    pub fn to_bytes(&self) -> [u8; INSTANCE_SIZE] {
        let mut result = [0; INSTANCE_SIZE];

        result[0..MAT4_SIZE].clone_from_slice(&self.model.to_bytes());

        let tail = self.color.iter().chain(&self.flash).chain(&self.params);
        for (i, val) in tail.enumerate() {
            let start = MAT4_SIZE + i * F32_SIZE;
            result[start..start + F32_SIZE].clone_from_slice(&val.to_le_bytes());
        }

        result
    }

    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        const ATTRIBS: [wgpu::VertexAttribute; 7] = wgpu::vertex_attr_array![
            3 => Float32x4, 4 => Float32x4, 5 => Float32x4, 6 => Float32x4, // model
            7 => Float32x4, // color
            8 => Float32x4, // flash
            9 => Float32x4, // params
        ];

        wgpu::VertexBufferLayout {
            array_stride: INSTANCE_SIZE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBS,
        }
    }
}

/// Everything the engine draws. The app owns a copy through the render handler, and mutates
/// entities, the camera, and lighting each frame.
#[derive(Clone, Debug)]
pub struct Scene {
    pub meshes: Vec<Mesh>,
    pub textures: Vec<TextureSource>,
    pub entities: Vec<Entity>,
    pub camera: Camera,
    pub lighting: Lighting,
    pub background_color: (f32, f32, f32),
    pub window_title: String,
    pub window_size: (f32, f32),
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            meshes: Vec::new(),
            textures: vec![TextureSource::Color([255, 255, 255, 255])],
            entities: Vec::new(),
            camera: Default::default(),
            lighting: Default::default(),
            background_color: (0.5, 0.7, 1.0),
            window_title: "(Window title here)".to_owned(),
            window_size: (900., 600.),
        }
    }
}

/// Flags the app returns to tell the engine which GPU data to refresh.
#[derive(Clone, Copy, Debug, Default)]
pub struct EngineUpdates {
    pub meshes: bool,
    pub entities: bool,
    pub camera: bool,
    pub lighting: bool,
}

#[derive(Clone, Debug)]
pub struct InputSettings {
    /// Lock and hide the cursor, for mouse-look.
    pub grab_cursor: bool,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self { grab_cursor: true }
    }
}

#[derive(Clone, Debug, Default)]
pub struct UiSettings {
    pub icon_path: Option<String>,
}
