//! GPU textures: material images, the depth buffer, and the shadow map.
//! https://sotrh.github.io/learn-wgpu/beginner/tutorial5-textures/

use image::RgbaImage;
use wgpu::{Device, Queue, SurfaceConfiguration};

use crate::{assets, system::DEPTH_FORMAT, types::TextureSource};

pub const SHADOW_MAP_SIZE: u32 = 2_048;

pub(crate) struct Texture {
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    /// Material textures repeat, so the ground can tile.
    pub fn from_image(device: &Device, queue: &Queue, img: &RgbaImage, label: &str) -> Self {
        let (width, height) = img.dimensions();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            img,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self { view, sampler }
    }

    /// Never fails; a missing or malformed file becomes its fallback color.
    pub fn from_source(device: &Device, queue: &Queue, source: &TextureSource) -> Self {
        match source {
            TextureSource::File { path, fallback } => {
                let img = assets::image_or_color(path, *fallback);
                Self::from_image(device, queue, &img, &path.to_string_lossy())
            }
            TextureSource::Color(color) => {
                Self::from_image(device, queue, &assets::solid_image(*color), "Solid color")
            }
        }
    }

    pub fn create_depth_texture(device: &Device, config: &SurfaceConfiguration, label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };

        Self::depth(device, size, label, None)
    }

    /// Depth target the light renders into, then sampled with a comparison sampler.
    pub fn create_shadow_map(device: &Device) -> Self {
        let size = wgpu::Extent3d {
            width: SHADOW_MAP_SIZE,
            height: SHADOW_MAP_SIZE,
            depth_or_array_layers: 1,
        };

        Self::depth(
            device,
            size,
            "Shadow map",
            Some(wgpu::CompareFunction::LessEqual),
        )
    }

    fn depth(
        device: &Device,
        size: wgpu::Extent3d,
        label: &str,
        compare: Option<wgpu::CompareFunction>,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare,
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        });

        Self { view, sampler }
    }
}
