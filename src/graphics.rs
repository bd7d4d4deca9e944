//! This module contains code specific to the WGPU library: buffers, bind groups, pipelines, and
//! the per-frame passes (shadow map, lit scene, then the GUI on top).
//! https://sotrh.github.io/learn-wgpu/
//! https://github.com/gfx-rs/wgpu/tree/trunk/examples/src/shadow

use std::sync::Arc;

use wgpu::{self, util::DeviceExt, BindGroup, BindGroupLayout, Device, Queue, SurfaceConfiguration};
use winit::window::Window;

use crate::{
    gui::GuiState,
    system::{process_engine_updates, DEPTH_FORMAT},
    texture::Texture,
    types::{EngineUpdates, Instance, Scene, Vertex, INSTANCE_SIZE},
};

/// Where one mesh sits in the shared vertex and index buffers.
#[derive(Clone, Copy, Debug)]
struct MeshRange {
    index_start: u32,
    index_count: u32,
    base_vertex: i32,
}

pub(crate) struct GraphicsState {
    vertex_buf: wgpu::Buffer,
    index_buf: wgpu::Buffer,
    instance_buf: wgpu::Buffer,
    camera_buf: wgpu::Buffer,
    lighting_buf: wgpu::Buffer,
    bind_groups: BindGroupData,
    /// One per `Scene::textures` entry.
    textures: Vec<BindGroup>,
    pipeline: wgpu::RenderPipeline,
    pipeline_shadow: wgpu::RenderPipeline,
    pub depth_texture: Texture,
    shadow_map: Texture,
    mesh_ranges: Vec<MeshRange>,
    pub scene: Scene,
    pub window: Arc<Window>,
}

impl GraphicsState {
    pub(crate) fn new(
        device: &Device,
        queue: &Queue,
        surface_cfg: &SurfaceConfiguration,
        mut scene: Scene,
        window: Arc<Window>,
    ) -> Self {
        scene.camera.aspect = surface_cfg.width as f32 / surface_cfg.height.max(1) as f32;
        scene.camera.update_proj_mat();

        let camera_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera buffer"),
            contents: &scene.camera.to_bytes(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // Fixed size: the point light array has a fixed capacity.
        let lighting_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Lighting buffer"),
            contents: &scene.lighting.to_bytes(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let shadow_map = Texture::create_shadow_map(device);
        let bind_groups = create_bindgroups(device, &camera_buf, &lighting_buf, &shadow_map);

        let textures = scene
            .textures
            .iter()
            .map(|source| {
                let tex = Texture::from_source(device, queue, source);
                create_texture_bindgroup(device, &bind_groups.layout_texture, &tex)
            })
            .collect();

        let depth_texture = Texture::create_depth_texture(device, surface_cfg, "Depth texture");

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let shader_shadow = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shadow shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader_shadow.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render pipeline layout"),
            bind_group_layouts: &[
                &bind_groups.layout_cam,
                &bind_groups.layout_lighting,
                &bind_groups.layout_texture,
            ],
            push_constant_ranges: &[],
        });

        let shadow_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow pipeline layout"),
            bind_group_layouts: &[&bind_groups.layout_shadow],
            push_constant_ranges: &[],
        });

        let pipeline = create_render_pipeline(device, &pipeline_layout, &shader, surface_cfg);
        let pipeline_shadow = create_shadow_pipeline(device, &shadow_layout, &shader_shadow);

        let instance_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instance buffer"),
            contents: &[],
            usage: wgpu::BufferUsages::VERTEX,
        });

        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex buffer"),
            contents: &[],
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index buffer"),
            contents: &[],
            usage: wgpu::BufferUsages::INDEX,
        });

        let mut result = Self {
            vertex_buf,
            index_buf,
            instance_buf,
            camera_buf,
            lighting_buf,
            bind_groups,
            textures,
            pipeline,
            pipeline_shadow,
            depth_texture,
            shadow_map,
            mesh_ranges: Vec::new(),
            scene,
            window,
        };

        result.setup_vertices_indices(device);
        result.setup_entities(device);

        log::info!(
            "Graphics ready: {} meshes, {} textures, {} entities",
            result.scene.meshes.len(),
            result.textures.len(),
            result.scene.entities.len()
        );

        result
    }

    /// Concatenates every mesh into one vertex and one index buffer.
    pub(crate) fn setup_vertices_indices(&mut self, device: &Device) {
        let mut vertex_data = Vec::new();
        let mut index_data = Vec::new();
        let mut mesh_ranges = Vec::with_capacity(self.scene.meshes.len());

        let mut vertex_start = 0;
        let mut index_start = 0;

        for mesh in &self.scene.meshes {
            for vertex in &mesh.vertices {
                vertex_data.extend_from_slice(&vertex.to_bytes());
            }
            for index in &mesh.indices {
                index_data.extend_from_slice(&index.to_le_bytes());
            }

            mesh_ranges.push(MeshRange {
                index_start,
                index_count: mesh.indices.len() as u32,
                base_vertex: vertex_start,
            });

            vertex_start += mesh.vertices.len() as i32;
            index_start += mesh.indices.len() as u32;
        }

        // We can't update using a queue due to buffer size mismatches.
        self.vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex buffer"),
            contents: &vertex_data,
            usage: wgpu::BufferUsages::VERTEX,
        });

        self.index_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index buffer"),
            contents: &index_data,
            usage: wgpu::BufferUsages::INDEX,
        });

        self.mesh_ranges = mesh_ranges;
    }

    /// One instance per entity, in entity order. Drawing follows the same order, so later
    /// entities blend over earlier ones.
    pub(crate) fn setup_entities(&mut self, device: &Device) {
        let mut instance_data = Vec::with_capacity(self.scene.entities.len() * INSTANCE_SIZE);
        for entity in &self.scene.entities {
            let instance: Instance = entity.to_instance();
            instance_data.extend_from_slice(&instance.to_bytes());
        }

        self.instance_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instance buffer"),
            contents: &instance_data,
            usage: wgpu::BufferUsages::VERTEX,
        });
    }

    pub(crate) fn update_camera(&mut self, queue: &Queue) {
        queue.write_buffer(&self.camera_buf, 0, &self.scene.camera.to_bytes());
    }

    pub(crate) fn update_lighting(&mut self, queue: &Queue) {
        queue.write_buffer(&self.lighting_buf, 0, &self.scene.lighting.to_bytes());
    }

    /// Draw calls for each entity whose mesh exists, with its instance index.
    fn draws(&self) -> impl Iterator<Item = (usize, MeshRange, u32)> + '_ {
        self.scene
            .entities
            .iter()
            .enumerate()
            .filter_map(|(i, entity)| {
                self.mesh_ranges
                    .get(entity.mesh)
                    .map(|range| (i, *range, entity.texture as u32))
            })
    }

    pub(crate) fn render<T>(
        &mut self,
        gui: &mut GuiState,
        output_frame: wgpu::SurfaceTexture,
        device: &Device,
        queue: &Queue,
        width: u32,
        height: u32,
        user_state: &mut T,
        gui_handler: &mut impl FnMut(&mut T, &egui::Context, &mut Scene) -> EngineUpdates,
    ) {
        let output_view = output_frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.pipeline_shadow);
            pass.set_bind_group(0, &self.bind_groups.shadow, &[]);
            pass.set_vertex_buffer(0, self.vertex_buf.slice(..));
            pass.set_vertex_buffer(1, self.instance_buf.slice(..));
            pass.set_index_buffer(self.index_buf.slice(..), wgpu::IndexFormat::Uint32);

            for (i, range, _) in self.draws() {
                if !self.scene.entities[i].casts_shadow {
                    continue;
                }
                let i = i as u32;
                pass.draw_indexed(
                    range.index_start..range.index_start + range.index_count,
                    range.base_vertex,
                    i..i + 1,
                );
            }
        }

        {
            let (r, g, b) = self.scene.background_color;

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &output_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_groups.cam, &[]);
            pass.set_bind_group(1, &self.bind_groups.lighting, &[]);
            pass.set_vertex_buffer(0, self.vertex_buf.slice(..));
            pass.set_vertex_buffer(1, self.instance_buf.slice(..));
            pass.set_index_buffer(self.index_buf.slice(..), wgpu::IndexFormat::Uint32);

            for (i, range, texture) in self.draws() {
                // An out-of-range texture index draws with the first (white) texture.
                let tex_bg = self
                    .textures
                    .get(texture as usize)
                    .or_else(|| self.textures.first());
                let Some(tex_bg) = tex_bg else {
                    continue;
                };

                pass.set_bind_group(2, tex_bg, &[]);
                let i = i as u32;
                pass.draw_indexed(
                    range.index_start..range.index_start + range.index_count,
                    range.base_vertex,
                    i..i + 1,
                );
            }
        }

        let (gui_cmds, updates) = gui.render(
            &self.window,
            device,
            queue,
            &mut encoder,
            &output_view,
            width,
            height,
            user_state,
            gui_handler,
            &mut self.scene,
        );

        // Applied before submitting, so HUD-driven changes show this frame.
        process_engine_updates(&updates, self, device, queue);

        queue.submit(gui_cmds.into_iter().chain(std::iter::once(encoder.finish())));
        output_frame.present();
    }
}

fn create_render_pipeline(
    device: &Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    config: &SurfaceConfiguration,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Render pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            compilation_options: Default::default(),
            buffers: &[Vertex::desc(), Instance::desc()],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: config.format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // OBJ models don't reliably wind their faces; the sky dome faces inward.
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Depth only. Culls front faces, and biases depth, to keep surfaces from shadowing themselves.
fn create_shadow_pipeline(
    device: &Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Shadow pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            compilation_options: Default::default(),
            buffers: &[Vertex::desc(), Instance::desc()],
        },
        fragment: None,
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Front),
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState {
                constant: 2,
                slope_scale: 2.0,
                clamp: 0.0,
            },
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

pub(crate) struct BindGroupData {
    pub layout_cam: BindGroupLayout,
    pub cam: BindGroup,
    pub layout_lighting: BindGroupLayout,
    /// Lighting uniform, the shadow map, and its comparison sampler.
    pub lighting: BindGroup,
    pub layout_shadow: BindGroupLayout,
    /// Just the lighting uniform, for the light-space matrix.
    pub shadow: BindGroup,
    pub layout_texture: BindGroupLayout,
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_bindgroups(
    device: &Device,
    cam_buf: &wgpu::Buffer,
    lighting_buf: &wgpu::Buffer,
    shadow_map: &Texture,
) -> BindGroupData {
    let vert_frag = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;

    let layout_cam = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[uniform_entry(0, vert_frag)],
        label: Some("Camera bind group layout"),
    });

    let cam = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &layout_cam,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: cam_buf.as_entire_binding(),
        }],
        label: Some("Camera bind group"),
    });

    let layout_lighting = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            uniform_entry(0, vert_frag),
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Depth,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                count: None,
            },
        ],
        label: Some("Lighting bind group layout"),
    });

    let lighting = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &layout_lighting,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: lighting_buf.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&shadow_map.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&shadow_map.sampler),
            },
        ],
        label: Some("Lighting bind group"),
    });

    let layout_shadow = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        label: Some("Shadow bind group layout"),
    });

    let shadow = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &layout_shadow,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: lighting_buf.as_entire_binding(),
        }],
        label: Some("Shadow bind group"),
    });

    let layout_texture = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Texture bind group layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    BindGroupData {
        layout_cam,
        cam,
        layout_lighting,
        lighting,
        layout_shadow,
        shadow,
        layout_texture,
    }
}

fn create_texture_bindgroup(device: &Device, layout: &BindGroupLayout, tex: &Texture) -> BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&tex.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&tex.sampler),
            },
        ],
        label: Some("Texture bind group"),
    })
}
