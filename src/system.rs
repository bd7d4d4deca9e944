//! GPU setup: instance, adapter, device, and the surface the window draws to. Also the engine's
//! top-level state, which the winit event loop drives.

use std::{sync::Arc, time::Instant};

use anyhow::Context;
use wgpu::{
    Adapter, Backends, Device, Features, Instance, InstanceDescriptor, PowerPreference, Queue,
    Surface, SurfaceConfiguration, TextureFormat,
};
use winit::{
    dpi::PhysicalSize,
    event_loop::{ControlFlow, EventLoop},
    window::Window,
};

use crate::{
    graphics::GraphicsState,
    gui::GuiState,
    input::InputsCommanded,
    texture::Texture,
    types::{EngineUpdates, InputSettings, Scene, UiSettings},
};

pub const COLOR_FORMAT: TextureFormat = TextureFormat::Bgra8UnormSrgb;
pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// The GPU handles that live as long as the window.
pub(crate) struct RenderState {
    pub size: PhysicalSize<u32>,
    pub surface: Surface<'static>, // Shares the window's lifetime, through the `Arc`.
    pub adapter: Adapter,
    pub device: Device,
    pub queue: Queue,
    pub surface_cfg: SurfaceConfiguration,
}

pub struct State<T: 'static, FRender, FGui>
where
    FRender: FnMut(&mut T, &mut Scene, &InputsCommanded, f32) -> EngineUpdates + 'static,
    FGui: FnMut(&mut T, &egui::Context, &mut Scene) -> EngineUpdates + 'static,
{
    pub instance: Instance,
    /// None until the window exists; set in `init`.
    pub(crate) render: Option<RenderState>,
    pub(crate) graphics: Option<GraphicsState>,
    pub(crate) gui: Option<GuiState>,
    pub user_state: T,
    pub render_handler: FRender,
    pub gui_handler: FGui,
    pub input_settings: InputSettings,
    pub ui_settings: UiSettings,
    /// Moved into `graphics` once the window exists.
    pub(crate) scene: Option<Scene>,
    pub(crate) inputs: InputsCommanded,
    pub(crate) cursor_grabbed: bool,
    pub last_render_time: Instant,
    /// A fatal error raised inside the event loop, returned from `run`.
    pub(crate) error: Option<anyhow::Error>,
}

impl<T: 'static, FRender, FGui> State<T, FRender, FGui>
where
    FRender: FnMut(&mut T, &mut Scene, &InputsCommanded, f32) -> EngineUpdates + 'static,
    FGui: FnMut(&mut T, &egui::Context, &mut Scene) -> EngineUpdates + 'static,
{
    /// Only the instance is created here. Everything tied to the window waits for `init`.
    pub(crate) fn new(
        scene: Scene,
        input_settings: InputSettings,
        ui_settings: UiSettings,
        user_state: T,
        render_handler: FRender,
        gui_handler: FGui,
    ) -> Self {
        let instance = Instance::new(InstanceDescriptor {
            backends: Backends::PRIMARY,
            ..Default::default()
        });

        Self {
            instance,
            render: None,
            graphics: None,
            gui: None,
            user_state,
            render_handler,
            gui_handler,
            input_settings,
            ui_settings,
            scene: Some(scene),
            inputs: Default::default(),
            cursor_grabbed: false,
            last_render_time: Instant::now(),
            error: None,
        }
    }

    /// Creates the surface, device, renderer, and HUD for a freshly created window.
    pub(crate) fn init(&mut self, window: Window) -> anyhow::Result<()> {
        log::info!("Initializing graphics and sys...");
        let window = Arc::new(window);

        let size = window.inner_size();

        // The surface is the part of the window that we draw to.
        let surface = self
            .instance
            .create_surface(window.clone())
            .context("Unable to create a drawing surface for the window")?;

        let (adapter, device, queue) = pollster::block_on(setup_async(&self.instance, &surface))?;

        let caps = surface.get_capabilities(&adapter);
        let format = if caps.formats.contains(&COLOR_FORMAT) {
            COLOR_FORMAT
        } else {
            caps.formats
                .iter()
                .copied()
                .find(TextureFormat::is_srgb)
                .or_else(|| caps.formats.first().copied())
                .context("The surface supports no texture formats")?
        };

        // https://docs.rs/wgpu/latest/wgpu/struct.SurfaceConfiguration.html
        let surface_cfg = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            // Note that `Fifo` locks FPS to the speed of the monitor.
            present_mode: wgpu::PresentMode::Fifo,
            desired_maximum_frame_latency: 2,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: Vec::new(),
        };

        surface.configure(&device, &surface_cfg);

        let scene = self
            .scene
            .take()
            .context("The renderer was already initialized")?;

        let graphics = GraphicsState::new(&device, &queue, &surface_cfg, scene, window.clone());

        self.gui = Some(GuiState::new(&window, &device, surface_cfg.format));

        self.render = Some(RenderState {
            size,
            surface,
            adapter,
            device,
            queue,
            surface_cfg,
        });
        self.graphics = Some(graphics);
        self.last_render_time = Instant::now();

        Ok(())
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let (Some(sys), Some(graphics)) = (self.render.as_mut(), self.graphics.as_mut()) else {
            return;
        };

        // Minimized.
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        log::debug!("Resizing to {}x{}", new_size.width, new_size.height);

        sys.size = new_size;
        sys.surface_cfg.width = new_size.width;
        sys.surface_cfg.height = new_size.height;
        sys.surface.configure(&sys.device, &sys.surface_cfg);

        graphics.depth_texture =
            Texture::create_depth_texture(&sys.device, &sys.surface_cfg, "Depth texture");

        graphics.scene.camera.aspect = new_size.width as f32 / new_size.height as f32;
        graphics.scene.camera.update_proj_mat();
        graphics.update_camera(&sys.queue);
    }

    pub(crate) fn adapter_info(&self) -> Option<wgpu::AdapterInfo> {
        self.render.as_ref().map(|r| r.adapter.get_info())
    }
}

/// Opens the window and runs the frame loop until it closes. Errors are fatal ones, eg no usable
/// GPU.
pub fn run<T: 'static, FRender, FGui>(
    user_state: T,
    scene: Scene,
    input_settings: InputSettings,
    ui_settings: UiSettings,
    render_handler: FRender,
    gui_handler: FGui,
) -> anyhow::Result<()>
where
    FRender: FnMut(&mut T, &mut Scene, &InputsCommanded, f32) -> EngineUpdates + 'static,
    FGui: FnMut(&mut T, &egui::Context, &mut Scene) -> EngineUpdates + 'static,
{
    log::debug!("UI settings: {ui_settings:?}");

    let mut state: State<T, FRender, FGui> = State::new(
        scene,
        input_settings,
        ui_settings,
        user_state,
        render_handler,
        gui_handler,
    );

    let event_loop = EventLoop::new().context("Unable to create the event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    event_loop
        .run_app(&mut state)
        .context("The event loop failed")?;

    match state.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Quarantine for the Async part of the API
async fn setup_async(
    instance: &Instance,
    surface: &Surface<'static>,
) -> anyhow::Result<(Adapter, Device, Queue)> {
    // The adapter is a handle to our actual graphics card.
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: PowerPreference::default(),
            compatible_surface: Some(surface),
            force_fallback_adapter: false,
        })
        .await
        .context("Unable to find a suitable GPU adapter")?;

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: None,
                required_features: Features::empty(),
                required_limits: Default::default(),
                memory_hints: Default::default(),
            },
            std::env::var("WGPU_TRACE")
                .ok()
                .as_ref()
                .map(std::path::Path::new),
        )
        .await
        .context("Unable to create a GPU device")?;

    Ok((adapter, device, queue))
}

/// Process engine updates from render or GUI handlers.
pub(crate) fn process_engine_updates(
    engine_updates: &EngineUpdates,
    g_state: &mut GraphicsState,
    device: &Device,
    queue: &Queue,
) {
    if engine_updates.meshes {
        g_state.setup_vertices_indices(device);
        g_state.setup_entities(device);
    }

    if engine_updates.entities {
        g_state.setup_entities(device);
    }

    if engine_updates.camera {
        g_state.update_camera(queue);
    }

    if engine_updates.lighting {
        g_state.update_lighting(queue);
    }
}
