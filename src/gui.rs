//! GUI code for EGUI, to run on the WGPU painter. The app draws its HUD through `gui_handler`; we
//! paint it over the scene in its own pass.
//! See [this unofficial example](https://github.com/kaphula/winit-egui-wgpu-template/tree/master/src)

use egui::{Context, ViewportId};
use egui_wgpu::{Renderer, ScreenDescriptor};
use wgpu::{CommandBuffer, CommandEncoder, Device, Queue, StoreOp, TextureFormat, TextureView};
use winit::{event::WindowEvent, window::Window};

use crate::types::{EngineUpdates, Scene};

pub(crate) struct GuiState {
    pub egui_state: egui_winit::State,
    renderer: Renderer,
}

impl GuiState {
    pub(crate) fn new(window: &Window, device: &Device, format: TextureFormat) -> Self {
        let egui_ctx = Context::default();

        let egui_state = egui_winit::State::new(
            egui_ctx,
            ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(2 * 1_024),
        );

        // No depth; the HUD is drawn over everything.
        let renderer = Renderer::new(device, format, None, 1, false);

        Self {
            egui_state,
            renderer,
        }
    }

    /// The HUD takes no input, so game controls see every event regardless.
    pub(crate) fn on_window_event(&mut self, window: &Window, event: &WindowEvent) {
        let _ = self.egui_state.on_window_event(window, event);
    }

    /// Runs the app's GUI code, and records the GUI pass. The returned command buffers must be
    /// submitted before `encoder`'s.
    pub(crate) fn render<T>(
        &mut self,
        window: &Window,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        output_view: &TextureView,
        width: u32,
        height: u32,
        user_state: &mut T,
        gui_handler: &mut impl FnMut(&mut T, &Context, &mut Scene) -> EngineUpdates,
        scene: &mut Scene,
    ) -> (Vec<CommandBuffer>, EngineUpdates) {
        let raw_input = self.egui_state.take_egui_input(window);

        let mut engine_updates = EngineUpdates::default();
        let full_output = self.egui_state.egui_ctx().run(raw_input, |ctx| {
            engine_updates = gui_handler(user_state, ctx, scene);
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_state
            .egui_ctx()
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer
                .update_texture(device, queue, *id, image_delta);
        }

        let screen_descriptor = ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let cmds = self
            .renderer
            .update_buffers(device, queue, encoder, &tris, &screen_descriptor);

        {
            let mut rpass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui render pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: output_view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();

            self.renderer.render(&mut rpass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }

        (cmds, engine_updates)
    }
}
