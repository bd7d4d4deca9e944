//! Handles window initialization and events, using Winit.

use std::{path::Path, time::Instant};

use anyhow::Context;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::ActiveEventLoop,
    window::{CursorGrabMode, Icon, Window, WindowAttributes, WindowId},
};

use crate::{
    input::{self, InputsCommanded, KeyOutcome},
    system::{process_engine_updates, State},
    EngineUpdates, Scene,
};

fn load_icon(path: &Path) -> anyhow::Result<Icon> {
    let image = image::open(path)?.into_rgba8();
    let (width, height) = image.dimensions();

    Icon::from_rgba(image.into_raw(), width, height).context("Invalid icon image")
}

/// Locks the cursor for mouse-look. Falls back to confining it, where locking isn't supported.
fn grab_cursor(window: &Window) -> bool {
    let result = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));

    match result {
        Ok(()) => {
            window.set_cursor_visible(false);
            true
        }
        Err(e) => {
            log::warn!("Unable to grab the cursor: {e}");
            false
        }
    }
}

impl<T, FRender, FGui> State<T, FRender, FGui>
where
    FRender: FnMut(&mut T, &mut Scene, &InputsCommanded, f32) -> EngineUpdates + 'static,
    FGui: FnMut(&mut T, &egui::Context, &mut Scene) -> EngineUpdates + 'static,
{
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(sys), Some(graphics), Some(gui)) =
            (self.render.as_ref(), self.graphics.as_mut(), self.gui.as_mut())
        else {
            return;
        };

        let now = Instant::now();
        let dt = (now - self.last_render_time).as_secs_f32();
        self.last_render_time = now;

        let inputs = self.inputs.take_frame();
        let updates_render =
            (self.render_handler)(&mut self.user_state, &mut graphics.scene, &inputs, dt);

        process_engine_updates(&updates_render, graphics, &sys.device, &sys.queue);

        let mut reconfigure = false;

        match sys.surface.get_current_texture() {
            Ok(output_frame) => {
                graphics.render(
                    gui,
                    output_frame,
                    &sys.device,
                    &sys.queue,
                    sys.surface_cfg.width,
                    sys.surface_cfg.height,
                    &mut self.user_state,
                    &mut self.gui_handler,
                );
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated; reconfiguring");
                reconfigure = true;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.error = Some(anyhow::anyhow!("Out of GPU memory"));
                event_loop.exit();
            }
            // Eg a timeout while minimized. Skip the frame.
            Err(e) => log::debug!("Skipping frame: {e}"),
        }

        if reconfigure {
            let size = sys.size;
            self.resize(size);
        }
    }
}

impl<T, FRender, FGui> ApplicationHandler for State<T, FRender, FGui>
where
    FRender: FnMut(&mut T, &mut Scene, &InputsCommanded, f32) -> EngineUpdates + 'static,
    FGui: FnMut(&mut T, &egui::Context, &mut Scene) -> EngineUpdates + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Desktop platforms only resume once.
        if self.graphics.is_some() {
            return;
        }

        let Some(scene) = self.scene.as_ref() else {
            return;
        };

        let icon = match self.ui_settings.icon_path {
            Some(ref p) => match load_icon(Path::new(p)) {
                Ok(icon) => Some(icon),
                Err(e) => {
                    log::warn!("Unable to load window icon {p}: {e}");
                    None
                }
            },
            None => None,
        };

        let attributes = WindowAttributes::default()
            .with_title(&scene.window_title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                scene.window_size.0,
                scene.window_size.1,
            ))
            .with_window_icon(icon);

        let result = event_loop
            .create_window(attributes)
            .context("Unable to create the window")
            .and_then(|window| self.init(window));

        if let Err(e) = result {
            self.error = Some(e);
            event_loop.exit();
            return;
        }

        if let Some(info) = self.adapter_info() {
            log::info!("Rendering with {} ({:?})", info.name, info.backend);
        }

        if let Some(graphics) = self.graphics.as_ref() {
            if self.input_settings.grab_cursor {
                self.cursor_grabbed = grab_cursor(&graphics.window);
            }
            graphics.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let (Some(graphics), Some(gui)) = (self.graphics.as_ref(), self.gui.as_mut()) else {
            return;
        };

        gui.on_window_event(&graphics.window, &event);

        match event {
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(graphics) = self.graphics.as_ref() {
                    graphics.window.request_redraw();
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                self.resize(physical_size);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if input::handle_key(&event, &mut self.inputs) == KeyOutcome::Quit {
                    log::info!("Escape pressed; exiting");
                    event_loop.exit();
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                input::handle_mouse_button(button, state, &mut self.inputs);
            }
            WindowEvent::Focused(focused) => {
                if focused {
                    if self.input_settings.grab_cursor {
                        self.cursor_grabbed = grab_cursor(&graphics.window);
                    }
                } else {
                    // Key releases won't arrive while unfocused; don't leave keys held.
                    self.inputs = Default::default();
                    self.cursor_grabbed = false;
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.cursor_grabbed {
                input::add_mouse_motion(delta, &mut self.inputs);
            }
        }
    }
}
