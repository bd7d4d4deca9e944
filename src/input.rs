//! Handles keyboard and mouse input. The engine records held keys and accumulated mouse motion
//! here; apps read a copy once per frame.

use winit::{
    event::{ElementState, KeyEvent, MouseButton},
    keyboard::{KeyCode, PhysicalKey},
};

/// Which inputs are active this frame. Keys are level states (held or not); edge detection for
/// one-shot actions like firing happens in the simulation.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputsCommanded {
    pub fwd: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    /// Space: jump, or climb in flight mode.
    pub up: bool,
    /// Left shift: descend in flight mode, otherwise the fast modifier.
    pub shift: bool,
    /// Left mouse button.
    pub fire: bool,
    /// F.
    pub toggle_flight: bool,
    /// Pixels moved since the last frame. Right and down are positive.
    pub mouse_delta_x: f32,
    pub mouse_delta_y: f32,
}

impl InputsCommanded {
    /// Copies this frame's inputs, and clears the accumulated mouse motion. Keys stay held until
    /// released.
    pub fn take_frame(&mut self) -> Self {
        let result = *self;
        self.mouse_delta_x = 0.;
        self.mouse_delta_y = 0.;
        result
    }
}

/// What the engine should do after a key event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum KeyOutcome {
    Handled,
    Quit,
    Ignored,
}

pub(crate) fn handle_key(event: &KeyEvent, inputs: &mut InputsCommanded) -> KeyOutcome {
    let pressed = event.state == ElementState::Pressed;

    let PhysicalKey::Code(code) = event.physical_key else {
        return KeyOutcome::Ignored;
    };

    match code {
        KeyCode::Escape => return KeyOutcome::Quit,
        KeyCode::KeyW => inputs.fwd = pressed,
        KeyCode::KeyS => inputs.back = pressed,
        KeyCode::KeyA => inputs.left = pressed,
        KeyCode::KeyD => inputs.right = pressed,
        KeyCode::Space => inputs.up = pressed,
        KeyCode::ShiftLeft => inputs.shift = pressed,
        KeyCode::KeyF => inputs.toggle_flight = pressed,
        _ => return KeyOutcome::Ignored,
    }

    KeyOutcome::Handled
}

pub(crate) fn handle_mouse_button(
    button: MouseButton,
    state: ElementState,
    inputs: &mut InputsCommanded,
) {
    if button == MouseButton::Left {
        inputs.fire = state == ElementState::Pressed;
    }
}

/// Raw mouse motion, from `DeviceEvent::MouseMotion`. Accumulates until the next frame.
pub(crate) fn add_mouse_motion(delta: (f64, f64), inputs: &mut InputsCommanded) {
    inputs.mouse_delta_x += delta.0 as f32;
    inputs.mouse_delta_y += delta.1 as f32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_frame_clears_mouse_only() {
        let mut inputs = InputsCommanded::default();
        inputs.fwd = true;
        add_mouse_motion((3., -2.), &mut inputs);
        add_mouse_motion((1., 0.), &mut inputs);

        let frame = inputs.take_frame();
        assert_eq!(frame.mouse_delta_x, 4.);
        assert_eq!(frame.mouse_delta_y, -2.);
        assert!(frame.fwd);

        assert_eq!(inputs.mouse_delta_x, 0.);
        assert!(inputs.fwd);
    }

    #[test]
    fn left_button_fires() {
        let mut inputs = InputsCommanded::default();
        handle_mouse_button(MouseButton::Left, ElementState::Pressed, &mut inputs);
        assert!(inputs.fire);
        handle_mouse_button(MouseButton::Right, ElementState::Released, &mut inputs);
        assert!(inputs.fire);
        handle_mouse_button(MouseButton::Left, ElementState::Released, &mut inputs);
        assert!(!inputs.fire);
    }
}
