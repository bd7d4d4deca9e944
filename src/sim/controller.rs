//! First-person camera control: mouse-look, and free-fly, grounded, or flight movement.

use serde::Deserialize;

use crate::{
    camera::{Camera, UP_VEC},
    input::InputsCommanded,
    lin_alg::Vec3,
    sim::weapon::Trigger,
};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LookSettings {
    /// Degrees per pixel of mouse motion.
    pub sensitivity: f32,
    /// Also multiply by the frame time. The race demo's camera turns this way.
    pub scale_with_dt: bool,
    /// Pitch is clamped to +- this, in degrees.
    pub pitch_limit: f32,
}

impl Default for LookSettings {
    fn default() -> Self {
        Self {
            sensitivity: 0.1,
            scale_with_dt: false,
            pitch_limit: 89.,
        }
    }
}

/// Turns the camera. Moving the mouse up looks up.
pub fn apply_mouse_look(cam: &mut Camera, dx: f32, dy: f32, settings: &LookSettings, dt: f32) {
    let k = if settings.scale_with_dt {
        settings.sensitivity * dt
    } else {
        settings.sensitivity
    };

    cam.yaw += dx * k;
    cam.pitch = (cam.pitch - dy * k).clamp(-settings.pitch_limit, settings.pitch_limit);
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MoveSettings {
    /// Units per second.
    pub speed: f32,
    /// Speed with shift held, in free-fly.
    pub fast_speed: f32,
    /// Units per second squared. Negative is down.
    pub gravity: f32,
    /// Eye height when standing.
    pub ground_level: f32,
    pub jump_velocity: f32,
    /// How far above the ground still counts as standing, for jumping.
    pub ground_snap: f32,
}

impl Default for MoveSettings {
    fn default() -> Self {
        Self {
            speed: 5.,
            fast_speed: 15.,
            gravity: -9.8,
            ground_level: 2.,
            jump_velocity: 8.,
            ground_snap: 0.1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Locomotion {
    /// Moves along the look direction; shift is the fast modifier.
    FreeFly,
    /// Walks on the ground plane with gravity; space jumps.
    Grounded,
    /// Like free-fly, but space and shift climb and descend.
    Flight,
}

#[derive(Clone, Debug)]
pub struct Controller {
    pub mode: Locomotion,
    pub vertical_velocity: f32,
    /// Whether the flight toggle is available.
    pub can_fly: bool,
    toggle: Trigger,
}

impl Controller {
    pub fn new(mode: Locomotion, can_fly: bool) -> Self {
        Self {
            mode,
            vertical_velocity: 0.,
            can_fly,
            toggle: Trigger::default(),
        }
    }

    /// Switches between grounded and flight.
    pub fn toggle_flight(&mut self) {
        match self.mode {
            Locomotion::Flight => {
                self.mode = Locomotion::Grounded;
                log::info!("Flight mode OFF - gravity enabled");
            }
            _ => {
                self.mode = Locomotion::Flight;
                self.vertical_velocity = 0.;
                log::info!("Flight mode ON");
            }
        }
    }

    pub fn update(
        &mut self,
        cam: &mut Camera,
        inputs: &InputsCommanded,
        look: &LookSettings,
        settings: &MoveSettings,
        dt: f32,
    ) {
        apply_mouse_look(cam, inputs.mouse_delta_x, inputs.mouse_delta_y, look, dt);

        if self.can_fly && self.toggle.pressed(inputs.toggle_flight) {
            self.toggle_flight();
        }

        match self.mode {
            Locomotion::FreeFly => {
                let speed = if inputs.shift {
                    settings.fast_speed
                } else {
                    settings.speed
                };
                cam.position += move_dir(inputs, cam.look_dir(), cam.right_dir()) * (speed * dt);
            }
            Locomotion::Flight => {
                let mut dir = move_dir(inputs, cam.look_dir(), cam.right_dir());
                if inputs.up {
                    dir += UP_VEC;
                }
                if inputs.shift {
                    dir -= UP_VEC;
                }
                cam.position += dir * (settings.speed * dt);
            }
            Locomotion::Grounded => {
                let fwd = cam.look_dir().ground_projected().to_normalized();
                let right = cam.right_dir().ground_projected().to_normalized();
                cam.position += move_dir(inputs, fwd, right) * (settings.speed * dt);

                self.vertical_velocity += settings.gravity * dt;

                if inputs.up && cam.position.y <= settings.ground_level + settings.ground_snap {
                    self.vertical_velocity = settings.jump_velocity;
                }

                cam.position.y += self.vertical_velocity * dt;

                if cam.position.y < settings.ground_level {
                    cam.position.y = settings.ground_level;
                    self.vertical_velocity = 0.;
                }
            }
        }
    }
}

/// Sum of the WASD basis vectors. Not normalized; diagonals are faster.
fn move_dir(inputs: &InputsCommanded, fwd: Vec3, right: Vec3) -> Vec3 {
    let mut result = Vec3::new_zero();

    if inputs.fwd {
        result += fwd;
    }
    if inputs.back {
        result -= fwd;
    }
    if inputs.right {
        result += right;
    }
    if inputs.left {
        result -= right;
    }

    result
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn cam() -> Camera {
        Camera::new(Vec3::new(0., 2., 5.), -90., 0.)
    }

    #[test]
    fn pitch_is_clamped() {
        let mut c = cam();
        let look = LookSettings::default();

        apply_mouse_look(&mut c, 0., -100_000., &look, 0.016);
        assert_eq!(c.pitch, 89.);
        apply_mouse_look(&mut c, 0., 100_000., &look, 0.016);
        assert_eq!(c.pitch, -89.);

        let race = LookSettings {
            sensitivity: 60.,
            scale_with_dt: true,
            pitch_limit: 85.,
        };
        apply_mouse_look(&mut c, 10., -1_000., &race, 0.1);
        assert_eq!(c.pitch, 85.);
        assert_relative_eq!(c.yaw, -30.);
    }

    #[test]
    fn fast_modifier_moves_further() {
        let settings = MoveSettings::default();
        let look = LookSettings::default();
        let mut ctrl = Controller::new(Locomotion::FreeFly, false);

        let mut slow = cam();
        let inputs = InputsCommanded {
            fwd: true,
            ..Default::default()
        };
        ctrl.update(&mut slow, &inputs, &look, &settings, 0.1);

        let mut fast = cam();
        let inputs = InputsCommanded {
            fwd: true,
            shift: true,
            ..Default::default()
        };
        ctrl.update(&mut fast, &inputs, &look, &settings, 0.1);

        assert_relative_eq!(slow.position.z, 4.5, epsilon = 1e-5);
        assert_relative_eq!(fast.position.z, 3.5, epsilon = 1e-5);
    }

    #[test]
    fn grounded_walks_flat_even_looking_up() {
        let settings = MoveSettings::default();
        let mut ctrl = Controller::new(Locomotion::Grounded, true);
        let mut c = cam();
        c.pitch = 45.;

        let inputs = InputsCommanded {
            fwd: true,
            ..Default::default()
        };
        ctrl.update(&mut c, &inputs, &LookSettings::default(), &settings, 0.1);

        assert_eq!(c.position.y, 2.);
        assert_relative_eq!(c.position.z, 4.5, epsilon = 1e-5);
    }

    #[test]
    fn gravity_pulls_to_ground() {
        let settings = MoveSettings::default();
        let mut ctrl = Controller::new(Locomotion::Grounded, true);
        let mut c = cam();
        c.position.y = 6.;

        for _ in 0..200 {
            ctrl.update(&mut c, &Default::default(), &LookSettings::default(), &settings, 0.016);
        }
        assert_eq!(c.position.y, settings.ground_level);
        assert_eq!(ctrl.vertical_velocity, 0.);
    }

    #[test]
    fn jump_only_from_ground() {
        let settings = MoveSettings::default();
        let look = LookSettings::default();
        let mut ctrl = Controller::new(Locomotion::Grounded, true);
        let mut c = cam();
        let jump = InputsCommanded {
            up: true,
            ..Default::default()
        };

        ctrl.update(&mut c, &jump, &look, &settings, 0.016);
        assert_eq!(ctrl.vertical_velocity, 8.);
        assert!(c.position.y > 2.);

        // Mid-air: holding jump doesn't re-launch.
        for _ in 0..10 {
            ctrl.update(&mut c, &jump, &look, &settings, 0.016);
        }
        assert!(ctrl.vertical_velocity < 8.);
    }

    #[test]
    fn flight_toggle_is_edge_triggered() {
        let settings = MoveSettings::default();
        let look = LookSettings::default();
        let mut ctrl = Controller::new(Locomotion::Grounded, true);
        let mut c = cam();
        ctrl.vertical_velocity = 3.;

        let toggle = InputsCommanded {
            toggle_flight: true,
            ..Default::default()
        };
        ctrl.update(&mut c, &toggle, &look, &settings, 0.016);
        assert_eq!(ctrl.mode, Locomotion::Flight);
        assert_eq!(ctrl.vertical_velocity, 0.);

        // Held: no change.
        ctrl.update(&mut c, &toggle, &look, &settings, 0.016);
        assert_eq!(ctrl.mode, Locomotion::Flight);

        ctrl.update(&mut c, &Default::default(), &look, &settings, 0.016);
        ctrl.update(&mut c, &toggle, &look, &settings, 0.016);
        assert_eq!(ctrl.mode, Locomotion::Grounded);
    }

    #[test]
    fn flight_climbs_and_hovers() {
        let settings = MoveSettings::default();
        let look = LookSettings::default();
        let mut ctrl = Controller::new(Locomotion::Flight, true);
        let mut c = cam();

        let climb = InputsCommanded {
            up: true,
            ..Default::default()
        };
        ctrl.update(&mut c, &climb, &look, &settings, 0.2);
        assert_relative_eq!(c.position.y, 3., epsilon = 1e-5);

        ctrl.update(&mut c, &Default::default(), &look, &settings, 1.);
        assert_relative_eq!(c.position.y, 3., epsilon = 1e-5);
    }
}
