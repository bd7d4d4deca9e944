//! Simulation shared by the demos. Nothing here touches the GPU or the window; each demo owns a
//! world struct and steps it once per frame with that frame's inputs.

pub mod collision;
pub mod controller;
pub mod dragon;
pub mod projectile;
pub mod race;
pub mod shooter;
pub mod snake;
pub mod timers;
pub mod weapon;

pub use collision::{first_hit, is_hit, resolve_projectiles, retain_projectiles, Sphere};
pub use controller::{apply_mouse_look, Controller, Locomotion, LookSettings, MoveSettings};
pub use projectile::Projectile;
pub use timers::Countdown;
pub use weapon::{FireResult, Staff, Trigger};

/// What happened during one step, for the HUD and for logging.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepEvents {
    pub fired: bool,
    pub hits: usize,
}
