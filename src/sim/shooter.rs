//! The wizard shooter: a player with a staff, and the snake they shoot at.

use serde::Deserialize;

use crate::{
    camera::{Camera, UP_VEC},
    input::InputsCommanded,
    lin_alg::{Mat4, Vec3},
    sim::{
        collision::resolve_projectiles,
        controller::{Controller, Locomotion, LookSettings, MoveSettings},
        projectile::Projectile,
        snake::{Snake, SnakeConfig},
        timers::Countdown,
        weapon::{FireResult, Staff, Trigger},
        StepEvents,
    },
};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ShooterConfig {
    pub look: LookSettings,
    pub movement: MoveSettings,
    pub snake: SnakeConfig,
    pub camera_start: [f32; 3],
    pub camera_yaw: f32,
    pub camera_pitch: f32,
    /// Seconds between shots.
    pub fire_cooldown: f32,
    pub projectile_speed: f32,
    /// Projectiles spawn this far in front of the eye.
    pub spawn_distance: f32,
    /// Projectiles further than this from the player are removed.
    pub max_range: f32,
    pub flash_duration: f32,
    pub shake_duration: f32,
    pub shake_amount: f32,
    pub sun_orbit_radius: f32,
    pub sun_orbit_speed: f32,
    pub sun_height: f32,
}

impl Default for ShooterConfig {
    fn default() -> Self {
        Self {
            look: LookSettings::default(),
            movement: MoveSettings {
                speed: 5.,
                fast_speed: 5.,
                ..Default::default()
            },
            snake: SnakeConfig::default(),
            camera_start: [0., 3.5, 5.],
            camera_yaw: -90.,
            camera_pitch: 0.,
            fire_cooldown: 0.5,
            projectile_speed: 20.,
            spawn_distance: 1.,
            max_range: 50.,
            flash_duration: 0.3,
            shake_duration: 0.2,
            shake_amount: 0.05,
            sun_orbit_radius: 15.,
            sun_orbit_speed: 0.5,
            sun_height: 10.,
        }
    }
}

pub struct ShooterWorld {
    pub config: ShooterConfig,
    pub camera: Camera,
    pub controller: Controller,
    pub snake: Snake,
    pub projectiles: Vec<Projectile>,
    pub staff: Staff,
    /// The snake's hit flash.
    pub flash: Countdown,
    fire: Trigger,
    /// Seconds since start.
    pub time: f32,
    pub hit_count: u32,
}

impl ShooterWorld {
    pub fn new(config: ShooterConfig) -> Self {
        let camera = Camera::new(
            Vec3::from(config.camera_start),
            config.camera_yaw,
            config.camera_pitch,
        );

        Self {
            camera,
            controller: Controller::new(Locomotion::Grounded, true),
            snake: Snake::new(config.snake.clone()),
            projectiles: Vec::new(),
            staff: Staff::new(
                config.fire_cooldown,
                config.shake_duration,
                config.shake_amount,
            ),
            flash: Countdown::new(config.flash_duration),
            fire: Trigger::default(),
            time: 0.,
            hit_count: 0,
            config,
        }
    }

    /// Camera, then firing, then projectile and snake motion, then collision.
    pub fn step(&mut self, inputs: &InputsCommanded, dt: f32) -> StepEvents {
        let mut events = StepEvents::default();
        self.time += dt;

        self.staff.update(dt);
        self.flash.tick(dt);

        self.controller.update(
            &mut self.camera,
            inputs,
            &self.config.look,
            &self.config.movement,
            dt,
        );

        if self.fire.pressed(inputs.fire) {
            match self.staff.try_fire(self.time) {
                FireResult::Fired => {
                    let dir = self.camera.look_dir();
                    self.projectiles.push(Projectile::new(
                        self.camera.position + dir * self.config.spawn_distance,
                        dir * self.config.projectile_speed,
                    ));
                    events.fired = true;
                }
                FireResult::CoolingDown(left) => {
                    log::info!("Staff cooling down: {left:.2}s left");
                }
            }
        }

        for projectile in &mut self.projectiles {
            projectile.update(dt);
        }

        self.snake.update(dt, self.camera.position);

        let hits = resolve_projectiles(
            &mut self.projectiles,
            &self.snake.hit_spheres(),
            self.camera.position,
            self.config.max_range,
        );

        for _ in &hits {
            self.flash.trigger();
            self.hit_count += 1;
            log::info!("Snake hit! *pain sound*");
        }
        events.hits = hits.len();

        events
    }

    /// The staff, held to the lower right of the view, jittering after a shot.
    pub fn staff_transform(&self) -> Mat4 {
        let cam = &self.camera;
        let pos = cam.position + cam.look_dir() * 3. + cam.right_dir() * 1.2 - UP_VEC * 0.8;

        // Based on the time left, so the jitter decays with it.
        let shake = self.staff.shake_offset(self.staff.shake.remaining());

        Mat4::new_translation(pos + shake)
            * Mat4::new_rotation_y(-(cam.yaw + 90.).to_radians())
            * Mat4::new_rotation_x(cam.pitch.to_radians())
            * Mat4::new_scaler(0.3)
    }

    /// The sun circles the scene.
    pub fn sun_position(&self) -> Vec3 {
        let angle = self.time * self.config.sun_orbit_speed;
        let r = self.config.sun_orbit_radius;

        Vec3::new(r * angle.cos(), self.config.sun_height, r * angle.sin())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn fire_spawns_in_front_with_speed() {
        let mut world = ShooterWorld::new(ShooterConfig::default());
        let inputs = InputsCommanded {
            fire: true,
            ..Default::default()
        };

        let events = world.step(&inputs, 0.);

        assert!(events.fired);
        assert_eq!(world.projectiles.len(), 1);
        let p = &world.projectiles[0];
        assert_relative_eq!(p.velocity.z, -20., epsilon = 1e-4);
        assert_relative_eq!(p.position.z, world.camera.position.z - 1., epsilon = 1e-4);
        assert!(world.staff.shake.is_active());
    }

    #[test]
    fn holding_fire_shoots_once() {
        let mut world = ShooterWorld::new(ShooterConfig::default());
        let inputs = InputsCommanded {
            fire: true,
            ..Default::default()
        };

        for _ in 0..100 {
            world.step(&inputs, 0.016);
        }
        assert_eq!(world.projectiles.len(), 1);
    }

    #[test]
    fn sun_orbits_at_fixed_height() {
        let mut world = ShooterWorld::new(ShooterConfig::default());
        world.time = 1.3;
        let sun = world.sun_position();

        assert_eq!(sun.y, 10.);
        assert_relative_eq!(sun.ground_projected().magnitude(), 15., epsilon = 1e-4);
    }
}
