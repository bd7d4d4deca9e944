//! The wizard vs dragon demo: fireballs against a hovering dragon with health.

use serde::Deserialize;

use crate::{
    camera::Camera,
    input::InputsCommanded,
    lin_alg::{Mat4, Vec3},
    lighting::PointLight,
    sim::{
        collision::{is_hit, retain_projectiles},
        controller::{Controller, Locomotion, LookSettings, MoveSettings},
        projectile::Projectile,
        timers::Countdown,
        weapon::Trigger,
        StepEvents,
    },
};

/// Replaces the dragon's color while a hit registers.
pub const HIT_TINT: [f32; 3] = [1., 0.2, 0.2];

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DragonStats {
    pub health: u32,
    pub hit_radius: f32,
    /// Seconds the hit tint lasts.
    pub hit_duration: f32,
    /// Seconds the death fade lasts.
    pub death_duration: f32,
    pub hover_height: f32,
    pub bob_amplitude: f32,
    pub bob_speed: f32,
    /// Ground position; the dragon hovers above it.
    pub position: [f32; 2],
    pub scale: f32,
}

impl Default for DragonStats {
    fn default() -> Self {
        Self {
            health: 10,
            hit_radius: 5.,
            hit_duration: 0.2,
            death_duration: 2.,
            hover_height: 10.,
            bob_amplitude: 2.,
            bob_speed: 0.5,
            position: [0., -20.],
            scale: 3.,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Dragon {
    pub stats: DragonStats,
    pub health: u32,
    pub hit: Countdown,
    pub death: Countdown,
}

impl Dragon {
    pub fn new(stats: DragonStats) -> Self {
        Self {
            health: stats.health,
            hit: Countdown::new(stats.hit_duration),
            death: Countdown::new(stats.death_duration),
            stats,
        }
    }

    pub fn alive(&self) -> bool {
        self.health > 0
    }

    /// Alive, or still fading out.
    pub fn visible(&self) -> bool {
        self.alive() || self.death.is_active()
    }

    /// 1 while alive; falls to 0 over the death fade.
    pub fn alpha(&self) -> f32 {
        if self.alive() {
            1.
        } else {
            self.death.fraction()
        }
    }

    /// Flash color and strength: the hit tint at full strength while recently hit.
    pub fn hit_flash(&self) -> ([f32; 3], f32) {
        let strength = if self.hit.is_active() { 1. } else { 0. };
        (HIT_TINT, strength)
    }

    pub fn health_fraction(&self) -> f32 {
        if self.stats.health == 0 {
            return 0.;
        }
        self.health as f32 / self.stats.health as f32
    }

    /// Bobs up and down over time.
    pub fn position(&self, t: f32) -> Vec3 {
        let [x, z] = self.stats.position;
        let y = self.stats.hover_height + (t * self.stats.bob_speed).sin() * self.stats.bob_amplitude;
        Vec3::new(x, y, z)
    }

    pub fn transform(&self, t: f32) -> Mat4 {
        Mat4::new_translation(self.position(t))
            * Mat4::new_rotation_y(std::f32::consts::PI)
            * Mat4::new_scaler(self.stats.scale)
    }

    /// Takes one point of damage. Returns true if this hit killed it.
    pub fn register_hit(&mut self) -> bool {
        if !self.alive() {
            return false;
        }
        self.health -= 1;
        self.hit.trigger();

        if self.health == 0 {
            self.death.trigger();
            log::info!("Dragon defeated!");
            true
        } else {
            log::info!("Dragon hit! Health: {}", self.health);
            false
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.hit.tick(dt);
        self.death.tick(dt);
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DragonConfig {
    pub look: LookSettings,
    pub movement: MoveSettings,
    pub dragon: DragonStats,
    pub camera_start: [f32; 3],
    pub camera_yaw: f32,
    pub camera_pitch: f32,
    pub projectile_speed: f32,
    /// Seconds a fireball lives.
    pub projectile_life: f32,
    pub spawn_distance: f32,
    pub max_range: f32,
    /// Fireball and staff light.
    pub fire_color: [f32; 3],
    pub fire_intensity: f32,
}

impl Default for DragonConfig {
    fn default() -> Self {
        Self {
            look: LookSettings::default(),
            movement: MoveSettings {
                speed: 5.,
                fast_speed: 15.,
                ..Default::default()
            },
            dragon: DragonStats::default(),
            camera_start: [0., 1.8, 15.],
            camera_yaw: -90.,
            camera_pitch: 0.,
            projectile_speed: 30.,
            projectile_life: 5.,
            spawn_distance: 1.5,
            max_range: 200.,
            fire_color: [1., 0.5, 0.],
            fire_intensity: 1.,
        }
    }
}

pub struct DragonWorld {
    pub config: DragonConfig,
    pub camera: Camera,
    pub controller: Controller,
    pub dragon: Dragon,
    pub projectiles: Vec<Projectile>,
    fire: Trigger,
    pub time: f32,
}

impl DragonWorld {
    pub fn new(config: DragonConfig) -> Self {
        Self {
            camera: Camera::new(
                Vec3::from(config.camera_start),
                config.camera_yaw,
                config.camera_pitch,
            ),
            controller: Controller::new(Locomotion::FreeFly, false),
            dragon: Dragon::new(config.dragon.clone()),
            projectiles: Vec::new(),
            fire: Trigger::default(),
            time: 0.,
            config,
        }
    }

    pub fn step(&mut self, inputs: &InputsCommanded, dt: f32) -> StepEvents {
        let mut events = StepEvents::default();
        self.time += dt;
        self.dragon.tick(dt);

        self.controller.update(
            &mut self.camera,
            inputs,
            &self.config.look,
            &self.config.movement,
            dt,
        );

        // No cooldown here; one fireball per click.
        if self.fire.pressed(inputs.fire) {
            let dir = self.camera.look_dir();
            self.projectiles.push(
                Projectile::new(
                    self.camera.position + dir * self.config.spawn_distance,
                    dir * self.config.projectile_speed,
                )
                .with_life(self.config.projectile_life),
            );
            events.fired = true;
        }

        for projectile in &mut self.projectiles {
            projectile.update(dt);
        }

        // Checked per fireball: once one kills the dragon, the rest fly through.
        let dragon = &mut self.dragon;
        let center = dragon.position(self.time);
        let mut hits = 0;

        retain_projectiles(
            &mut self.projectiles,
            self.camera.position,
            self.config.max_range,
            |point| {
                if dragon.alive() && is_hit(point, center, dragon.stats.hit_radius) {
                    dragon.register_hit();
                    hits += 1;
                    true
                } else {
                    false
                }
            },
        );
        events.hits = hits;

        events
    }

    /// The staff is fixed relative to the view: lower right, tilted down.
    pub fn staff_transform(&self) -> Mat4 {
        let view_inv = self.camera.view_mat_inv();

        view_inv
            * Mat4::new_translation(Vec3::new(0.4, -0.4, -1.))
            * Mat4::new_rotation_x(-10_f32.to_radians())
            * Mat4::new_scaler(0.3)
    }

    /// A light at the staff tip, and one per fireball.
    pub fn point_lights(&self) -> Vec<PointLight> {
        let color = Vec3::from(self.config.fire_color);
        let tip = self
            .staff_transform()
            .transform_point(Vec3::new(0., 1., 0.));

        let mut result = vec![PointLight::new(tip, color, self.config.fire_intensity)];
        result.extend(
            self.projectiles
                .iter()
                .map(|p| PointLight::new(p.position, color, self.config.fire_intensity)),
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn dragon_bobs_around_hover_height() {
        let dragon = Dragon::new(DragonStats::default());
        assert_relative_eq!(dragon.position(0.).y, 10.);
        assert_relative_eq!(dragon.position(std::f32::consts::PI).y, 12., epsilon = 1e-5);
        assert_eq!(dragon.position(1.).z, -20.);
    }

    #[test]
    fn hits_tint_then_kill() {
        let mut dragon = Dragon::new(DragonStats::default());

        assert!(!dragon.register_hit());
        assert_eq!(dragon.health, 9);
        assert!(dragon.hit.is_active());
        dragon.tick(0.25);
        assert!(!dragon.hit.is_active());

        for _ in 0..8 {
            assert!(!dragon.register_hit());
        }
        assert!(dragon.register_hit());
        assert!(!dragon.alive());
        assert_eq!(dragon.alpha(), 1.);

        dragon.tick(1.);
        assert_relative_eq!(dragon.alpha(), 0.5);
        assert!(dragon.visible());

        dragon.tick(1.5);
        assert!(!dragon.visible());
        assert!(!dragon.register_hit());
        assert_eq!(dragon.health, 0);
    }

    #[test]
    fn hit_tint_replaces_color_while_active() {
        let mut dragon = Dragon::new(DragonStats::default());
        assert_eq!(dragon.hit_flash(), (HIT_TINT, 0.));

        dragon.register_hit();
        assert_eq!(dragon.hit_flash(), (HIT_TINT, 1.));

        dragon.tick(0.25);
        assert_eq!(dragon.hit_flash().1, 0.);
    }

    #[test]
    fn killing_fireball_lets_the_next_through() {
        let mut config = DragonConfig::default();
        config.dragon.health = 1;
        let mut world = DragonWorld::new(config);

        let center = world.dragon.position(0.);
        for _ in 0..2 {
            world
                .projectiles
                .push(Projectile::new(center, Vec3::new_zero()));
        }

        let events = world.step(&InputsCommanded::default(), 0.);

        assert!(!world.dragon.alive());
        assert_eq!(events.hits, 1);
        assert_eq!(world.projectiles.len(), 1);
    }

    #[test]
    fn fireballs_expire() {
        let mut world = DragonWorld::new(DragonConfig::default());
        // Look away from the dragon.
        world.camera.yaw = 90.;
        let fire = InputsCommanded {
            fire: true,
            ..Default::default()
        };
        world.step(&fire, 0.);
        assert_eq!(world.projectiles.len(), 1);
        assert_eq!(world.point_lights().len(), 2);

        for _ in 0..6 {
            world.step(&Default::default(), 1.);
        }
        assert!(world.projectiles.is_empty());
        assert_eq!(world.dragon.health, 10);
    }
}
