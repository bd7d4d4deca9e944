//! The snake creature: a base that slithers towards the player, and a neck of segments that rises
//! from the ground and sways. Segment poses are closed-form in time; nothing is integrated.

use std::f32::consts::{PI, TAU};

use serde::Deserialize;

use crate::{
    camera::UP_VEC,
    lin_alg::Vec3,
    sim::collision::Sphere,
};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SnakeConfig {
    pub segment_count: usize,
    pub neck_length: f32,
    /// Side-to-side sway amplitude.
    pub oscillation_strength: f32,
    pub oscillation_speed: f32,
    /// Units per second the base moves towards the player.
    pub slither_speed: f32,
    /// The base never gets closer to the player than this.
    pub min_distance: f32,
    pub base_ground_height: f32,
    pub max_rise_height: f32,
    /// Fraction of the neck that stays on the ground before rising.
    pub rise_start: f32,
    pub segment_radius: f32,
    pub head_radius: f32,
    pub start_position: [f32; 3],
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            segment_count: 15,
            neck_length: 10.,
            oscillation_strength: 1.5,
            oscillation_speed: 2.,
            slither_speed: 0.8,
            min_distance: 8.,
            base_ground_height: 0.1,
            max_rise_height: 1.8,
            rise_start: 0.4,
            segment_radius: 1.,
            head_radius: 1.5,
            start_position: [0., 0., -15.],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub position: Vec3,
    /// Radians. x: pitch, y: yaw, z: roll.
    pub rotation: Vec3,
    /// Where in the body's wave this segment sits.
    pub phase: f32,
}

/// Height above the base at fraction `progress` along the neck, at time `t`.
pub fn segment_height(cfg: &SnakeConfig, t: f32, progress: f32) -> f32 {
    let rise = if progress > cfg.rise_start {
        let adjusted = (progress - cfg.rise_start) / (1. - cfg.rise_start);
        adjusted * adjusted * cfg.max_rise_height
    } else {
        0.
    };

    // The raised part of the neck sways more.
    let wave_intensity = if progress < 0.5 { 0.05 } else { 0.15 };
    let slither = (t * 2. + progress * TAU).sin() * wave_intensity;

    let gravity_effect = 1. - progress * 0.3;

    cfg.base_ground_height * gravity_effect + rise + slither
}

/// Sideways displacement at fraction `progress` along the neck, at time `t`.
pub fn lateral_offset(cfg: &SnakeConfig, t: f32, progress: f32) -> f32 {
    (t * cfg.oscillation_speed + progress * PI).sin() * cfg.oscillation_strength
}

/// Poses every segment. `heading` is the horizontal direction the neck extends in.
/// Identical inputs give identical output.
pub fn pose_segments(cfg: &SnakeConfig, t: f32, base: Vec3, heading: Vec3) -> Vec<Segment> {
    let n = cfg.segment_count;
    let heading = heading.ground_projected().to_normalized();
    let right = heading.cross(UP_VEC).to_normalized();

    let mut result: Vec<Segment> = Vec::with_capacity(n);

    for i in 0..n {
        let progress = i as f32 / n as f32;

        let forward = heading * (progress * cfg.neck_length);
        let side = right * lateral_offset(cfg, t, progress);
        let height = Vec3::new(0., segment_height(cfg, t, progress), 0.);

        let position = base + forward + side + height;

        let rotation = match result.last() {
            Some(prev) => {
                let dir = position - prev.position;
                if dir.magnitude() > 0.001 {
                    let horizontal = (dir.x * dir.x + dir.z * dir.z).sqrt();
                    Vec3::new(dir.y.atan2(horizontal), dir.x.atan2(dir.z), 0.)
                } else {
                    prev.rotation
                }
            }
            None => Vec3::new_zero(),
        };

        result.push(Segment {
            position,
            rotation,
            phase: progress * TAU,
        });
    }

    result
}

#[derive(Clone, Debug)]
pub struct Snake {
    pub config: SnakeConfig,
    /// Where the tail end sits on the ground.
    pub base: Vec3,
    /// Horizontal unit vector from the base towards the player.
    pub heading: Vec3,
    /// Animation time accumulator, in seconds.
    pub time: f32,
    pub segments: Vec<Segment>,
}

impl Snake {
    pub fn new(config: SnakeConfig) -> Self {
        let base = Vec3::from(config.start_position);
        let heading = Vec3::new(0., 0., 1.);
        let segments = pose_segments(&config, 0., base, heading);

        Self {
            config,
            base,
            heading,
            time: 0.,
            segments,
        }
    }

    /// Slithers the base towards the player, then re-poses every segment.
    pub fn update(&mut self, dt: f32, player: Vec3) {
        self.time += dt;

        let target = player.ground_projected();
        let to_player = target - self.base.ground_projected();
        let dist = to_player.magnitude();

        // Directly on top of the player: keep the last heading.
        if dist > 0.001 {
            self.heading = to_player / dist;
        }

        if dist > self.config.min_distance {
            self.base += self.heading * (self.config.slither_speed * dt);
        }

        let new_dist = (target - self.base.ground_projected()).magnitude();
        if new_dist < self.config.min_distance {
            self.base = target - self.heading * self.config.min_distance;
        }
        self.base.y = 0.;

        self.segments = pose_segments(&self.config, self.time, self.base, self.heading);
    }

    pub fn head(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Neck segments first, then the head. Order matters for first-match collision.
    pub fn hit_spheres(&self) -> Vec<Sphere> {
        let mut result: Vec<Sphere> = self
            .segments
            .iter()
            .map(|s| Sphere::new(s.position, self.config.segment_radius))
            .collect();

        if let Some(head) = self.head() {
            result.push(Sphere::new(head.position, self.config.head_radius));
        }

        result
    }

    /// Yaw and pitch, in radians, for the head to look at `target`.
    pub fn head_facing(&self, target: Vec3) -> Vec3 {
        let Some(head) = self.head() else {
            return Vec3::new_zero();
        };

        let dir = (target - head.position).to_normalized();
        let horizontal = (dir.x * dir.x + dir.z * dir.z).sqrt();
        Vec3::new(dir.y.atan2(horizontal), dir.x.atan2(dir.z), 0.)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn posing_is_deterministic() {
        let cfg = SnakeConfig::default();
        let base = Vec3::new(1., 0., -12.);
        let heading = Vec3::new(0.2, 0., 1.);

        let a = pose_segments(&cfg, 3.7, base, heading);
        let b = pose_segments(&cfg, 3.7, base, heading);

        assert_eq!(a, b);
        assert_eq!(a.len(), 15);
    }

    #[test]
    fn height_and_sway_depend_only_on_time_and_progress() {
        let cfg = SnakeConfig::default();
        let heading = Vec3::new(0., 0., 1.);
        let t = 1.25;

        let a = pose_segments(&cfg, t, Vec3::new(0., 0., -15.), heading);
        let b = pose_segments(&cfg, t, Vec3::new(7., 0., 3.), heading);

        for (i, (sa, sb)) in a.iter().zip(&b).enumerate() {
            let progress = i as f32 / 15.;
            assert_relative_eq!(sa.position.y, segment_height(&cfg, t, progress), epsilon = 1e-5);
            assert_relative_eq!(sa.position.y, sb.position.y, epsilon = 1e-5);
            // Heading +Z makes right -X.
            assert_relative_eq!(
                sa.position.x,
                -lateral_offset(&cfg, t, progress),
                epsilon = 1e-5
            );
        }
    }

    #[test]
    fn neck_stays_low_until_rise_start() {
        let cfg = SnakeConfig::default();
        // The slither term is bounded by 0.05 below the midpoint.
        for i in 0..6 {
            let progress = i as f32 / 15.;
            assert!(segment_height(&cfg, 0., progress) <= cfg.base_ground_height + 0.05 + 1e-6);
        }
        assert!(segment_height(&cfg, 0., 14. / 15.) > 1.);
    }

    #[test]
    fn phases_spread_over_a_cycle() {
        let snake = Snake::new(SnakeConfig::default());
        assert_eq!(snake.segments[0].phase, 0.);
        assert_relative_eq!(snake.segments[5].phase, 5. / 15. * TAU);
        assert_eq!(snake.segments[0].rotation, Vec3::new_zero());
    }

    #[test]
    fn base_approaches_but_keeps_distance() {
        let mut snake = Snake::new(SnakeConfig::default());
        let player = Vec3::new(0., 3.5, 5.);

        snake.update(1., player);
        assert_relative_eq!(snake.base.z, -14.2, epsilon = 1e-5);

        for _ in 0..100 {
            snake.update(1., player);
        }
        let dist = (player.ground_projected() - snake.base).magnitude();
        assert_relative_eq!(dist, 8., epsilon = 1e-4);
        assert_eq!(snake.base.y, 0.);
    }

    #[test]
    fn player_on_top_of_base_keeps_heading() {
        let mut snake = Snake::new(SnakeConfig::default());
        let heading = snake.heading;

        snake.update(0.016, Vec3::new(0., 2., -15.));
        assert!(snake.segments.iter().all(|s| s.position.x.is_finite()));
        assert_eq!(snake.heading, heading);
    }

    #[test]
    fn head_sphere_is_last_and_larger() {
        let snake = Snake::new(SnakeConfig::default());
        let spheres = snake.hit_spheres();

        assert_eq!(spheres.len(), 16);
        assert_eq!(spheres[15].radius, 1.5);
        assert_eq!(spheres[15].center, spheres[14].center);
    }
}
