use crate::lin_alg::Vec3;

/// A bolt or fireball in flight. Moves in a straight line; no gravity.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Seconds until it expires. `None` lives until it hits or leaves range.
    pub life: Option<f32>,
}

impl Projectile {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self {
            position,
            velocity,
            life: None,
        }
    }

    pub fn with_life(mut self, life: f32) -> Self {
        self.life = Some(life);
        self
    }

    /// Advances by `velocity * dt`. Integration is exact for straight-line motion.
    pub fn update(&mut self, dt: f32) {
        self.position += self.velocity * dt;

        if let Some(life) = &mut self.life {
            *life -= dt;
        }
    }

    pub fn expired(&self) -> bool {
        matches!(self.life, Some(l) if l <= 0.)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn moves_by_velocity_times_dt() {
        let start = Vec3::new(1., 3.5, 4.);
        let velocity = Vec3::new(0., 0., -20.);
        let mut p = Projectile::new(start, velocity);

        p.update(0.1);

        let delta = p.position - start;
        assert_relative_eq!(delta.x, 0.);
        assert_relative_eq!(delta.y, 0.);
        assert_relative_eq!(delta.z, -2.0, epsilon = 1e-6);
        assert_eq!(p.position, start + velocity * 0.1);
    }

    #[test]
    fn zero_dt_does_not_move() {
        let mut p = Projectile::new(Vec3::new(2., 2., 2.), Vec3::new(5., -1., 3.)).with_life(5.);
        p.update(0.);
        assert_eq!(p.position, Vec3::new(2., 2., 2.));
        assert_eq!(p.life, Some(5.));
    }

    #[test]
    fn life_counts_down_to_expiry() {
        let mut p = Projectile::new(Vec3::new_zero(), Vec3::new(0., 0., -30.)).with_life(0.25);
        p.update(0.1);
        assert!(!p.expired());
        p.update(0.1);
        assert!(!p.expired());
        p.update(0.1);
        assert!(p.expired());

        let forever = Projectile::new(Vec3::new_zero(), Vec3::new_zero());
        assert!(!forever.expired());
    }
}
