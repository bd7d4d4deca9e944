//! Sphere hit tests between projectiles and targets.

use crate::{lin_alg::Vec3, sim::projectile::Projectile};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Strictly inside; a point exactly on the surface is a miss.
pub fn is_hit(point: Vec3, center: Vec3, radius: f32) -> bool {
    point.distance(center) < radius
}

/// The first target in order that contains `point`. Not the closest.
pub fn first_hit(point: Vec3, targets: &[Sphere]) -> Option<usize> {
    targets
        .iter()
        .position(|t| is_hit(point, t.center, t.radius))
}

/// Removes projectiles that hit a target, left range, or expired, in that order of precedence.
/// Returns the target index of each hit, in projectile order.
pub fn resolve_projectiles(
    projectiles: &mut Vec<Projectile>,
    targets: &[Sphere],
    origin: Vec3,
    max_range: f32,
) -> Vec<usize> {
    let mut hits = Vec::new();

    retain_projectiles(projectiles, origin, max_range, |point| {
        match first_hit(point, targets) {
            Some(i) => {
                hits.push(i);
                true
            }
            None => false,
        }
    });

    hits
}

/// Like `resolve_projectiles`, but `hit` decides each projectile in order, and may change what
/// later ones can hit. Returns true from `hit` to consume the projectile.
pub fn retain_projectiles(
    projectiles: &mut Vec<Projectile>,
    origin: Vec3,
    max_range: f32,
    mut hit: impl FnMut(Vec3) -> bool,
) {
    projectiles.retain(|p| {
        if hit(p.position) {
            return false;
        }
        if p.position.distance(origin) > max_range {
            return false;
        }
        !p.expired()
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_is_exclusive() {
        let origin = Vec3::new_zero();

        assert!(is_hit(origin, Vec3::new(0., 0., 0.5), 1.));
        assert!(!is_hit(origin, Vec3::new(0., 0., 1.5), 1.));
        assert!(!is_hit(origin, Vec3::new(0., 0., 1.), 1.));
        assert!(!is_hit(origin, Vec3::new(0., 1., 0.), 1.));
    }

    #[test]
    fn first_match_not_closest() {
        let targets = [
            Sphere::new(Vec3::new(0., 0., 0.9), 1.),
            Sphere::new(Vec3::new(0., 0., 0.1), 1.),
        ];
        assert_eq!(first_hit(Vec3::new_zero(), &targets), Some(0));
        assert_eq!(first_hit(Vec3::new(0., 10., 0.), &targets), None);
    }

    #[test]
    fn hit_projectiles_are_removed_and_reported() {
        let targets = [
            Sphere::new(Vec3::new(0., 0., -10.), 1.),
            Sphere::new(Vec3::new(5., 0., -10.), 1.5),
        ];
        let mut projectiles = vec![
            Projectile::new(Vec3::new(5., 0., -9.), Vec3::new_zero()),
            Projectile::new(Vec3::new(0., 0., -5.), Vec3::new_zero()),
            Projectile::new(Vec3::new(0., 0., -10.2), Vec3::new_zero()),
        ];

        let hits = resolve_projectiles(&mut projectiles, &targets, Vec3::new_zero(), 50.);

        assert_eq!(hits, vec![1, 0]);
        assert_eq!(projectiles.len(), 1);
        assert_eq!(projectiles[0].position, Vec3::new(0., 0., -5.));
    }

    #[test]
    fn out_of_range_removed_without_hit() {
        let camera = Vec3::new(0., 3.5, 5.);
        let mut projectiles = vec![
            Projectile::new(Vec3::new(0., 3.5, -46.), Vec3::new(0., 0., -20.)),
            Projectile::new(Vec3::new(0., 3.5, -44.), Vec3::new(0., 0., -20.)),
        ];

        let hits = resolve_projectiles(&mut projectiles, &[], camera, 50.);

        assert!(hits.is_empty());
        assert_eq!(projectiles.len(), 1);
        assert_eq!(projectiles[0].position.z, -44.);
    }

    #[test]
    fn hit_decision_sees_earlier_hits() {
        let mut projectiles = vec![
            Projectile::new(Vec3::new(0., 0., -10.), Vec3::new_zero()),
            Projectile::new(Vec3::new(0., 0., -10.), Vec3::new_zero()),
            Projectile::new(Vec3::new(0., 0., -10.), Vec3::new_zero()),
        ];

        // A target that absorbs one shot, then is gone.
        let mut shots_left = 1;
        retain_projectiles(&mut projectiles, Vec3::new_zero(), 50., |point| {
            if shots_left > 0 && is_hit(point, Vec3::new(0., 0., -10.), 1.) {
                shots_left -= 1;
                true
            } else {
                false
            }
        });

        assert_eq!(shots_left, 0);
        assert_eq!(projectiles.len(), 2);
    }

    #[test]
    fn hit_takes_precedence_over_range() {
        let far_target = [Sphere::new(Vec3::new(0., 0., -60.), 2.)];
        let mut projectiles = vec![Projectile::new(Vec3::new(0., 0., -60.5), Vec3::new_zero())];

        let hits = resolve_projectiles(&mut projectiles, &far_target, Vec3::new_zero(), 50.);

        assert_eq!(hits, vec![0]);
        assert!(projectiles.is_empty());
    }

    #[test]
    fn expired_projectiles_removed() {
        let mut projectiles = vec![
            Projectile::new(Vec3::new_zero(), Vec3::new_zero()).with_life(0.),
            Projectile::new(Vec3::new_zero(), Vec3::new_zero()).with_life(1.),
        ];

        resolve_projectiles(&mut projectiles, &[], Vec3::new_zero(), 100.);

        assert_eq!(projectiles.len(), 1);
        assert_eq!(projectiles[0].life, Some(1.));
    }
}
