//! Firing: edge-triggered input, cooldown, and the staff's recoil shake.

use crate::{lin_alg::Vec3, sim::timers::Countdown};

/// Detects the press edge of a held input, so holding a button fires once.
#[derive(Clone, Debug, Default)]
pub struct Trigger {
    was_down: bool,
}

impl Trigger {
    /// True only on the frame `down` goes from false to true.
    pub fn pressed(&mut self, down: bool) -> bool {
        let result = down && !self.was_down;
        self.was_down = down;
        result
    }
}

/// Outcome of pulling the trigger.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FireResult {
    Fired,
    /// Seconds until the staff is ready.
    CoolingDown(f32),
}

#[derive(Clone, Debug)]
pub struct Staff {
    pub cooldown: f32,
    /// Time of the last shot, on the caller's clock.
    last_shot: Option<f32>,
    pub shake: Countdown,
    pub shake_amount: f32,
}

impl Staff {
    pub fn new(cooldown: f32, shake_duration: f32, shake_amount: f32) -> Self {
        Self {
            cooldown,
            last_shot: None,
            shake: Countdown::new(shake_duration),
            shake_amount,
        }
    }

    /// Fires if off cooldown. Firing starts the shake.
    pub fn try_fire(&mut self, now: f32) -> FireResult {
        if let Some(last) = self.last_shot {
            let ready_at = last + self.cooldown;
            if now < ready_at {
                return FireResult::CoolingDown(ready_at - now);
            }
        }

        self.last_shot = Some(now);
        self.shake.trigger();
        FireResult::Fired
    }

    /// 0 when ready, 1 right after firing.
    pub fn cooldown_fraction(&self, now: f32) -> f32 {
        match self.last_shot {
            Some(last) if self.cooldown > 0. => (1. - (now - last) / self.cooldown).clamp(0., 1.),
            _ => 0.,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.shake.tick(dt);
    }

    /// View-space jitter, fading out with the shake timer.
    pub fn shake_offset(&self, t: f32) -> Vec3 {
        if !self.shake.is_active() {
            return Vec3::new_zero();
        }
        let k = self.shake.fraction() * self.shake_amount;

        Vec3::new((t * 50.).sin() * k, (t * 60.).cos() * k, 0.)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn trigger_fires_on_press_edge_only() {
        let mut trigger = Trigger::default();
        assert!(trigger.pressed(true));
        assert!(!trigger.pressed(true));
        assert!(!trigger.pressed(false));
        assert!(trigger.pressed(true));
    }

    #[test]
    fn cooldown_blocks_rapid_fire() {
        let mut staff = Staff::new(0.5, 0.2, 0.05);

        assert_eq!(staff.try_fire(1.), FireResult::Fired);
        match staff.try_fire(1.2) {
            FireResult::CoolingDown(left) => assert_relative_eq!(left, 0.3, epsilon = 1e-6),
            FireResult::Fired => panic!("fired during cooldown"),
        }
        assert_eq!(staff.try_fire(1.5), FireResult::Fired);
    }

    #[test]
    fn shake_fades_out() {
        let mut staff = Staff::new(0.5, 0.2, 0.05);
        assert_eq!(staff.shake_offset(1.), Vec3::new_zero());

        staff.try_fire(0.);
        let t = 0.013;
        let offset = staff.shake_offset(t);
        assert_relative_eq!(offset.x, (t * 50.).sin() * 0.05);
        assert_relative_eq!(offset.y, (t * 60.).cos() * 0.05);

        staff.update(0.25);
        assert_eq!(staff.shake_offset(t), Vec3::new_zero());
    }

    #[test]
    fn cooldown_fraction_range() {
        let mut staff = Staff::new(0.5, 0.2, 0.05);
        assert_eq!(staff.cooldown_fraction(0.), 0.);
        staff.try_fire(2.);
        assert_relative_eq!(staff.cooldown_fraction(2.), 1.);
        assert_relative_eq!(staff.cooldown_fraction(2.25), 0.5);
        assert_eq!(staff.cooldown_fraction(9.), 0.);
    }
}
