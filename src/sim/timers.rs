/// A countdown for transient feedback: hit flashes, staff shake, death fades.
/// Triggering again restarts it; it never stacks.
#[derive(Clone, Debug, PartialEq)]
pub struct Countdown {
    remaining: f32,
    duration: f32,
}

impl Countdown {
    /// Starts idle.
    pub fn new(duration: f32) -> Self {
        Self {
            remaining: 0.,
            duration,
        }
    }

    pub fn trigger(&mut self) {
        self.remaining = self.duration;
    }

    /// Decrements, clamping at 0.
    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.);
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// 1 right after triggering, falling to 0.
    pub fn fraction(&self) -> f32 {
        if self.duration <= 0. {
            return 0.;
        }
        self.remaining / self.duration
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn retrigger_resets_rather_than_stacks() {
        let mut flash = Countdown::new(0.3);
        flash.trigger();
        flash.tick(0.1);
        flash.trigger();

        assert_relative_eq!(flash.remaining(), 0.3);
        assert_relative_eq!(flash.fraction(), 1.);
    }

    #[test]
    fn clamps_at_zero() {
        let mut flash = Countdown::new(0.3);
        flash.trigger();
        flash.tick(0.2);
        assert!(flash.is_active());
        flash.tick(0.2);

        assert!(!flash.is_active());
        assert_eq!(flash.remaining(), 0.);
        assert_eq!(flash.fraction(), 0.);
    }

    #[test]
    fn starts_idle() {
        let shake = Countdown::new(0.2);
        assert!(!shake.is_active());
        assert_eq!(Countdown::new(0.).fraction(), 0.);
    }
}
