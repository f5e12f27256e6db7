//! L4 Atomic Layer: Damped scalar integrator
//!
//! Moves a value toward its target by a fixed fraction of the remaining
//! distance each frame. Convergence is exponential and never overshoots
//! for `ease` in (0, 1].

/// Default fraction of the remaining distance covered per frame
pub const DEFAULT_EASE: f64 = 0.08;

/// Default momentum below which an axis counts as settled
pub const DEFAULT_STOP_THRESHOLD: f64 = 0.1;

/// One eased axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DampedScalar {
    current: f64,
    target: f64,
    velocity: f64,
    ease: f64,
}

impl Default for DampedScalar {
    fn default() -> Self {
        Self::new(DEFAULT_EASE)
    }
}

impl DampedScalar {
    pub fn new(ease: f64) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            velocity: 0.0,
            ease: ease.clamp(f64::MIN_POSITIVE, 1.0),
        }
    }

    #[inline]
    pub fn current(&self) -> f64 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Delta applied to `current` by the last step
    #[inline]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    #[inline]
    pub fn momentum(&self) -> f64 {
        self.velocity.abs()
    }

    #[inline]
    pub fn ease(&self) -> f64 {
        self.ease
    }

    #[inline]
    pub fn is_settled(&self, stop_threshold: f64) -> bool {
        self.momentum() <= stop_threshold
    }

    /// Advance one frame and return the applied velocity
    pub fn step(&mut self) -> f64 {
        self.velocity = (self.target - self.current) * self.ease;
        self.current += self.velocity;
        self.velocity
    }

    /// Shift the target by `delta`, clamped to `[0, max]`
    pub fn nudge_target(&mut self, delta: f64, max: f64) {
        self.target = clamp_offset(self.target + delta, max);
    }

    /// Re-clamp both ends after the scrollable extent changed
    pub fn clamp_to(&mut self, max: f64) {
        self.target = clamp_offset(self.target, max);
        self.current = clamp_offset(self.current, max);
    }

    /// Place current and target at the same offset without animating
    pub fn seed(&mut self, value: f64, max: f64) {
        let value = clamp_offset(value, max);
        self.current = value;
        self.target = value;
        self.velocity = 0.0;
    }

    pub fn reset(&mut self) {
        self.current = 0.0;
        self.target = 0.0;
        self.velocity = 0.0;
    }

    /// `current / max` in [0, 1]; zero when there is nothing to scroll
    pub fn normalized(&self, max: f64) -> f64 {
        if max > 0.0 {
            (self.current / max).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Clamp an offset into `[0, max]`; a non-positive extent collapses to 0
#[inline]
pub fn clamp_offset(value: f64, max: f64) -> f64 {
    if max > 0.0 && value.is_finite() {
        value.clamp(0.0, max)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_moves_fraction_of_distance() {
        let mut axis = DampedScalar::new(0.08);
        axis.nudge_target(100.0, 1000.0);
        let v = axis.step();
        assert!((v - 8.0).abs() < 1e-9);
        assert!((axis.current() - 8.0).abs() < 1e-9);
        assert!((axis.momentum() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_converges_without_overshoot() {
        let mut axis = DampedScalar::default();
        axis.nudge_target(500.0, 1000.0);
        let mut prev_momentum = f64::INFINITY;
        while !axis.is_settled(DEFAULT_STOP_THRESHOLD) {
            axis.step();
            assert!(axis.current() <= axis.target());
            assert!(axis.momentum() < prev_momentum);
            prev_momentum = axis.momentum();
        }
        assert!(axis.target() - axis.current() < 2.0);
    }

    #[test]
    fn test_target_clamped() {
        let mut axis = DampedScalar::default();
        axis.nudge_target(5000.0, 300.0);
        assert_eq!(axis.target(), 300.0);
        axis.nudge_target(-9000.0, 300.0);
        assert_eq!(axis.target(), 0.0);
    }

    #[test]
    fn test_zero_extent_collapses() {
        let mut axis = DampedScalar::default();
        axis.nudge_target(120.0, 0.0);
        assert_eq!(axis.target(), 0.0);
        axis.step();
        assert_eq!(axis.normalized(0.0), 0.0);
    }

    #[test]
    fn test_seed_and_clamp_to() {
        let mut axis = DampedScalar::default();
        axis.seed(400.0, 1000.0);
        assert_eq!(axis.current(), 400.0);
        assert_eq!(axis.target(), 400.0);
        axis.clamp_to(250.0);
        assert_eq!(axis.current(), 250.0);
        assert_eq!(axis.target(), 250.0);
        assert!((axis.normalized(250.0) - 1.0).abs() < 1e-9);
    }
}
