//! L3 Molecular Layer: Horizontal gallery mode
//!
//! Once vertical progress passes the enter threshold while the user keeps
//! scrolling forward, wheel input drives a second axis instead of the page.
//! Scrolling backward always leaves the mode at once; falling below
//! `enter_threshold - exit_hysteresis` leaves it as well.

use tracing::debug;

use super::host::PageMetrics;
use super::integrator::DampedScalar;
use super::state::{AxisMode, HorizontalState};
use crate::config::PagedConfig;

/// Direction of the most recent wheel input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDirection {
    /// Increasing offset
    Forward,
    Backward,
}

impl WheelDirection {
    /// `None` for a zero or non-finite delta
    pub fn from_delta(delta: f64) -> Option<Self> {
        if !delta.is_finite() || delta == 0.0 {
            None
        } else if delta > 0.0 {
            Some(Self::Forward)
        } else {
            Some(Self::Backward)
        }
    }
}

/// A mode change produced by the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Entered,
    Exited,
}

#[derive(Debug, Clone)]
pub struct HorizontalMode {
    axis: DampedScalar,
    mode: AxisMode,
    enter_threshold: f64,
    exit_hysteresis: f64,
    gallery_span: f64,
}

impl HorizontalMode {
    pub fn new(config: &PagedConfig) -> Self {
        Self {
            axis: DampedScalar::new(config.ease),
            mode: AxisMode::Vertical,
            enter_threshold: config.enter_threshold,
            exit_hysteresis: config.exit_hysteresis,
            gallery_span: config.gallery_span,
        }
    }

    #[inline]
    pub fn mode(&self) -> AxisMode {
        self.mode
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.mode == AxisMode::Horizontal
    }

    pub fn enter_threshold(&self) -> f64 {
        self.enter_threshold
    }

    pub fn set_enter_threshold(&mut self, value: f64) {
        self.enter_threshold = value;
    }

    /// Progress below which horizontal mode is left
    pub fn exit_threshold(&self) -> f64 {
        (self.enter_threshold - self.exit_hysteresis).max(0.0)
    }

    /// Horizontal travel for the given page
    pub fn max_extent(&self, metrics: &PageMetrics) -> f64 {
        (metrics.viewport_width * self.gallery_span).max(0.0)
    }

    pub fn state(&self) -> HorizontalState {
        HorizontalState {
            current: self.axis.current(),
            target: self.axis.target(),
            velocity: self.axis.velocity(),
            is_active: self.is_active(),
        }
    }

    pub fn momentum(&self) -> f64 {
        self.axis.momentum()
    }

    pub fn progress(&self, metrics: &PageMetrics) -> f64 {
        self.axis.normalized(self.max_extent(metrics))
    }

    /// Feed forward wheel travel into the gallery
    pub fn nudge(&mut self, delta: f64, metrics: &PageMetrics) {
        let max = self.max_extent(metrics);
        self.axis.nudge_target(delta, max);
    }

    /// Integrate one frame
    pub fn step(&mut self, metrics: &PageMetrics) {
        self.axis.clamp_to(self.max_extent(metrics));
        self.axis.step();
    }

    /// Apply the transition rules for the current progress and direction
    pub fn evaluate(
        &mut self,
        progress: f64,
        direction: Option<WheelDirection>,
    ) -> Option<Transition> {
        match self.mode {
            AxisMode::Vertical => {
                if progress >= self.enter_threshold
                    && direction == Some(WheelDirection::Forward)
                {
                    self.enter();
                    Some(Transition::Entered)
                } else {
                    None
                }
            }
            AxisMode::Horizontal => {
                if progress < self.exit_threshold()
                    || direction == Some(WheelDirection::Backward)
                {
                    self.exit();
                    Some(Transition::Exited)
                } else {
                    None
                }
            }
        }
    }

    pub fn enter(&mut self) {
        self.mode = AxisMode::Horizontal;
        self.axis.reset();
        debug!(threshold = self.enter_threshold, "Entered horizontal mode");
    }

    /// Leave horizontal mode; the gallery returns to its start
    pub fn exit(&mut self) {
        if self.mode == AxisMode::Horizontal {
            debug!("Exited horizontal mode");
        }
        self.mode = AxisMode::Vertical;
        self.axis.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> PageMetrics {
        PageMetrics::new(3000.0, 1000.0, 400.0)
    }

    #[test]
    fn test_direction_from_delta() {
        assert_eq!(WheelDirection::from_delta(3.0), Some(WheelDirection::Forward));
        assert_eq!(WheelDirection::from_delta(-3.0), Some(WheelDirection::Backward));
        assert_eq!(WheelDirection::from_delta(0.0), None);
        assert_eq!(WheelDirection::from_delta(f64::NAN), None);
    }

    #[test]
    fn test_enter_requires_forward() {
        let mut mode = HorizontalMode::new(&PagedConfig::default());
        assert_eq!(mode.evaluate(0.8, Some(WheelDirection::Backward)), None);
        assert_eq!(mode.evaluate(0.8, None), None);
        assert_eq!(mode.evaluate(0.6, Some(WheelDirection::Forward)), None);
        assert_eq!(
            mode.evaluate(0.7, Some(WheelDirection::Forward)),
            Some(Transition::Entered)
        );
        assert!(mode.is_active());
    }

    #[test]
    fn test_hysteresis_band() {
        let mut mode = HorizontalMode::new(&PagedConfig::default());
        mode.enter();
        // Inside the band: stays horizontal while moving forward
        assert_eq!(mode.evaluate(0.66, Some(WheelDirection::Forward)), None);
        assert!(mode.is_active());
        assert_eq!(
            mode.evaluate(0.64, Some(WheelDirection::Forward)),
            Some(Transition::Exited)
        );
        assert!(!mode.is_active());
    }

    #[test]
    fn test_backward_exits_and_resets() {
        let mut mode = HorizontalMode::new(&PagedConfig::default());
        mode.enter();
        mode.nudge(200.0, &metrics());
        mode.step(&metrics());
        assert!(mode.state().current > 0.0);

        assert_eq!(
            mode.evaluate(0.95, Some(WheelDirection::Backward)),
            Some(Transition::Exited)
        );
        let state = mode.state();
        assert_eq!(state.current, 0.0);
        assert_eq!(state.target, 0.0);
        assert!(!state.is_active);
    }

    #[test]
    fn test_extent_is_multiple_of_viewport_width() {
        let mut mode = HorizontalMode::new(&PagedConfig::default());
        assert_eq!(mode.max_extent(&metrics()), 1200.0);
        mode.enter();
        mode.nudge(10_000.0, &metrics());
        assert_eq!(mode.state().target, 1200.0);
    }
}
