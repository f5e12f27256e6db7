//! L2 Organism Layer: The scroll engine
//!
//! Intercepts wheel input, eases the scroll position toward its target one
//! frame at a time, and broadcasts a [`ProgressSnapshot`] to subscribers
//! after every frame. Two flavours share the same code:
//!
//! - **cinematic**: broadcast only; consumers apply their own transforms.
//! - **paged**: also owns the native scroll offset and switches into a
//!   horizontal gallery mode near the end of the page.
//!
//! At most one tick is ever pending. The frame loop stops itself once
//! momentum decays below the stop threshold and restarts on the next input.

use tracing::{debug, trace};

use super::bus::{ScrollBus, Subscription};
use super::horizontal::{HorizontalMode, Transition, WheelDirection};
use super::host::{Page, TickHandle, TickScheduler};
use super::integrator::DampedScalar;
use super::state::{AxisMode, HorizontalState, ProgressSnapshot, ScrollState};
use crate::config::{CinematicConfig, PagedConfig};
use crate::{Error, Result};

/// Raw wheel event from the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelInput {
    /// Positive scrolls forward (down the page)
    pub delta_y: f64,
}

impl WheelInput {
    pub fn new(delta_y: f64) -> Self {
        Self { delta_y }
    }
}

/// What the host should do with the event's default action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDisposition {
    /// The engine took the event; suppress native scrolling
    Consumed,
    /// The engine is not live; let the host handle it
    Ignored,
}

pub struct ScrollEngine<P, S> {
    page: P,
    scheduler: S,
    bus: ScrollBus,
    vertical: DampedScalar,
    horizontal: Option<HorizontalMode>,
    sensitivity: f64,
    stop_threshold: f64,
    /// Write `current` back to the page every frame
    owns_native_scroll: bool,
    pending: Option<TickHandle>,
    live: bool,
    debug: bool,
    last_direction: Option<WheelDirection>,
    frames: u64,
}

impl<P: Page, S: TickScheduler> ScrollEngine<P, S> {
    /// Broadcast-only engine
    pub fn cinematic(page: P, scheduler: S, config: &CinematicConfig) -> Self {
        Self {
            page,
            scheduler,
            bus: ScrollBus::new(),
            vertical: DampedScalar::new(config.ease),
            horizontal: None,
            sensitivity: config.sensitivity,
            stop_threshold: config.stop_threshold,
            owns_native_scroll: false,
            pending: None,
            live: false,
            debug: false,
            last_direction: None,
            frames: 0,
        }
    }

    /// Engine that owns the page offset and pages horizontally
    pub fn paged(page: P, scheduler: S, config: &PagedConfig) -> Self {
        Self {
            page,
            scheduler,
            bus: ScrollBus::new(),
            vertical: DampedScalar::new(config.ease),
            horizontal: Some(HorizontalMode::new(config)),
            sensitivity: config.sensitivity,
            stop_threshold: config.stop_threshold,
            owns_native_scroll: true,
            pending: None,
            live: false,
            debug: config.debug,
            last_direction: None,
            frames: 0,
        }
    }

    /// Start intercepting input, seeded from the page's real offset
    pub fn init(&mut self) {
        let max = self.page.metrics().max_scrollable();
        self.vertical.seed(self.page.scroll_offset(), max);
        if let Some(horizontal) = self.horizontal.as_mut() {
            horizontal.exit();
        }
        self.last_direction = None;
        self.live = true;
        debug!(
            offset = self.vertical.current(),
            max_scrollable = max,
            paged = self.horizontal.is_some(),
            "Scroll engine initialized"
        );
    }

    /// Stop intercepting input and cancel any pending frame
    ///
    /// Subscribers are dropped and a tick already handed out by the
    /// scheduler becomes a no-op.
    pub fn dispose(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_tick(handle);
        }
        if self.live {
            debug!(frames = self.frames, "Scroll engine disposed");
        }
        self.live = false;
        self.bus.clear();
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.live
    }

    #[inline]
    pub fn has_pending_tick(&self) -> bool {
        self.pending.is_some()
    }

    /// Frames run since construction
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Shared bus, for consumers that subscribe without holding the engine
    pub fn bus(&self) -> &ScrollBus {
        &self.bus
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ProgressSnapshot) + 'static,
    {
        self.bus.subscribe(callback)
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn mode(&self) -> AxisMode {
        self.horizontal
            .as_ref()
            .map(HorizontalMode::mode)
            .unwrap_or_default()
    }

    pub fn state(&self) -> ScrollState {
        ScrollState {
            current: self.vertical.current(),
            target: self.vertical.target(),
            velocity: self.vertical.velocity(),
            momentum: self.vertical.momentum(),
        }
    }

    /// Gallery axis state; inactive and zeroed for the cinematic engine
    pub fn horizontal(&self) -> HorizontalState {
        self.horizontal
            .as_ref()
            .map(HorizontalMode::state)
            .unwrap_or_default()
    }

    /// Progress values as of the last frame
    pub fn snapshot(&self) -> ProgressSnapshot {
        let metrics = self.page.metrics();
        let (horizontal_progress, horizontal_active) = match &self.horizontal {
            Some(h) => (h.progress(&metrics), h.is_active()),
            None => (0.0, false),
        };
        ProgressSnapshot {
            progress: self.vertical.normalized(metrics.max_scrollable()),
            momentum: self.vertical.momentum(),
            horizontal_progress,
            horizontal_active,
        }
    }

    /// Change the horizontal activation threshold at runtime
    pub fn set_threshold(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(Error::InvalidThreshold(value));
        }
        let horizontal = self
            .horizontal
            .as_mut()
            .ok_or_else(|| Error::Other("cinematic engine has no horizontal mode".to_string()))?;
        horizontal.set_enter_threshold(value);
        debug!(threshold = value, "Horizontal threshold updated");
        Ok(())
    }

    /// Toggle per-frame diagnostics
    pub fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
    }

    /// Handle one wheel event
    pub fn wheel(&mut self, input: WheelInput) -> InputDisposition {
        if !self.live {
            return InputDisposition::Ignored;
        }
        let Some(direction) = WheelDirection::from_delta(input.delta_y) else {
            return InputDisposition::Consumed;
        };
        self.last_direction = Some(direction);

        let delta = input.delta_y * self.sensitivity;
        let metrics = self.page.metrics();
        let max = metrics.max_scrollable();

        match self.horizontal.as_mut() {
            Some(horizontal) => {
                let progress = self.vertical.normalized(max);
                horizontal.evaluate(progress, Some(direction));
                if horizontal.is_active() {
                    horizontal.nudge(delta, &metrics);
                } else {
                    self.vertical.nudge_target(delta, max);
                }
            }
            None => self.vertical.nudge_target(delta, max),
        }

        self.request_tick();
        InputDisposition::Consumed
    }

    /// Animate to an absolute offset, e.g. for in-page navigation
    pub fn scroll_to(&mut self, offset: f64) {
        if !self.live {
            return;
        }
        let max = self.page.metrics().max_scrollable();
        let delta = offset - self.vertical.target();
        self.vertical.nudge_target(delta, max);
        self.request_tick();
    }

    /// Return to the top of the page and leave horizontal mode
    ///
    /// Always schedules one frame so subscribers see the reset even when
    /// nothing is moving.
    pub fn escape(&mut self) {
        if !self.live {
            return;
        }
        if let Some(horizontal) = self.horizontal.as_mut() {
            horizontal.exit();
        }
        self.vertical.reset();
        self.last_direction = None;
        if self.owns_native_scroll {
            self.page.set_scroll_offset(0.0);
        }
        debug!("Escape: returned to start");
        self.request_tick();
    }

    /// Run one frame
    ///
    /// Returns the broadcast snapshot, or `None` when the engine is not live
    /// or the handle is not the pending one.
    pub fn tick(&mut self, handle: TickHandle) -> Option<ProgressSnapshot> {
        if !self.live {
            return None;
        }
        if self.pending != Some(handle) {
            trace!(handle = handle.0, "Ignoring stale tick");
            return None;
        }
        self.pending = None;

        let metrics = self.page.metrics();
        let max = metrics.max_scrollable();

        self.vertical.clamp_to(max);
        self.vertical.step();
        if let Some(horizontal) = self.horizontal.as_mut() {
            horizontal.step(&metrics);
        }

        if self.owns_native_scroll {
            self.page.set_scroll_offset(self.vertical.current());
        }

        if let Some(horizontal) = self.horizontal.as_mut() {
            let progress = self.vertical.normalized(max);
            if horizontal.evaluate(progress, self.last_direction) == Some(Transition::Exited) {
                self.last_direction = None;
            }
        }

        let snapshot = self.snapshot();
        self.frames += 1;

        if self.debug {
            debug!(
                frame = self.frames,
                current = self.vertical.current(),
                target = self.vertical.target(),
                progress = snapshot.progress,
                momentum = snapshot.momentum,
                horizontal_progress = snapshot.horizontal_progress,
                horizontal_active = snapshot.horizontal_active,
                "Scroll frame"
            );
        }

        self.bus.broadcast(&snapshot);

        if self.is_moving() {
            self.request_tick();
        }

        Some(snapshot)
    }

    fn is_moving(&self) -> bool {
        !self.vertical.is_settled(self.stop_threshold)
            || self
                .horizontal
                .as_ref()
                .is_some_and(|h| h.momentum() > self.stop_threshold)
    }

    fn request_tick(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(self.scheduler.schedule_tick());
        }
    }
}

impl<P, S> Drop for ScrollEngine<P, S> {
    fn drop(&mut self) {
        self.live = false;
        self.bus.clear();
    }
}

impl<P, S> std::fmt::Debug for ScrollEngine<P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollEngine")
            .field("vertical", &self.vertical)
            .field("horizontal", &self.horizontal)
            .field("live", &self.live)
            .field("pending", &self.pending)
            .field("frames", &self.frames)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::host::{FrameQueue, PageMetrics, SimulatedPage};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn cinematic(document_height: f64) -> ScrollEngine<SimulatedPage, FrameQueue> {
        let page = SimulatedPage::new(PageMetrics::new(document_height, 1000.0, 1600.0));
        let mut engine =
            ScrollEngine::cinematic(page, FrameQueue::new(), &CinematicConfig::default());
        engine.init();
        engine
    }

    fn paged() -> ScrollEngine<SimulatedPage, FrameQueue> {
        let page = SimulatedPage::new(PageMetrics::new(2000.0, 1000.0, 400.0));
        let mut engine = ScrollEngine::paged(page, FrameQueue::new(), &PagedConfig::default());
        engine.init();
        engine
    }

    fn drain<P: Page>(engine: &mut ScrollEngine<P, FrameQueue>) -> usize {
        let mut frames = 0;
        while let Some(handle) = engine.scheduler_mut().take_due() {
            engine.tick(handle);
            frames += 1;
        }
        frames
    }

    #[test]
    fn test_not_live_before_init() {
        let page = SimulatedPage::new(PageMetrics::new(3000.0, 1000.0, 1600.0));
        let mut engine =
            ScrollEngine::cinematic(page, FrameQueue::new(), &CinematicConfig::default());
        assert_eq!(engine.wheel(WheelInput::new(100.0)), InputDisposition::Ignored);
        assert!(!engine.has_pending_tick());
    }

    #[test]
    fn test_init_seeds_from_page_offset() {
        let page = SimulatedPage::new(PageMetrics::new(3000.0, 1000.0, 1600.0)).with_offset(750.0);
        let mut engine =
            ScrollEngine::cinematic(page, FrameQueue::new(), &CinematicConfig::default());
        engine.init();
        let state = engine.state();
        assert_eq!(state.current, 750.0);
        assert_eq!(state.target, 750.0);
        assert!((engine.snapshot().progress - 0.375).abs() < 1e-9);
    }

    #[test]
    fn test_wheel_scales_by_sensitivity() {
        let mut engine = cinematic(3000.0);
        assert_eq!(engine.wheel(WheelInput::new(100.0)), InputDisposition::Consumed);
        assert!((engine.state().target - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_pending_tick() {
        let mut engine = cinematic(3000.0);
        engine.wheel(WheelInput::new(100.0));
        engine.wheel(WheelInput::new(100.0));
        engine.wheel(WheelInput::new(100.0));
        assert_eq!(engine.scheduler_mut().pending(), 1);
    }

    #[test]
    fn test_loop_quiesces() {
        let mut engine = cinematic(3000.0);
        engine.wheel(WheelInput::new(200.0));
        let frames = drain(&mut engine);
        assert!(frames > 1);
        assert!(!engine.has_pending_tick());
        assert!(engine.state().momentum <= 0.1);

        // Restarts lazily on the next input
        engine.wheel(WheelInput::new(50.0));
        assert!(engine.has_pending_tick());
    }

    #[test]
    fn test_cinematic_never_writes_page() {
        let mut engine = cinematic(3000.0);
        engine.wheel(WheelInput::new(300.0));
        drain(&mut engine);
        assert_eq!(engine.page().writes(), 0);
        assert_eq!(engine.page().scroll_offset(), 0.0);
    }

    #[test]
    fn test_paged_writes_page_every_frame() {
        let mut engine = paged();
        engine.wheel(WheelInput::new(300.0));
        let frames = drain(&mut engine);
        assert_eq!(engine.page().writes(), frames as u64);
        assert!((engine.page().scroll_offset() - engine.state().current).abs() < 1e-9);
    }

    #[test]
    fn test_zero_height_page() {
        let mut engine = cinematic(1000.0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let _sub = engine.subscribe(move |snap| s.borrow_mut().push(snap.progress));

        engine.wheel(WheelInput::new(500.0));
        engine.wheel(WheelInput::new(-500.0));
        drain(&mut engine);
        assert_eq!(engine.snapshot().progress, 0.0);
        assert!(seen.borrow().iter().all(|p| *p == 0.0));
    }

    #[test]
    fn test_dispose_cancels_pending_and_in_flight() {
        let mut engine = cinematic(3000.0);
        let hits = Rc::new(RefCell::new(0));
        let h = hits.clone();
        engine.subscribe(move |_| *h.borrow_mut() += 1).detach();

        engine.wheel(WheelInput::new(100.0));
        let in_flight = engine.scheduler_mut().take_due().unwrap();
        engine.dispose();

        assert_eq!(engine.tick(in_flight), None);
        assert_eq!(*hits.borrow(), 0);
        assert_eq!(engine.scheduler_mut().pending(), 0);
        assert_eq!(engine.wheel(WheelInput::new(100.0)), InputDisposition::Ignored);
    }

    #[test]
    fn test_stale_handle_ignored() {
        let mut engine = cinematic(3000.0);
        assert_eq!(engine.tick(TickHandle(42)), None);
        assert_eq!(engine.frames(), 0);
    }

    #[test]
    fn test_set_threshold() {
        let mut engine = paged();
        assert!(engine.set_threshold(0.4).is_ok());
        assert!(matches!(engine.set_threshold(1.2), Err(Error::InvalidThreshold(_))));
        assert!(matches!(engine.set_threshold(f64::NAN), Err(Error::InvalidThreshold(_))));

        let mut simple = cinematic(3000.0);
        assert!(matches!(simple.set_threshold(0.4), Err(Error::Other(_))));
    }

    #[test]
    fn test_scroll_to_clamps() {
        let mut engine = cinematic(3000.0);
        engine.scroll_to(5000.0);
        assert_eq!(engine.state().target, 2000.0);
        engine.scroll_to(500.0);
        assert_eq!(engine.state().target, 500.0);
    }

    #[test]
    fn test_resize_reclamps_on_next_frame() {
        let mut engine = cinematic(3000.0);
        engine.scroll_to(1800.0);
        drain(&mut engine);
        engine
            .page_mut()
            .resize(PageMetrics::new(1500.0, 1000.0, 1600.0));
        engine.wheel(WheelInput::new(10.0));
        drain(&mut engine);
        let state = engine.state();
        assert!(state.current <= 500.0);
        assert!(state.target <= 500.0);
    }
}
