//! Cooperative single-threaded frame loop
//!
//! Drives a [`ScrollEngine`] backed by a [`FrameQueue`], yielding to the
//! tokio runtime between frames. Subscribers need not be `Send`; run the
//! loop on a current-thread runtime.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::config::FrameConfig;
use crate::engine::{FrameQueue, Page, ProgressSnapshot, ScrollEngine};

pub struct FrameLoop<P> {
    engine: ScrollEngine<P, FrameQueue>,
    period: Duration,
}

impl<P: Page> FrameLoop<P> {
    pub fn new(engine: ScrollEngine<P, FrameQueue>, frame: &FrameConfig) -> Self {
        Self {
            engine,
            period: frame.tick_duration(),
        }
    }

    pub fn engine(&self) -> &ScrollEngine<P, FrameQueue> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ScrollEngine<P, FrameQueue> {
        &mut self.engine
    }

    pub fn into_engine(self) -> ScrollEngine<P, FrameQueue> {
        self.engine
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait one frame period, then run the due tick if any
    pub async fn step(&mut self) -> Option<ProgressSnapshot> {
        tokio::time::sleep(self.period).await;
        self.run_once()
    }

    /// Run frames at the configured rate until the engine goes idle
    ///
    /// Returns the number of frames broadcast.
    pub async fn run_until_idle(&mut self) -> usize {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        interval.tick().await;

        let mut frames = 0;
        while self.engine.scheduler_mut().pending() > 0 {
            interval.tick().await;
            if self.run_once().is_some() {
                frames += 1;
            }
        }
        debug!(frames, "Frame loop idle");
        frames
    }

    /// Run every pending frame back to back without waiting
    pub fn run_immediate(&mut self) -> usize {
        let mut frames = 0;
        while self.engine.scheduler_mut().pending() > 0 {
            if self.run_once().is_some() {
                frames += 1;
            }
        }
        frames
    }

    /// Run the next due tick immediately, if any
    pub fn run_once(&mut self) -> Option<ProgressSnapshot> {
        let handle = self.engine.scheduler_mut().take_due()?;
        self.engine.tick(handle)
    }
}
