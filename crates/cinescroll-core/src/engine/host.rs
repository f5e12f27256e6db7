//! L4 Atomic Layer: Host capabilities the engine runs against
//!
//! The engine never touches a real window. It reads page geometry and the
//! native scroll offset through [`Page`], and asks for the next frame through
//! [`TickScheduler`].

use std::collections::VecDeque;

/// Geometry of the scrolled document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMetrics {
    pub document_height: f64,
    pub viewport_height: f64,
    pub viewport_width: f64,
}

impl PageMetrics {
    pub fn new(document_height: f64, viewport_height: f64, viewport_width: f64) -> Self {
        Self {
            document_height,
            viewport_height,
            viewport_width,
        }
    }

    /// Largest vertical offset; zero when the page fits the viewport
    #[inline]
    pub fn max_scrollable(&self) -> f64 {
        (self.document_height - self.viewport_height).max(0.0)
    }
}

/// The document being scrolled
///
/// The native scroll offset is single-writer: only an engine that owns the
/// page position calls [`Page::set_scroll_offset`].
pub trait Page {
    fn metrics(&self) -> PageMetrics;

    fn scroll_offset(&self) -> f64;

    fn set_scroll_offset(&mut self, offset: f64);
}

/// In-memory page used by the simulator and tests
#[derive(Debug, Clone)]
pub struct SimulatedPage {
    metrics: PageMetrics,
    scroll_offset: f64,
    writes: u64,
}

impl SimulatedPage {
    pub fn new(metrics: PageMetrics) -> Self {
        Self {
            metrics,
            scroll_offset: 0.0,
            writes: 0,
        }
    }

    /// Start at a given offset, as if the user had already scrolled
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.scroll_offset = offset.clamp(0.0, self.metrics.max_scrollable());
        self
    }

    /// Change document geometry (content loaded, window resized)
    pub fn resize(&mut self, metrics: PageMetrics) {
        self.metrics = metrics;
        self.scroll_offset = self.scroll_offset.clamp(0.0, metrics.max_scrollable());
    }

    /// Number of times the native offset was written
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl Page for SimulatedPage {
    fn metrics(&self) -> PageMetrics {
        self.metrics
    }

    fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll_offset = offset.clamp(0.0, self.metrics.max_scrollable());
        self.writes += 1;
    }
}

/// Identifies one scheduled tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(pub u64);

/// Schedules the engine's next frame
pub trait TickScheduler {
    fn schedule_tick(&mut self) -> TickHandle;

    fn cancel_tick(&mut self, handle: TickHandle);
}

/// FIFO tick queue, drained by whatever drives the frames
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    due: VecDeque<TickHandle>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop the next tick that is due
    pub fn take_due(&mut self) -> Option<TickHandle> {
        self.due.pop_front()
    }

    pub fn pending(&self) -> usize {
        self.due.len()
    }
}

impl TickScheduler for FrameQueue {
    fn schedule_tick(&mut self) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        self.due.push_back(handle);
        handle
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        self.due.retain(|h| *h != handle);
    }
}
