//! Cinematic scroll engine
//!
//! Turns raw wheel input into an eased scroll position, normalizes it to a
//! progress value, and broadcasts that value to subscribers every frame.
//!
//! # Architecture
//!
//! ## L4 Atomic Layer
//! - `integrator` - Damped scalar shared by every axis
//! - `host` - Page and tick scheduler capabilities
//! - `state` - State views and the per-frame snapshot
//!
//! ## L3 Molecular Layer
//! - `bus` - Subscriber registry and fan-out
//! - `horizontal` - Vertical/horizontal mode state machine
//!
//! ## L2 Organism Layer
//! - `scroll` - The engine combining the above
//!
//! # Usage
//!
//! ```
//! use cinescroll_core::config::CinematicConfig;
//! use cinescroll_core::engine::{FrameQueue, PageMetrics, ScrollEngine, SimulatedPage, WheelInput};
//!
//! let page = SimulatedPage::new(PageMetrics::new(4000.0, 1000.0, 1600.0));
//! let mut engine = ScrollEngine::cinematic(page, FrameQueue::new(), &CinematicConfig::default());
//! engine.init();
//!
//! let sub = engine.subscribe(|snap| {
//!     let _opacity = 1.0 - snap.progress;
//! });
//!
//! engine.wheel(WheelInput::new(120.0));
//! while let Some(handle) = engine.scheduler_mut().take_due() {
//!     engine.tick(handle);
//! }
//!
//! sub.unsubscribe();
//! engine.dispose();
//! ```

// L4 Atomic Layer
pub mod host;
pub mod integrator;
pub mod state;

// L3 Molecular Layer
pub mod bus;
pub mod horizontal;

// L2 Organism Layer
pub mod scroll;

pub use bus::{BroadcastReport, ScrollBus, Subscription};
pub use horizontal::{HorizontalMode, Transition, WheelDirection};
pub use host::{FrameQueue, Page, PageMetrics, SimulatedPage, TickHandle, TickScheduler};
pub use integrator::{DampedScalar, DEFAULT_EASE, DEFAULT_STOP_THRESHOLD};
pub use scroll::{InputDisposition, ScrollEngine, WheelInput};
pub use state::{AxisMode, HorizontalState, ProgressSnapshot, ScrollState};
