pub mod config;
pub mod content;
pub mod effects;
pub mod engine;
pub mod error;
pub mod og;
pub mod runtime;

pub use config::{AppConfig, CinematicConfig, PagedConfig, SiteConfig};
pub use engine::{
    AxisMode, InputDisposition, Page, PageMetrics, ProgressSnapshot, ScrollBus, ScrollEngine,
    SimulatedPage, Subscription, TickHandle, TickScheduler, WheelInput,
};
pub use error::{Error, Result};
pub use runtime::FrameLoop;
