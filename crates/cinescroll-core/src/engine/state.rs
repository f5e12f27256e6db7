//! L4 Atomic Layer: Engine state views and the per-frame snapshot

use serde::Serialize;

/// Vertical axis state
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScrollState {
    pub current: f64,
    pub target: f64,
    pub velocity: f64,
    /// `|velocity|`, the "still moving" signal
    pub momentum: f64,
}

/// Horizontal gallery axis state
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HorizontalState {
    pub current: f64,
    pub target: f64,
    pub velocity: f64,
    pub is_active: bool,
}

/// Which axis wheel input currently drives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisMode {
    #[default]
    Vertical,
    Horizontal,
}

/// Values handed to every subscriber once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    /// Vertical progress in [0, 1]
    pub progress: f64,
    pub momentum: f64,
    /// Horizontal progress in [0, 1]; always 0 for the cinematic engine
    pub horizontal_progress: f64,
    pub horizontal_active: bool,
}
