//! Scroll-linked effects
//!
//! Each effect maps a [`ProgressSnapshot`] to a [`Transform`] for its own
//! element. Effects never write the page scroll offset.

use serde::Serialize;
use tracing::warn;

use crate::engine::{ProgressSnapshot, ScrollBus, Subscription};

/// Visual transform applied by a consumer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
    pub opacity: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale: 1.0,
            opacity: 1.0,
        }
    }
}

/// What the rendering environment supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Hardware-accelerated rendering context available
    pub accelerated_rendering: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            accelerated_rendering: true,
        }
    }
}

pub trait Effect {
    fn name(&self) -> &str;

    fn requires_acceleration(&self) -> bool {
        false
    }

    fn apply(&self, snapshot: &ProgressSnapshot) -> Transform;
}

/// Subscribe `effect` to `bus`, handing each frame's transform to `sink`
///
/// Returns `None`, with a warning, when the environment cannot run the
/// effect. The page keeps working without it.
pub fn attach<E, F>(
    bus: &ScrollBus,
    effect: E,
    capabilities: Capabilities,
    sink: F,
) -> Option<Subscription>
where
    E: Effect + 'static,
    F: Fn(Transform) + 'static,
{
    if effect.requires_acceleration() && !capabilities.accelerated_rendering {
        warn!(
            effect = effect.name(),
            "Accelerated rendering unavailable, effect disabled"
        );
        return None;
    }
    Some(bus.subscribe(move |snapshot| sink(effect.apply(snapshot))))
}

/// Hermite smoothstep on [edge0, edge1]
fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    if edge1 <= edge0 {
        return if x >= edge1 { 1.0 } else { 0.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Layer that drifts against the scroll direction
#[derive(Debug, Clone, Copy)]
pub struct Parallax {
    /// 0 moves with the page, 1 stays fixed
    pub depth: f64,
    /// Pixels travelled over the whole page
    pub travel: f64,
}

impl Effect for Parallax {
    fn name(&self) -> &str {
        "parallax"
    }

    fn apply(&self, snapshot: &ProgressSnapshot) -> Transform {
        Transform {
            translate_y: snapshot.progress * self.travel * self.depth,
            ..Default::default()
        }
    }
}

/// Fades and lifts an element in between two progress marks
#[derive(Debug, Clone, Copy)]
pub struct FadeReveal {
    pub start: f64,
    pub end: f64,
    /// Initial downward offset in pixels
    pub rise: f64,
}

impl Effect for FadeReveal {
    fn name(&self) -> &str {
        "fade-reveal"
    }

    fn apply(&self, snapshot: &ProgressSnapshot) -> Transform {
        let t = smoothstep(self.start, self.end, snapshot.progress);
        Transform {
            translate_y: (1.0 - t) * self.rise,
            scale: 0.95 + 0.05 * t,
            opacity: t,
            ..Default::default()
        }
    }
}

/// Horizontal strip of gallery panels driven by horizontal progress
#[derive(Debug, Clone, Copy)]
pub struct GalleryTrack {
    pub panels: usize,
    pub panel_width: f64,
}

impl GalleryTrack {
    /// Panel nearest the viewport's left edge
    pub fn focused_panel(&self, snapshot: &ProgressSnapshot) -> usize {
        if self.panels == 0 {
            return 0;
        }
        let last = (self.panels - 1) as f64;
        (snapshot.horizontal_progress * last).round() as usize
    }
}

impl Effect for GalleryTrack {
    fn name(&self) -> &str {
        "gallery-track"
    }

    fn apply(&self, snapshot: &ProgressSnapshot) -> Transform {
        let span = self.panels.saturating_sub(1) as f64 * self.panel_width;
        Transform {
            translate_x: -snapshot.horizontal_progress * span,
            opacity: if snapshot.horizontal_active { 1.0 } else { 0.85 },
            ..Default::default()
        }
    }
}

/// Particle backdrop morphing between shapes as the page scrolls
///
/// Computes blend parameters only; the shader consumes them elsewhere.
#[derive(Debug, Clone, Copy)]
pub struct ParticleMorph {
    pub shapes: usize,
}

impl ParticleMorph {
    /// Source shape index and blend factor toward the next shape
    pub fn blend(&self, progress: f64) -> (usize, f64) {
        if self.shapes < 2 {
            return (0, 0.0);
        }
        let segments = (self.shapes - 1) as f64;
        let position = progress.clamp(0.0, 1.0) * segments;
        let index = (position.floor() as usize).min(self.shapes - 2);
        (index, smoothstep(0.0, 1.0, position - index as f64))
    }
}

impl Effect for ParticleMorph {
    fn name(&self) -> &str {
        "particle-morph"
    }

    fn requires_acceleration(&self) -> bool {
        true
    }

    fn apply(&self, snapshot: &ProgressSnapshot) -> Transform {
        let (_, blend) = self.blend(snapshot.progress);
        Transform {
            scale: 1.0 + 0.1 * blend,
            opacity: 0.6 + 0.4 * (1.0 - snapshot.progress),
            ..Default::default()
        }
    }
}
