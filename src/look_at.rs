//! Look-at estimation — derives the pet's gaze vector from the smoothed
//! palm position, with asymmetric smoothing: quick to follow a hand, slow
//! to drift back to center when the hand disappears.

use crate::geometry::{Point, SmoothedPoint};

// ── Config ─────────────────────────────────────────────────

/// Smoothing factors for the gaze vector.
#[derive(Debug, Clone)]
pub struct LookAtConfig {
    /// Blend factor while a hand is present.
    pub track_factor: f32,
    /// Slower blend factor for the return to center with no hand.
    pub recenter_factor: f32,
}

impl Default for LookAtConfig {
    fn default() -> Self {
        Self {
            track_factor: 0.15,
            recenter_factor: 0.05,
        }
    }
}

// ── Estimator ──────────────────────────────────────────────

/// Continuous gaze vector in [-1, 1] centered space.
#[derive(Debug, Clone)]
pub struct LookAtEstimator {
    pub config: LookAtConfig,
    vector: SmoothedPoint,
}

impl LookAtEstimator {
    pub fn new(config: LookAtConfig) -> Self {
        Self {
            config,
            vector: SmoothedPoint::default(),
        }
    }

    /// Remap a palm point from [0,1] camera space to [-1,1] gaze space.
    pub fn gaze_target(palm: Point) -> Point {
        Point::new((palm.x - 0.5) * 2.0, (palm.y - 0.5) * 2.0)
    }

    /// Feed this frame's smoothed palm point (or none) and return the
    /// updated gaze vector.
    ///
    /// With no hand present the target is the center and the slower factor
    /// applies, so the pet's gaze drifts home rather than snapping.
    pub fn update(&mut self, palm: Option<Point>) -> Point {
        match palm {
            Some(p) => self
                .vector
                .update(Self::gaze_target(p), self.config.track_factor),
            None => self
                .vector
                .update(Point::default(), self.config.recenter_factor),
        }
    }

    pub fn vector(&self) -> Point {
        self.vector.get()
    }

    pub fn reset(&mut self) {
        self.vector.reset(Point::default());
    }
}

// ── Gaze pose ──────────────────────────────────────────────

/// Rendering-layer pose derived from the gaze vector: head rotation in
/// degrees and pupil offsets in pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct GazePose {
    pub head_rotate_x_deg: f32,
    pub head_rotate_y_deg: f32,
    pub pupil_x: f32,
    pub pupil_y: f32,
}

impl GazePose {
    pub fn from_vector(look: Point) -> Self {
        Self {
            head_rotate_x_deg: -look.y * 15.0,
            head_rotate_y_deg: look.x * 15.0,
            pupil_x: look.x * 12.0,
            pupil_y: look.y * 10.0,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────
