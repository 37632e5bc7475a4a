//! Limb pose mapping — converts per-hand driving points into clamped
//! rotation angles for the pet's puppeteered arms.
//!
//! The single-joint analog of inverse kinematics: each visual limb swings
//! about a fixed shoulder anchor, with 0° meaning the natural resting
//! "pointing down" orientation. The user's anatomical left hand drives the
//! character's screen-right limb and vice versa, because the character
//! faces the viewer.

use tracing::debug;

use crate::geometry::Point;
use crate::landmarks::Handedness;

// ── LimbSide ───────────────────────────────────────────────

/// Screen side of a visual limb on the character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimbSide {
    Left,
    Right,
}

impl LimbSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Map a detector handedness label to the visual limb it drives.
///
/// Cross-mapping, not same-side: in a mirrored selfie view the user's
/// anatomical left hand appears on the character's screen-right side.
pub fn visual_limb_for_hand(hand: Handedness) -> LimbSide {
    match hand {
        Handedness::Left => LimbSide::Right,
        Handedness::Right => LimbSide::Left,
    }
}

// ── Config ─────────────────────────────────────────────────

/// Anchors, rotation bounds, and resting pose for both limbs.
///
/// Positive angles swing toward screen-left (camera y grows downward), so
/// each side's clamp allows the larger swing outward and the smaller swing
/// across the body.
#[derive(Debug, Clone)]
pub struct LimbConfig {
    /// Shoulder anchor for the screen-left limb, normalized space.
    pub left_anchor: Point,
    /// Shoulder anchor for the screen-right limb.
    pub right_anchor: Point,
    /// (min, max) rotation in degrees for the screen-left limb.
    pub left_clamp_deg: (f32, f32),
    /// (min, max) rotation in degrees for the screen-right limb.
    pub right_clamp_deg: (f32, f32),
    /// Resting tilt when no driving point exists, screen-left limb.
    pub left_rest_deg: f32,
    /// Resting tilt for the screen-right limb.
    pub right_rest_deg: f32,
}

impl Default for LimbConfig {
    fn default() -> Self {
        Self {
            left_anchor: Point::new(0.35, 0.5),
            right_anchor: Point::new(0.65, 0.5),
            left_clamp_deg: (-60.0, 120.0),
            right_clamp_deg: (-120.0, 60.0),
            left_rest_deg: 6.0,
            right_rest_deg: -6.0,
        }
    }
}

// ── Angle math ─────────────────────────────────────────────

/// Rotation angle in degrees for a driving point about a shoulder anchor.
///
/// 0° is straight down from the anchor; positive swings toward screen-left.
pub fn limb_angle_deg(driving: Point, anchor: Point) -> f32 {
    let dx = driving.x - anchor.x;
    let dy = driving.y - anchor.y;
    dy.atan2(dx).to_degrees() - 90.0
}

// ── Output ─────────────────────────────────────────────────

/// Per-frame target angles for both limbs, consumed by the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimbAngles {
    pub left_deg: f32,
    pub right_deg: f32,
}

// ── Mapper ─────────────────────────────────────────────────

/// Holds this frame's optional driving point per limb and produces the
/// clamped target angles.
#[derive(Debug, Clone)]
pub struct LimbPoseMapper {
    pub config: LimbConfig,
    left_target: Option<Point>,
    right_target: Option<Point>,
}

impl LimbPoseMapper {
    pub fn new(config: LimbConfig) -> Self {
        Self {
            config,
            left_target: None,
            right_target: None,
        }
    }

    /// Set a limb's driving point for this frame.
    pub fn set_target(&mut self, side: LimbSide, point: Point) {
        match side {
            LimbSide::Left => self.left_target = Some(point),
            LimbSide::Right => self.right_target = Some(point),
        }
        debug!("limb target {}: ({:.2}, {:.2})", side.as_str(), point.x, point.y);
    }

    /// Drop both driving points; limbs fall back to the resting tilt.
    pub fn clear(&mut self) {
        self.left_target = None;
        self.right_target = None;
    }

    /// Target angle for one limb: computed and clamped from the driving
    /// point, or the fixed resting tilt when none exists.
    pub fn angle_for(&self, side: LimbSide) -> f32 {
        let (target, anchor, clamp, rest) = match side {
            LimbSide::Left => (
                self.left_target,
                self.config.left_anchor,
                self.config.left_clamp_deg,
                self.config.left_rest_deg,
            ),
            LimbSide::Right => (
                self.right_target,
                self.config.right_anchor,
                self.config.right_clamp_deg,
                self.config.right_rest_deg,
            ),
        };

        match target {
            Some(point) => limb_angle_deg(point, anchor).clamp(clamp.0, clamp.1),
            None => rest,
        }
    }

    /// Both limbs' target angles for this frame.
    pub fn angles(&self) -> LimbAngles {
        LimbAngles {
            left_deg: self.angle_for(LimbSide::Left),
            right_deg: self.angle_for(LimbSide::Right),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────
