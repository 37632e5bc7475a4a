//! Hand landmark data model and semantic point extraction.
//!
//! The external vision model reports, per frame, a list of detected hands;
//! each hand is an ordered list of 21 normalized landmark points plus an
//! anatomical handedness label. This module maps that raw output to the
//! points the engine cares about (fingertip, palm center, per-hand root),
//! applying the horizontal mirror for a user-facing camera.

use tracing::debug;

use crate::geometry::Point;

// ── Landmark indices ───────────────────────────────────────

// MediaPipe hand landmark convention.
pub const WRIST: usize = 0;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;

/// Landmarks per hand in the detector's output.
pub const LANDMARK_COUNT: usize = 21;

// ── Handedness ─────────────────────────────────────────────

/// Detector-reported anatomical hand label.
///
/// Refers to the user's actual hand, independent of where it appears in the
/// mirrored camera image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Parse a detector label ("Left"/"Right", case-insensitive).
    pub fn from_label(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("left") {
            Some(Self::Left)
        } else if s.eq_ignore_ascii_case("right") {
            Some(Self::Right)
        } else {
            None
        }
    }
}

// ── Hand observation ───────────────────────────────────────

/// One detected hand for one frame, as produced by the vision model.
///
/// Coordinates are raw (unmirrored) normalized camera space.
#[derive(Debug, Clone)]
pub struct HandObservation {
    pub handedness: Handedness,
    pub landmarks: Vec<Point>,
}

impl HandObservation {
    pub fn new(handedness: Handedness, landmarks: Vec<Point>) -> Self {
        Self {
            handedness,
            landmarks,
        }
    }

    fn landmark(&self, index: usize) -> Result<Point, ExtractError> {
        self.landmarks
            .get(index)
            .copied()
            .ok_or(ExtractError::MissingLandmark { index })
    }
}

// ── Mirroring ──────────────────────────────────────────────

/// Mirror a raw camera point horizontally so x increases toward the user's
/// right, matching what the user sees in a selfie view.
pub fn mirror(p: Point) -> Point {
    Point::new(1.0 - p.x, p.y)
}

// ── Extraction ─────────────────────────────────────────────

/// Semantic points for the primary (first detected) hand.
#[derive(Debug, Clone, Copy)]
pub struct PrimaryPoints {
    /// Index fingertip (landmark 8), mirrored.
    pub finger_tip: Point,
    /// Palm center reference (landmark 9), mirrored.
    pub palm_center: Point,
}

/// Everything extracted from one frame's detector output.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub primary: PrimaryPoints,
    /// Wrist/root point for every detected hand (mirrored), for limb
    /// puppeteering.
    pub hand_roots: Vec<(Handedness, Point)>,
}

/// Malformed detector output for a single frame. Non-fatal: the frame
/// driver degrades the frame to "no hand detected".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractError {
    MissingLandmark { index: usize },
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingLandmark { index } => {
                write!(f, "landmark index {index} missing from detector output")
            }
        }
    }
}

impl std::error::Error for ExtractError {}

/// Map a frame's detected hands to the engine's semantic points.
///
/// Returns `Ok(None)` when no hands were detected. Any missing landmark
/// yields an error for the whole frame; partial frames are not used.
pub fn extract(hands: &[HandObservation]) -> Result<Option<Extraction>, ExtractError> {
    let Some(first) = hands.first() else {
        return Ok(None);
    };

    let primary = PrimaryPoints {
        finger_tip: mirror(first.landmark(INDEX_TIP)?),
        palm_center: mirror(first.landmark(MIDDLE_MCP)?),
    };

    let mut hand_roots = Vec::with_capacity(hands.len());
    for hand in hands {
        hand_roots.push((hand.handedness, mirror(hand.landmark(WRIST)?)));
    }

    debug!(
        "extracted {} hand(s), primary finger ({:.2}, {:.2})",
        hands.len(),
        primary.finger_tip.x,
        primary.finger_tip.y,
    );

    Ok(Some(Extraction {
        primary,
        hand_roots,
    }))
}

// ── Test helpers ───────────────────────────────────────────

/// Build an observation with all 21 landmarks at the origin except the
/// wrist, fingertip, and palm center.
#[cfg(test)]
pub fn test_observation(
    handedness: Handedness,
    wrist: Point,
    finger_tip: Point,
    palm_center: Point,
) -> HandObservation {
    let mut landmarks = vec![Point::default(); LANDMARK_COUNT];
    landmarks[WRIST] = wrist;
    landmarks[INDEX_TIP] = finger_tip;
    landmarks[MIDDLE_MCP] = palm_center;
    HandObservation::new(handedness, landmarks)
}

// ── Tests ──────────────────────────────────────────────────
