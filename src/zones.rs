//! Interactive zone hit-testing — maps the smoothed finger and palm cursors
//! to the pet's touchable regions (nose, head, tail) with a fixed priority
//! order, emitting at most one hit per frame.

use tracing::debug;

use crate::geometry::Point;

// ── ZoneId ─────────────────────────────────────────────────

/// A touchable region on the character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneId {
    /// Boop target, tested against the finger cursor.
    Nose,
    /// Petting target, tested against the palm cursor.
    Head,
    /// Tickle target, tested against the finger cursor.
    Tail,
}

impl ZoneId {
    /// String representation for logging and status output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::Head => "head",
            Self::Tail => "tail",
        }
    }
}

// ── ZoneConfig ─────────────────────────────────────────────

/// Zone geometry in normalized space, tuned for the character layout.
///
/// Centers and radii are base values at `scale` 1.0; the effective geometry
/// scales uniformly about `character_center` so zones track the character
/// when the display scale changes.
#[derive(Debug, Clone)]
pub struct ZoneConfig {
    pub nose_center: Point,
    pub nose_radius: f32,
    pub head_center: Point,
    pub head_radius: f32,
    pub tail_center: Point,
    pub tail_radius: f32,
    /// Anchor the scale law is applied about.
    pub character_center: Point,
    /// Global display scale factor for the character.
    pub scale: f32,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            nose_center: Point::new(0.50, 0.50),
            nose_radius: 0.15,
            head_center: Point::new(0.50, 0.35),
            head_radius: 0.35,
            tail_center: Point::new(0.72, 0.62),
            tail_radius: 0.20,
            character_center: Point::new(0.5, 0.5),
            scale: 1.0,
        }
    }
}

// ── Hit tester ─────────────────────────────────────────────

/// Distance-threshold hit-testing over the three zones.
///
/// Priority when several zones are within threshold simultaneously:
/// nose > tail > head. A nose boop always wins over petting, and a tail
/// tickle wins over a head pet.
#[derive(Debug, Clone)]
pub struct ZoneHitTester {
    pub config: ZoneConfig,
}

impl ZoneHitTester {
    pub fn new(config: ZoneConfig) -> Self {
        Self { config }
    }

    /// Effective center of a zone after applying the display scale.
    pub fn effective_center(&self, zone: ZoneId) -> Point {
        let base = match zone {
            ZoneId::Nose => self.config.nose_center,
            ZoneId::Head => self.config.head_center,
            ZoneId::Tail => self.config.tail_center,
        };
        let anchor = self.config.character_center;
        Point::new(
            anchor.x + (base.x - anchor.x) * self.config.scale,
            anchor.y + (base.y - anchor.y) * self.config.scale,
        )
    }

    /// Effective radius of a zone after applying the display scale.
    pub fn effective_radius(&self, zone: ZoneId) -> f32 {
        let base = match zone {
            ZoneId::Nose => self.config.nose_radius,
            ZoneId::Head => self.config.head_radius,
            ZoneId::Tail => self.config.tail_radius,
        };
        base * self.config.scale
    }

    fn contains(&self, zone: ZoneId, point: Point) -> bool {
        point.distance_to(self.effective_center(zone)) < self.effective_radius(zone)
    }

    /// Test the smoothed cursors against all zones, returning the highest
    /// priority hit, if any.
    pub fn hit_test(&self, finger: Point, palm: Point) -> Option<ZoneId> {
        let hit = if self.contains(ZoneId::Nose, finger) {
            Some(ZoneId::Nose)
        } else if self.contains(ZoneId::Tail, finger) {
            Some(ZoneId::Tail)
        } else if self.contains(ZoneId::Head, palm) {
            Some(ZoneId::Head)
        } else {
            None
        };

        if let Some(zone) = hit {
            debug!("zone hit: {}", zone.as_str());
        }
        hit
    }
}

// ── Tests ──────────────────────────────────────────────────
