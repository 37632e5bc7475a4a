//! 2D points in normalized camera space and exponential smoothing.
//!
//! Every tracked signal in the engine (finger cursor, palm cursor, look-at
//! vector) is a `SmoothedPoint` blended toward a raw target once per frame.

// ── Point ──────────────────────────────────────────────────

/// A point in normalized, mirrored camera space ([0,1] for cursor math).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Distance from the origin.
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

/// Linear interpolation helper.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

// ── Smoothed signal ────────────────────────────────────────

/// An owned point updated every frame via exponential smoothing.
///
/// The point never jumps discontinuously except through `reset`; each
/// `update` moves it toward the target by `factor` of the remaining distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmoothedPoint {
    current: Point,
}

impl SmoothedPoint {
    pub fn new(initial: Point) -> Self {
        Self { current: initial }
    }

    /// Blend toward `target` by `factor` and return the new value.
    ///
    /// `factor` in (0,1]: larger converges faster but passes more jitter.
    pub fn update(&mut self, target: Point, factor: f32) -> Point {
        self.current.x = lerp(self.current.x, target.x, factor);
        self.current.y = lerp(self.current.y, target.y, factor);
        self.current
    }

    pub fn get(&self) -> Point {
        self.current
    }

    /// Snap to a new value, bypassing smoothing (session reset only).
    pub fn reset(&mut self, value: Point) {
        self.current = value;
    }
}

// ── Tests ──────────────────────────────────────────────────
