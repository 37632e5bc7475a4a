//! Idle blink scheduling and the squint derivation.
//!
//! The pet blinks on a randomized interval while idle, and squints through
//! the more violent reactions. Purely timestamp-driven so the rendering
//! layer can poll it once per frame.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use tracing::debug;

use crate::action::PetAction;

// ── Config ─────────────────────────────────────────────────

/// Blink timing. The next blink lands `interval_base_ms` plus a uniform
/// random jitter after the previous one ends.
#[derive(Debug, Clone)]
pub struct BlinkConfig {
    pub interval_base_ms: f64,
    pub interval_jitter_ms: f64,
    /// How long the eyes stay closed.
    pub hold_ms: f64,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            interval_base_ms: 3500.0,
            interval_jitter_ms: 2000.0,
            hold_ms: 200.0,
        }
    }
}

// ── Scheduler ──────────────────────────────────────────────

/// Timestamp-driven blink state machine.
pub struct BlinkScheduler {
    pub config: BlinkConfig,
    next_blink_at_ms: Option<f64>,
    closed_until_ms: Option<f64>,
    rng: Box<dyn RngCore>,
}

impl BlinkScheduler {
    pub fn new(config: BlinkConfig) -> Self {
        Self::with_rng(config, Box::new(StdRng::from_entropy()))
    }

    /// Construct with a replaceable random source for deterministic tests.
    pub fn with_rng(config: BlinkConfig, rng: Box<dyn RngCore>) -> Self {
        Self {
            config,
            next_blink_at_ms: None,
            closed_until_ms: None,
            rng,
        }
    }

    fn jitter(&mut self) -> f64 {
        if self.config.interval_jitter_ms > 0.0 {
            self.rng.gen_range(0.0..self.config.interval_jitter_ms)
        } else {
            0.0
        }
    }

    /// Advance the schedule. Returns whether the eyes are closed right now.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let next = match self.next_blink_at_ms {
            Some(t) => t,
            None => {
                // First tick of the session seeds the schedule.
                let t = now_ms + self.config.interval_base_ms + self.jitter();
                self.next_blink_at_ms = Some(t);
                t
            }
        };

        if let Some(until) = self.closed_until_ms {
            if now_ms < until {
                return true;
            }
            self.closed_until_ms = None;
        }

        if now_ms >= next {
            self.closed_until_ms = Some(now_ms + self.config.hold_ms);
            self.next_blink_at_ms =
                Some(now_ms + self.config.hold_ms + self.config.interval_base_ms + self.jitter());
            debug!("blink at {now_ms:.0}ms");
            return true;
        }

        false
    }

    /// Session teardown: forget the schedule.
    pub fn reset(&mut self) {
        self.next_blink_at_ms = None;
        self.closed_until_ms = None;
    }
}

/// Whether the pet should squint: eyes held shut by a blink, or any of the
/// reactions that scrunch the face.
pub fn squinting(action: PetAction, blinking: bool) -> bool {
    blinking
        || matches!(
            action,
            PetAction::Jump | PetAction::Sneeze | PetAction::Shake
        )
}

// ── Tests ──────────────────────────────────────────────────
