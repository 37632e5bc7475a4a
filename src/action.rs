//! Action state machine — owns the pet's current discrete action and the
//! animation lock, with a timed return to idle.
//!
//! At most one timed action runs at a time. The one exception is the
//! repeatable tail wag: re-triggering it while it is already active restarts
//! only its own expiry, so sustained contact holds the pet in the action
//! one duration-step at a time.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use tracing::debug;

// ── PetAction ──────────────────────────────────────────────

/// The pet's discrete action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PetAction {
    Idle,
    Sneeze,
    Jump,
    Spin,
    Shake,
    TailWag,
    Lay,
}

impl PetAction {
    /// String representation for logging and status output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Sneeze => "sneeze",
            Self::Jump => "jump",
            Self::Spin => "spin",
            Self::Shake => "shake",
            Self::TailWag => "tail-wag",
            Self::Lay => "lay",
        }
    }

    /// Whether this action may restart its own timer while locked.
    pub fn is_repeatable(&self) -> bool {
        matches!(self, Self::TailWag)
    }
}

/// Head-pet reactions, chosen uniformly at random per trigger for variety.
pub const HEAD_PET_ACTIONS: [PetAction; 3] = [PetAction::Jump, PetAction::Spin, PetAction::Shake];

// ── Config ─────────────────────────────────────────────────

/// Timing configuration for triggered actions.
#[derive(Debug, Clone)]
pub struct ActionConfig {
    /// How long a triggered action plays before the pet returns to idle.
    pub duration_ms: f64,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self { duration_ms: 1000.0 }
    }
}

// ── State machine ──────────────────────────────────────────

const STATUS_READY: &str = "Pet the cat!";
const STATUS_IDLE: &str = "Idle";

/// The action state machine.
///
/// `trigger` requests arrive from zone hits and external mood events;
/// `tick` performs the deferred idle reset on the same single-threaded
/// timeline, so no locking is needed.
pub struct ActionMachine {
    pub config: ActionConfig,
    current: PetAction,
    locked: bool,
    /// Pending idle-reset deadline; cleared on reset (teardown cancellation).
    expires_at_ms: Option<f64>,
    status: String,
    rng: Box<dyn RngCore>,
}

impl ActionMachine {
    pub fn new(config: ActionConfig) -> Self {
        Self::with_rng(config, Box::new(StdRng::from_entropy()))
    }

    /// Construct with a replaceable random source, so tests can seed the
    /// head-pet selection deterministically.
    pub fn with_rng(config: ActionConfig, rng: Box<dyn RngCore>) -> Self {
        Self {
            config,
            current: PetAction::Idle,
            locked: false,
            expires_at_ms: None,
            status: STATUS_READY.to_string(),
            rng,
        }
    }

    pub fn current(&self) -> PetAction {
        self.current
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Human-readable status line, updated on every transition.
    pub fn status_message(&self) -> &str {
        &self.status
    }

    /// Request an action. Returns whether the request was accepted.
    ///
    /// While locked, only a re-trigger of the already-active repeatable
    /// action is accepted; it restarts its own expiry without disturbing
    /// anything else. Every other request during the lock window is a
    /// defined no-op.
    pub fn trigger(&mut self, action: PetAction, now_ms: f64) -> bool {
        if action == PetAction::Idle {
            debug!("ignoring explicit idle trigger");
            return false;
        }

        if self.locked && !(action.is_repeatable() && action == self.current) {
            debug!(
                "trigger {} ignored: locked on {}",
                action.as_str(),
                self.current.as_str(),
            );
            return false;
        }

        self.current = action;
        self.locked = true;
        self.expires_at_ms = Some(now_ms + self.config.duration_ms);
        self.status = format!("Reacting: {}!", action.as_str());
        debug!("action triggered: {}", action.as_str());
        true
    }

    /// Pick a head-pet reaction uniformly at random and trigger it.
    pub fn trigger_head(&mut self, now_ms: f64) -> PetAction {
        let pick = HEAD_PET_ACTIONS[self.rng.gen_range(0..HEAD_PET_ACTIONS.len())];
        self.trigger(pick, now_ms);
        pick
    }

    /// Run the deferred idle reset. Returns true if the action expired and
    /// the machine returned to idle this call.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        if !self.locked {
            return false;
        }
        match self.expires_at_ms {
            Some(expiry) if now_ms >= expiry => {
                debug!("action {} expired, returning to idle", self.current.as_str());
                self.current = PetAction::Idle;
                self.locked = false;
                self.expires_at_ms = None;
                self.status = STATUS_IDLE.to_string();
                true
            }
            _ => false,
        }
    }

    /// Session teardown: cancel any pending idle reset and return to the
    /// initial state.
    pub fn reset(&mut self) {
        self.current = PetAction::Idle;
        self.locked = false;
        self.expires_at_ms = None;
        self.status = STATUS_READY.to_string();
    }

    /// Generate s-expression for status introspection.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:action :{} :locked {} :expires-at {})",
            self.current.as_str(),
            if self.locked { "t" } else { "nil" },
            match self.expires_at_ms {
                Some(ms) => format!("{ms:.0}"),
                None => "nil".to_string(),
            },
        )
    }
}

// ── Tests ──────────────────────────────────────────────────
