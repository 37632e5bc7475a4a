//! Hand-gesture interaction engine for an animated virtual pet.
//!
//! Turns per-frame hand landmark detections from a user-facing camera into
//! the pet's reactions:
//! - `geometry`: normalized-space points and exponential smoothing
//! - `landmarks`: detector output model, mirroring, semantic extraction
//! - `zones`: interactive zone hit-testing with priority
//! - `action`: the action state machine with its animation lock
//! - `look_at`: gaze estimation from the palm position
//! - `limbs`: hand-root to limb-rotation puppeteering
//! - `blink`: idle blink scheduling and squint derivation
//! - `engine`: the frame driver tying the pipeline together

pub mod action;
pub mod blink;
pub mod engine;
pub mod geometry;
pub mod landmarks;
pub mod limbs;
pub mod look_at;
pub mod zones;

pub use action::{ActionConfig, ActionMachine, PetAction};
pub use engine::{EngineConfig, FrameSnapshot, HandDetector, InteractionEngine};
pub use geometry::Point;
pub use landmarks::{HandObservation, Handedness};
pub use limbs::{LimbAngles, LimbSide};
pub use look_at::GazePose;
pub use zones::ZoneId;
