//! Interaction frame driver — runs the whole pipeline once per available
//! video frame and publishes the plain-data snapshot the rendering layer
//! consumes.
//!
//! Per frame: detect hands, extract semantic points, advance the cursor
//! and look-at filters, hit-test zones (unless suppressed by the action
//! lock), trigger actions, and retarget the puppeteered limbs. A frame
//! that fails detection or extraction degrades to "no hand detected"; it
//! never aborts the loop.

use anyhow::ensure;
use tracing::{debug, info, warn};

use crate::action::{ActionConfig, ActionMachine, PetAction};
use crate::blink::{squinting, BlinkConfig, BlinkScheduler};
use crate::geometry::{Point, SmoothedPoint};
use crate::landmarks::{extract, HandObservation};
use crate::limbs::{visual_limb_for_hand, LimbAngles, LimbConfig, LimbPoseMapper};
use crate::look_at::{GazePose, LookAtConfig, LookAtEstimator};
use crate::zones::{ZoneConfig, ZoneHitTester, ZoneId};

// ── Detector seam ──────────────────────────────────────────

/// The external vision model, invoked once per video frame.
///
/// `Ok(None)` and `Ok(Some(vec![]))` both mean "no hand". A per-frame
/// `Err` is logged and degrades that frame to "no hand"; the engine never
/// retries. Constructing and initializing the detector is the caller's
/// concern — an initialization failure should abort before the session
/// starts.
pub trait HandDetector {
    fn detect(&mut self, timestamp_ms: f64) -> anyhow::Result<Option<Vec<HandObservation>>>;
}

// ── Config ─────────────────────────────────────────────────

/// Aggregated configuration for an interaction session.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Blend factor for the finger and palm cursor filters.
    pub cursor_factor: f32,
    pub zones: ZoneConfig,
    pub action: ActionConfig,
    pub look_at: LookAtConfig,
    pub limbs: LimbConfig,
    pub blink: BlinkConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cursor_factor: 0.2,
            zones: ZoneConfig::default(),
            action: ActionConfig::default(),
            look_at: LookAtConfig::default(),
            limbs: LimbConfig::default(),
            blink: BlinkConfig::default(),
        }
    }
}

// ── Output snapshot ────────────────────────────────────────

/// Plain-old-data state published to the rendering layer each tick.
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub action: PetAction,
    /// Smoothed finger cursor, absent when no hand is detected.
    pub cursor_finger: Option<Point>,
    /// Smoothed palm cursor, absent when no hand is detected.
    pub cursor_palm: Option<Point>,
    /// Gaze vector in [-1,1] space; decays toward center with no hand, so
    /// it stays meaningful on hand-less frames.
    pub look_at: Point,
    pub gaze: GazePose,
    pub limb_angles: LimbAngles,
    pub squint: bool,
}

// ── Engine ─────────────────────────────────────────────────

/// The per-frame interaction pipeline.
pub struct InteractionEngine {
    cursor_factor: f32,
    detector: Box<dyn HandDetector>,
    finger: SmoothedPoint,
    palm: SmoothedPoint,
    /// Whether the cursors tracked a hand on the last processed frame.
    cursor_valid: bool,
    zones: ZoneHitTester,
    actions: ActionMachine,
    look_at: LookAtEstimator,
    limbs: LimbPoseMapper,
    blink: BlinkScheduler,
    /// Last processed video playback timestamp, for frame dedup.
    last_video_time_ms: Option<f64>,
}

impl InteractionEngine {
    /// Start an interaction session. Fails on nonsensical configuration;
    /// no partial state is produced.
    pub fn start(detector: Box<dyn HandDetector>, config: EngineConfig) -> anyhow::Result<Self> {
        ensure!(
            config.cursor_factor > 0.0 && config.cursor_factor <= 1.0,
            "cursor factor must be in (0, 1], got {}",
            config.cursor_factor,
        );
        ensure!(
            config.look_at.track_factor > 0.0 && config.look_at.track_factor <= 1.0,
            "look-at track factor must be in (0, 1]",
        );
        ensure!(
            config.look_at.recenter_factor > 0.0 && config.look_at.recenter_factor <= 1.0,
            "look-at recenter factor must be in (0, 1]",
        );
        ensure!(config.action.duration_ms > 0.0, "action duration must be positive");
        ensure!(
            config.zones.nose_radius > 0.0
                && config.zones.head_radius > 0.0
                && config.zones.tail_radius > 0.0,
            "zone radii must be positive",
        );
        ensure!(config.zones.scale > 0.0, "display scale must be positive");
        ensure!(config.blink.hold_ms >= 0.0, "blink hold must not be negative");

        info!("interaction session started");

        Ok(Self {
            cursor_factor: config.cursor_factor,
            detector,
            finger: SmoothedPoint::default(),
            palm: SmoothedPoint::default(),
            cursor_valid: false,
            zones: ZoneHitTester::new(config.zones),
            actions: ActionMachine::new(config.action),
            look_at: LookAtEstimator::new(config.look_at),
            limbs: LimbPoseMapper::new(config.limbs),
            blink: BlinkScheduler::new(config.blink),
            last_video_time_ms: None,
        })
    }

    /// Run one tick of the pipeline.
    ///
    /// `video_time_ms` is the video's playback timestamp, used only for
    /// frame dedup: a repeated timestamp skips detection entirely. The
    /// deferred idle-reset and the blink schedule advance on `now_ms`
    /// regardless, since they are independent of frame availability.
    pub fn process_frame(&mut self, video_time_ms: f64, now_ms: f64) -> FrameSnapshot {
        self.actions.tick(now_ms);

        if self.last_video_time_ms != Some(video_time_ms) {
            self.last_video_time_ms = Some(video_time_ms);
            self.run_detection(video_time_ms, now_ms);
        }

        let blinking = self.blink.tick(now_ms);
        let action = self.actions.current();

        FrameSnapshot {
            action,
            cursor_finger: self.cursor_valid.then(|| self.finger.get()),
            cursor_palm: self.cursor_valid.then(|| self.palm.get()),
            look_at: self.look_at.vector(),
            gaze: GazePose::from_vector(self.look_at.vector()),
            limb_angles: self.limbs.angles(),
            squint: squinting(action, blinking),
        }
    }

    fn run_detection(&mut self, video_time_ms: f64, now_ms: f64) {
        let hands = match self.detector.detect(video_time_ms) {
            Ok(Some(hands)) => hands,
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!("detector failed, treating frame as no hand: {err:#}");
                Vec::new()
            }
        };

        let extraction = match extract(&hands) {
            Ok(extraction) => extraction,
            Err(err) => {
                warn!("landmark extraction failed, treating frame as no hand: {err}");
                None
            }
        };

        match extraction {
            Some(extraction) => {
                let finger = self
                    .finger
                    .update(extraction.primary.finger_tip, self.cursor_factor);
                let palm = self
                    .palm
                    .update(extraction.primary.palm_center, self.cursor_factor);
                self.cursor_valid = true;

                self.look_at.update(Some(palm));

                // Hit-testing is suppressed while locked, except during the
                // repeatable tail wag, which may re-trigger on sustained
                // contact.
                let suppressed =
                    self.actions.is_locked() && self.actions.current() != PetAction::TailWag;
                if !suppressed {
                    if let Some(zone) = self.zones.hit_test(finger, palm) {
                        self.dispatch_zone(zone, now_ms);
                    }
                }

                self.limbs.clear();
                for (hand, root) in &extraction.hand_roots {
                    self.limbs.set_target(visual_limb_for_hand(*hand), *root);
                }
            }
            None => {
                // No hand: clear cursors and limb targets, let the gaze
                // drift home.
                self.cursor_valid = false;
                self.look_at.update(None);
                self.limbs.clear();
            }
        }
    }

    fn dispatch_zone(&mut self, zone: ZoneId, now_ms: f64) {
        match zone {
            ZoneId::Nose => {
                self.actions.trigger(PetAction::Sneeze, now_ms);
            }
            ZoneId::Tail => {
                self.actions.trigger(PetAction::TailWag, now_ms);
            }
            ZoneId::Head => {
                let pick = self.actions.trigger_head(now_ms);
                debug!("head pet resolved to {}", pick.as_str());
            }
        }
    }

    /// Trigger an action from an external mood event (e.g. the voice
    /// collaborator asking the pet to lay down). Same lock rules as zone
    /// triggers.
    pub fn trigger_mood(&mut self, action: PetAction, now_ms: f64) -> bool {
        self.actions.trigger(action, now_ms)
    }

    /// Current discrete action.
    pub fn action(&self) -> PetAction {
        self.actions.current()
    }

    /// Human-readable status line for the status display.
    pub fn status_message(&self) -> &str {
        self.actions.status_message()
    }

    /// Generate s-expression for status introspection.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:action {} :cursor {} :look-at ({:.3} {:.3}) :limbs ({:.1} {:.1}))",
            self.actions.status_sexp(),
            if self.cursor_valid { "t" } else { "nil" },
            self.look_at.vector().x,
            self.look_at.vector().y,
            self.limbs.angles().left_deg,
            self.limbs.angles().right_deg,
        )
    }

    /// Session teardown: cancel the pending idle reset and blink schedule,
    /// drop all tracked state. Processing may resume afterwards from a
    /// clean slate.
    pub fn reset(&mut self) {
        info!("interaction session reset");
        self.actions.reset();
        self.blink.reset();
        self.finger.reset(Point::default());
        self.palm.reset(Point::default());
        self.cursor_valid = false;
        self.look_at.reset();
        self.limbs.clear();
        self.last_video_time_ms = None;
    }
}

// ── Test helpers ───────────────────────────────────────────

#[cfg(test)]
mod test_support {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::*;
    use crate::landmarks::{Handedness, test_observation};

    /// One scripted detector response.
    pub enum Scripted {
        Hands(Vec<HandObservation>),
        NoHands,
        Fail,
    }

    /// Detector fake that replays a script and counts invocations.
    pub struct ScriptDetector {
        script: VecDeque<Scripted>,
        pub calls: Rc<RefCell<usize>>,
    }

    impl ScriptDetector {
        pub fn new(script: Vec<Scripted>) -> (Self, Rc<RefCell<usize>>) {
            let calls = Rc::new(RefCell::new(0));
            (
                Self {
                    script: script.into(),
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    impl HandDetector for ScriptDetector {
        fn detect(&mut self, _timestamp_ms: f64) -> anyhow::Result<Option<Vec<HandObservation>>> {
            *self.calls.borrow_mut() += 1;
            match self.script.pop_front() {
                Some(Scripted::Hands(hands)) => Ok(Some(hands)),
                Some(Scripted::NoHands) => Ok(None),
                Some(Scripted::Fail) => Err(anyhow::anyhow!("synthetic detector failure")),
                None => Ok(None),
            }
        }
    }

    /// A hand whose mirrored fingertip/palm/wrist land on the given points.
    /// The detector reports raw (unmirrored) coordinates, so flip x here.
    pub fn hand_at(
        handedness: Handedness,
        finger_tip: Point,
        palm_center: Point,
        wrist: Point,
    ) -> HandObservation {
        let unmirror = |p: Point| Point::new(1.0 - p.x, p.y);
        test_observation(
            handedness,
            unmirror(wrist),
            unmirror(finger_tip),
            unmirror(palm_center),
        )
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::landmarks::Handedness;

    /// Frames at 30 fps spacing with matching video/wall timestamps.
    fn run_frames(engine: &mut InteractionEngine, count: usize, start_ms: f64) -> FrameSnapshot {
        let mut snapshot = None;
        for i in 0..count {
            let t = start_ms + i as f64 * 33.0;
            snapshot = Some(engine.process_frame(t, t));
        }
        snapshot.expect("at least one frame")
    }

    fn engine_with_script(script: Vec<Scripted>) -> InteractionEngine {
        let (detector, _) = ScriptDetector::new(script);
        InteractionEngine::start(Box::new(detector), EngineConfig::default()).unwrap()
    }

    fn nose_hand() -> HandObservation {
        // Finger on the nose; palm kept in the lower-left corner so its
        // smoothed path never crosses the head zone.
        hand_at(
            Handedness::Right,
            Point::new(0.5, 0.5),
            Point::new(0.05, 0.95),
            Point::new(0.5, 0.6),
        )
    }

    fn tail_hand() -> HandObservation {
        // Fingertip inside the tail zone, placed so the smoothed cursor's
        // path in from the origin skirts the nose zone.
        hand_at(
            Handedness::Right,
            Point::new(0.9, 0.55),
            Point::new(0.05, 0.95),
            Point::new(0.7, 0.7),
        )
    }

    #[test]
    fn test_start_rejects_bad_config() {
        let (detector, _) = ScriptDetector::new(vec![]);
        let mut config = EngineConfig::default();
        config.cursor_factor = 0.0;
        assert!(InteractionEngine::start(Box::new(detector), config).is_err());

        let (detector, _) = ScriptDetector::new(vec![]);
        let mut config = EngineConfig::default();
        config.zones.head_radius = -0.1;
        assert!(InteractionEngine::start(Box::new(detector), config).is_err());
    }

    #[test]
    fn test_nose_boop_triggers_sneeze() {
        let script = (0..20).map(|_| Scripted::Hands(vec![nose_hand()])).collect();
        let mut engine = engine_with_script(script);

        // The smoothed cursor needs a few frames to converge on the zone.
        let snapshot = run_frames(&mut engine, 20, 0.0);
        assert_eq!(snapshot.action, PetAction::Sneeze);
        assert_eq!(engine.status_message(), "Reacting: sneeze!");
    }

    #[test]
    fn test_lock_expires_back_to_idle() {
        let script = (0..20).map(|_| Scripted::Hands(vec![nose_hand()])).collect();
        let mut engine = engine_with_script(script);
        run_frames(&mut engine, 20, 0.0);
        assert_eq!(engine.action(), PetAction::Sneeze);

        // No further contact; past the 1000 ms window the pet idles.
        let last_ts = 19.0 * 33.0;
        let snapshot = engine.process_frame(last_ts + 1100.0, last_ts + 1100.0);
        assert_eq!(snapshot.action, PetAction::Idle);
        assert_eq!(engine.status_message(), "Idle");
    }

    #[test]
    fn test_sustained_tail_contact_keeps_wagging() {
        // 60 frames of steady tail contact: just under 2 s of video.
        let script = (0..60).map(|_| Scripted::Hands(vec![tail_hand()])).collect();
        let mut engine = engine_with_script(script);

        let snapshot = run_frames(&mut engine, 60, 0.0);
        // 60 * 33 ms = 1980 ms: well past the first trigger's 1000 ms
        // window, held alive by re-triggering.
        assert_eq!(snapshot.action, PetAction::TailWag);
    }

    #[test]
    fn test_no_hand_clears_outputs_and_decays_gaze() {
        let mut script: Vec<Scripted> = (0..20)
            .map(|_| {
                Scripted::Hands(vec![hand_at(
                    Handedness::Right,
                    Point::new(0.05, 0.95),
                    Point::new(0.05, 0.95),
                    Point::new(0.9, 0.9),
                )])
            })
            .collect();
        script.extend((0..10).map(|_| Scripted::NoHands));
        let mut engine = engine_with_script(script);

        let tracked = run_frames(&mut engine, 20, 0.0);
        assert!(tracked.cursor_finger.is_some());
        let tracked_mag = tracked.look_at.magnitude();
        assert!(tracked_mag > 0.3);

        // Hand gone: cursors null immediately, gaze strictly decays.
        let mut prev = tracked_mag;
        for i in 0..10 {
            let t = 20.0 * 33.0 + i as f64 * 33.0;
            let snapshot = engine.process_frame(t, t);
            assert!(snapshot.cursor_finger.is_none());
            assert!(snapshot.cursor_palm.is_none());
            assert!(snapshot.look_at.magnitude() < prev);
            prev = snapshot.look_at.magnitude();
        }

        // Limbs fell back to the resting tilt.
        let snapshot = engine.process_frame(2000.0, 2000.0);
        assert!((snapshot.limb_angles.left_deg - 6.0).abs() < 1e-4);
        assert!((snapshot.limb_angles.right_deg + 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_detector_failure_degrades_to_no_hand() {
        let script = vec![
            Scripted::Hands(vec![nose_hand()]),
            Scripted::Fail,
            Scripted::Hands(vec![nose_hand()]),
        ];
        let mut engine = engine_with_script(script);

        let first = engine.process_frame(0.0, 0.0);
        assert!(first.cursor_finger.is_some());

        let failed = engine.process_frame(33.0, 33.0);
        assert!(failed.cursor_finger.is_none());
        assert!((failed.limb_angles.left_deg - 6.0).abs() < 1e-4);

        // The loop keeps running: the next good frame tracks again.
        let recovered = engine.process_frame(66.0, 66.0);
        assert!(recovered.cursor_finger.is_some());
    }

    #[test]
    fn test_malformed_landmarks_degrade_to_no_hand() {
        let truncated = HandObservation::new(Handedness::Left, vec![Point::default(); 5]);
        let script = vec![Scripted::Hands(vec![truncated])];
        let mut engine = engine_with_script(script);

        let snapshot = engine.process_frame(0.0, 0.0);
        assert!(snapshot.cursor_finger.is_none());
        assert_eq!(snapshot.action, PetAction::Idle);
    }

    #[test]
    fn test_duplicate_video_timestamp_skips_detection() {
        let (detector, calls) =
            ScriptDetector::new(vec![Scripted::NoHands, Scripted::NoHands]);
        let mut engine =
            InteractionEngine::start(Box::new(detector), EngineConfig::default()).unwrap();

        engine.process_frame(100.0, 100.0);
        assert_eq!(*calls.borrow(), 1);

        // Same playback timestamp: no second detect call.
        engine.process_frame(100.0, 116.0);
        assert_eq!(*calls.borrow(), 1);

        engine.process_frame(133.0, 133.0);
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn test_lock_expires_even_on_duplicate_frames() {
        let script = (0..20).map(|_| Scripted::Hands(vec![nose_hand()])).collect();
        let mut engine = engine_with_script(script);
        run_frames(&mut engine, 20, 0.0);
        assert_eq!(engine.action(), PetAction::Sneeze);

        // Stalled video, but wall time advances: the idle reset still fires.
        let last_ts = 19.0 * 33.0;
        let snapshot = engine.process_frame(last_ts, last_ts + 1500.0);
        assert_eq!(snapshot.action, PetAction::Idle);
    }

    #[test]
    fn test_left_hand_drives_screen_right_limb() {
        let hand = hand_at(
            Handedness::Left,
            Point::new(0.05, 0.95),
            Point::new(0.05, 0.95),
            Point::new(0.7, 0.5),
        );
        let script = vec![Scripted::Hands(vec![hand])];
        let mut engine = engine_with_script(script);

        let snapshot = engine.process_frame(0.0, 0.0);
        // Root level-right of the (0.65, 0.5) anchor maps to -90 degrees.
        assert!((snapshot.limb_angles.right_deg + 90.0).abs() < 1e-4);
        // No right-hand detection, so the screen-left limb rests.
        assert!((snapshot.limb_angles.left_deg - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_mood_trigger_respects_lock() {
        let script = (0..20).map(|_| Scripted::Hands(vec![nose_hand()])).collect();
        let mut engine = engine_with_script(script);
        run_frames(&mut engine, 20, 0.0);
        assert_eq!(engine.action(), PetAction::Sneeze);

        // A lay request during the sneeze is ignored; afterwards it lands.
        assert!(!engine.trigger_mood(PetAction::Lay, 700.0));
        let t = 19.0 * 33.0 + 1100.0;
        engine.process_frame(t, t);
        assert!(engine.trigger_mood(PetAction::Lay, t + 10.0));
        assert_eq!(engine.action(), PetAction::Lay);
    }

    #[test]
    fn test_reset_returns_to_initial_state() {
        let script = (0..20).map(|_| Scripted::Hands(vec![nose_hand()])).collect();
        let mut engine = engine_with_script(script);
        run_frames(&mut engine, 20, 0.0);

        engine.reset();
        assert_eq!(engine.action(), PetAction::Idle);
        assert_eq!(engine.status_message(), "Pet the cat!");

        let snapshot = engine.process_frame(5000.0, 5000.0);
        assert!(snapshot.cursor_finger.is_none());
        assert!(snapshot.look_at.magnitude() < f32::EPSILON);
    }

    #[test]
    fn test_status_sexp() {
        let mut engine = engine_with_script(vec![Scripted::NoHands]);
        engine.process_frame(0.0, 0.0);
        let sexp = engine.status_sexp();
        assert!(sexp.contains(":action (:action :idle"));
        assert!(sexp.contains(":cursor nil"));
    }
}
