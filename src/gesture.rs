//! Turns phase-tagged swipe samples and relayed tuples into [`Gesture`]s.
//!
//! # How samples become gestures
//!
//! | State    | Input               | Result                                              |
//! |----------|---------------------|-----------------------------------------------------|
//! | `Idle`   | `Begin`             | → `Active`, accumulator zeroed, first-motion threshold |
//! | `Active` | `Update` below      | accumulate, [`Transition::Pending`] (propagate)      |
//! | `Active` | `Update` at/above   | [`Gesture::Swipe`], accumulator zeroed, steady threshold (stop) |
//! | `Active` | `End` / `Cancel`    | [`Gesture::Finish`], back to `Idle`                  |
//!
//! Samples with a finger count other than
//! [`GestureConfig::switch_fingers`] are ignored.  Vertical swipes are
//! additionally gated by a [`CooldownClock`] that outlives individual
//! gestures.  The clock is only stamped through
//! [`GestureStateMachine::stamp_vertical`], once the caller knows the swipe
//! resolved to an action.
//!
//! Relayed tuples skip accumulation entirely: the daemon already applied its
//! own thresholds, so each tuple is one gesture.

use crate::action::{Direction, Gesture, MotionSample, Phase, Propagation};
use crate::quantize::{quantize, Quantized};
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Tuning knobs for gesture recognition.
///
/// Thresholds are in the units of the host's motion deltas.  The first
/// crossing of a gesture uses `first_motion_threshold` so a swipe feels
/// responsive; every later crossing within the same gesture uses the larger
/// `motion_threshold`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Threshold for the first action of a gesture.  Default: `100.0`.
    pub first_motion_threshold: f64,
    /// Threshold for every following action.  Default: `200.0`.
    pub motion_threshold: f64,
    /// Minimum time between two vertical actions (ms).  Default: `1000`.
    pub vertical_cooldown_ms: u64,
    /// Fingers for switcher / overview / desktop gestures.  Default: `3`.
    pub switch_fingers: u32,
    /// Fingers for relayed workspace changes.  Default: `4`.
    pub workspace_fingers: u32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            first_motion_threshold: 100.0,
            motion_threshold: 200.0,
            vertical_cooldown_ms: 1000,
            switch_fingers: 3,
            workspace_fingers: 4,
        }
    }
}

/// Accumulator with an adaptive threshold for one physical swipe.
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    active: bool,
    dx: f64,
    dy: f64,
    threshold: f64,
    first_motion: f64,
    steady: f64,
}

impl SwipeTracker {
    /// `steady` is raised to `first_motion` if it is smaller.
    pub fn new(first_motion: f64, steady: f64) -> Self {
        Self {
            active: false,
            dx: 0.0,
            dy: 0.0,
            threshold: first_motion,
            first_motion,
            steady: steady.max(first_motion),
        }
    }

    pub fn begin(&mut self) {
        self.active = true;
        self.dx = 0.0;
        self.dy = 0.0;
        self.threshold = self.first_motion;
    }

    /// Add a delta and report the quantized vector if it reached the
    /// current threshold.  The caller decides whether to [`commit`] or
    /// [`rearm`].
    ///
    /// [`commit`]: SwipeTracker::commit
    /// [`rearm`]: SwipeTracker::rearm
    pub fn accumulate(&mut self, dx: f64, dy: f64) -> Option<Quantized> {
        if !dx.is_finite() || !dy.is_finite() {
            debug!("dropping non-finite delta ({}, {})", dx, dy);
            return None;
        }
        self.dx += dx;
        self.dy += dy;
        let q = quantize(self.dx, self.dy);
        (q.magnitude >= self.threshold).then_some(q)
    }

    /// An action fired: start over at the steady-state threshold.
    pub fn commit(&mut self) {
        self.dx = 0.0;
        self.dy = 0.0;
        self.threshold = self.steady;
    }

    /// Start over without touching the threshold.
    pub fn rearm(&mut self) {
        self.dx = 0.0;
        self.dy = 0.0;
    }

    pub fn end(&mut self) {
        self.active = false;
        self.dx = 0.0;
        self.dy = 0.0;
        self.threshold = self.first_motion;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn accumulated(&self) -> (f64, f64) {
        (self.dx, self.dy)
    }
}

/// Guard that lets at most one vertical action through per window.
///
/// It is a guard condition checked against the clock passed in, not a
/// timer.
#[derive(Debug, Clone)]
pub struct CooldownClock {
    window: Duration,
    last: Option<Instant>,
}

impl CooldownClock {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    pub fn ready(&self, now: Instant) -> bool {
        match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.window,
        }
    }

    pub fn stamp(&mut self, now: Instant) {
        self.last = Some(now);
    }

    pub fn last(&self) -> Option<Instant> {
        self.last
    }
}

/// Outcome of feeding one input to the [`GestureStateMachine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Wrong finger count or phase; no state changed.
    Ignored,
    /// Input absorbed into the accumulator; nothing to do yet.
    Pending,
    /// A vertical crossing landed inside the cooldown window.
    Suppressed(Direction),
    /// A gesture was recognised.
    Fired(Gesture),
}

impl Transition {
    /// Only a recognised gesture consumes the input.
    pub fn propagation(&self) -> Propagation {
        match self {
            Transition::Fired(_) => Propagation::Stop,
            _ => Propagation::Propagate,
        }
    }

    pub fn gesture(&self) -> Option<Gesture> {
        match self {
            Transition::Fired(g) => Some(*g),
            _ => None,
        }
    }
}

/// The gesture state machine shared by both input pipelines.
#[derive(Debug, Clone)]
pub struct GestureStateMachine {
    config: GestureConfig,
    tracker: SwipeTracker,
    cooldown: CooldownClock,
}

impl GestureStateMachine {
    pub fn new(config: GestureConfig) -> Self {
        let tracker = SwipeTracker::new(config.first_motion_threshold, config.motion_threshold);
        let cooldown = CooldownClock::new(Duration::from_millis(config.vertical_cooldown_ms));
        Self {
            config,
            tracker,
            cooldown,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn tracker(&self) -> &SwipeTracker {
        &self.tracker
    }

    pub fn cooldown(&self) -> &CooldownClock {
        &self.cooldown
    }

    pub fn is_active(&self) -> bool {
        self.tracker.is_active()
    }

    /// Feed a locally captured sample.
    pub fn on_sample(&mut self, sample: &MotionSample, now: Instant) -> Transition {
        if sample.fingers != self.config.switch_fingers {
            return Transition::Ignored;
        }

        match sample.phase {
            Phase::Begin => {
                debug!("swipe begin: {} fingers", sample.fingers);
                self.tracker.begin();
                Transition::Pending
            }
            Phase::Update => {
                if !self.tracker.is_active() {
                    debug!("swipe update without begin, starting gesture");
                    self.tracker.begin();
                }
                match self.tracker.accumulate(sample.dx, sample.dy) {
                    None => Transition::Pending,
                    Some(q) => {
                        if !self.vertical_ready(q.direction, now) {
                            self.tracker.rearm();
                            return Transition::Suppressed(q.direction);
                        }
                        debug!(
                            "swipe {} crossed {:.1} (magnitude {:.1})",
                            q.direction,
                            self.tracker.threshold(),
                            q.magnitude
                        );
                        if q.direction.is_vertical() {
                            // Threshold rises in stamp_vertical.
                            self.tracker.rearm();
                        } else {
                            self.tracker.commit();
                        }
                        Transition::Fired(Gesture::Swipe(q.direction))
                    }
                }
            }
            Phase::End | Phase::Cancel => {
                if !self.tracker.is_active() {
                    return Transition::Ignored;
                }
                debug!("swipe {:?}", sample.phase);
                self.tracker.end();
                Transition::Fired(Gesture::Finish)
            }
        }
    }

    /// Feed a relayed `(fingers, direction)` tuple.
    ///
    /// `fingers == 0` is the daemon's end-of-gesture marker and finishes
    /// regardless of any local state.
    pub fn on_remote(&mut self, fingers: u32, direction: Direction, now: Instant) -> Transition {
        if fingers == 0 {
            self.tracker.end();
            return Transition::Fired(Gesture::Finish);
        }
        if fingers == self.config.switch_fingers {
            if !self.vertical_ready(direction, now) {
                return Transition::Suppressed(direction);
            }
            return Transition::Fired(Gesture::Swipe(direction));
        }
        if fingers == self.config.workspace_fingers {
            return Transition::Fired(Gesture::Workspace(direction));
        }
        Transition::Ignored
    }

    /// Drop any in-flight gesture.  The cooldown clock is kept.
    pub fn reset(&mut self) {
        self.tracker.end();
    }

    /// A vertical swipe fired at `now` and resolved to an action: start the
    /// cooldown window and, mid-gesture, raise the threshold like any other
    /// action.
    pub fn stamp_vertical(&mut self, now: Instant) {
        self.cooldown.stamp(now);
        if self.tracker.is_active() {
            self.tracker.commit();
        }
    }

    /// `true` if the direction may fire now.
    fn vertical_ready(&self, direction: Direction, now: Instant) -> bool {
        if !direction.is_vertical() || self.cooldown.ready(now) {
            return true;
        }
        debug!("vertical swipe {} inside cooldown", direction);
        false
    }
}
