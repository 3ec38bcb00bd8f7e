//! Daemon-side swipe quantization.
//!
//! The relay sees every swipe the capture helper reports, independent of
//! the engine's own finger-count filter, and turns it into the discrete
//! `(fingers, direction)` tuples broadcast on the bus.  Its thresholds are
//! deliberately lower than the engine's local ones because relayed tuples
//! skip accumulation on the receiving side.

use crate::action::{MotionSample, Phase};
use crate::gesture::SwipeTracker;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Relay daemon settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Default: `25.0`.
    pub first_motion_threshold: f64,
    /// Default: `50.0`.
    pub motion_threshold: f64,
    /// Finger counts that produce tuples.  Default: `[3, 4]`.
    pub fingers: Vec<u32>,
    /// Where samples arrive.  Default: `$XDG_RUNTIME_DIR/tpswitcher.sock`.
    pub socket_path: Option<PathBuf>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            first_motion_threshold: 25.0,
            motion_threshold: 50.0,
            fingers: vec![3, 4],
            socket_path: None,
        }
    }
}

impl RelayConfig {
    /// The configured socket path, or the per-user default.
    pub fn socket_path(&self) -> PathBuf {
        self.socket_path.clone().unwrap_or_else(|| {
            let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
            PathBuf::from(runtime).join("tpswitcher.sock")
        })
    }
}

/// Tuple sent when a gesture ends.
pub const END_OF_GESTURE: (u32, u32) = (0, 0);

pub struct SwipeRelay {
    fingers: Vec<u32>,
    tracker: SwipeTracker,
}

impl SwipeRelay {
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            fingers: config.fingers.clone(),
            tracker: SwipeTracker::new(config.first_motion_threshold, config.motion_threshold),
        }
    }

    /// Feed one sample.  Returns the `(fingers, direction code)` tuple to
    /// broadcast, if any.
    pub fn on_sample(&mut self, sample: &MotionSample) -> Option<(u32, u32)> {
        match sample.phase {
            Phase::End | Phase::Cancel => {
                self.tracker.end();
                Some(END_OF_GESTURE)
            }
            Phase::Begin => {
                self.tracker.begin();
                None
            }
            Phase::Update => {
                if !self.fingers.contains(&sample.fingers) {
                    return None;
                }
                if !self.tracker.is_active() {
                    self.tracker.begin();
                }
                let q = self.tracker.accumulate(sample.dx, sample.dy)?;
                self.tracker.commit();
                debug!("relay {} fingers {}", sample.fingers, q.direction);
                Some((sample.fingers, q.direction.code()))
            }
        }
    }
}
