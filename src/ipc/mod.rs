//! Inter-process plumbing.
//!
//! Swipes captured by a privileged helper reach the engine in two hops:
//!
//! 1. The relay daemon ([`relay`], [`service`]) reads phase-tagged samples
//!    from a Unix socket ([`listener`]), applies its own thresholds and
//!    broadcasts `TouchpadEvent(fingers, direction)` on the session bus.
//! 2. The engine's [`bridge`] subscribes to that signal and feeds each tuple
//!    into the gesture state machine.

pub mod bridge;
pub mod listener;
pub mod relay;
pub mod service;

use serde::{Deserialize, Serialize};

/// Well-known bus name owned by the relay daemon.
pub const DEFAULT_BUS_NAME: &str = "com.gonzaarcr.tpgesture";
/// Object path the relay serves at.
pub const DEFAULT_OBJECT_PATH: &str = "/com/gonzaarcr/tpgesture";

/// Session-bus settings shared by the bridge and the relay service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IpcConfig {
    /// Subscribe to relayed events at all.  Default: `true`.
    pub enabled: bool,
    /// Default: `com.gonzaarcr.tpgesture`.
    pub bus_name: String,
    /// Default: `/com/gonzaarcr/tpgesture`.
    pub object_path: String,
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bus_name: DEFAULT_BUS_NAME.into(),
            object_path: DEFAULT_OBJECT_PATH.into(),
        }
    }
}
