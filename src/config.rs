//! Application configuration.
//!
//! Loaded from a JSON file; the binary looks for
//! `$XDG_CONFIG_HOME/tpswitcher/config.json`.  Every section is optional and
//! falls back to its compiled-in defaults, so a minimal `{}` file is valid.
//!
//! # Example
//!
//! ```json
//! {
//!   "gestures": {
//!     "first_motion_threshold": 100.0,
//!     "motion_threshold": 200.0,
//!     "vertical_cooldown_ms": 1000
//!   },
//!   "relay": { "first_motion_threshold": 25.0, "motion_threshold": 50.0 },
//!   "desktop": { "strategy": "hotkey" },
//!   "ipc": { "bus_name": "com.gonzaarcr.tpgesture" },
//!   "overview": { "max_preview_scale": 0.7 }
//! }
//! ```

use crate::desktop::DesktopConfig;
use crate::gesture::GestureConfig;
use crate::ipc::relay::RelayConfig;
use crate::ipc::IpcConfig;
use crate::layout::OverviewConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Local gesture recognition.
    #[serde(default)]
    pub gestures: GestureConfig,

    /// Relay daemon quantization and socket.
    #[serde(default)]
    pub relay: RelayConfig,

    /// Show-desktop strategy.
    #[serde(default)]
    pub desktop: DesktopConfig,

    /// Session-bus names.
    #[serde(default)]
    pub ipc: IpcConfig,

    #[serde(default)]
    pub overview: OverviewConfig,
}

impl Config {
    /// Load and validate configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&contents)
            .map_err(|e| ConfigError(format!("{}: {}", path.display(), e.0)))
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ConfigError(format!("failed to parse: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_thresholds(
            "gestures",
            self.gestures.first_motion_threshold,
            self.gestures.motion_threshold,
        )?;
        check_thresholds(
            "relay",
            self.relay.first_motion_threshold,
            self.relay.motion_threshold,
        )?;
        if self.gestures.switch_fingers == self.gestures.workspace_fingers {
            return Err(ConfigError(format!(
                "gestures: switch_fingers and workspace_fingers are both {}",
                self.gestures.switch_fingers
            )));
        }
        if self.gestures.switch_fingers == 0 || self.gestures.workspace_fingers == 0 {
            return Err(ConfigError("gestures: 0 fingers is reserved for end of gesture".into()));
        }
        if !(self.overview.max_preview_scale > 0.0) {
            return Err(ConfigError(format!(
                "overview: max_preview_scale must be positive, got {}",
                self.overview.max_preview_scale
            )));
        }
        Ok(())
    }
}

fn check_thresholds(section: &str, first: f64, steady: f64) -> Result<(), ConfigError> {
    if !(first > 0.0) {
        return Err(ConfigError(format!(
            "{}: first_motion_threshold must be positive, got {}",
            section, first
        )));
    }
    if !(steady >= first) {
        return Err(ConfigError(format!(
            "{}: motion_threshold ({}) is below first_motion_threshold ({})",
            section, steady, first
        )));
    }
    Ok(())
}

/// `$XDG_CONFIG_HOME/tpswitcher`, or `~/.config/tpswitcher`.
pub fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("tpswitcher")
}

/// Error from loading, parsing or validating a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::DesktopStrategy;

    #[test]
    fn deserialize_full_config() {
        let json = r#"{
            "gestures": {
                "first_motion_threshold": 80.0,
                "motion_threshold": 160.0,
                "vertical_cooldown_ms": 500,
                "switch_fingers": 3,
                "workspace_fingers": 4
            },
            "relay": {
                "first_motion_threshold": 20.0,
                "motion_threshold": 40.0,
                "fingers": [3],
                "socket_path": "/run/user/1000/tp.sock"
            },
            "desktop": {
                "strategy": "hotkey",
                "hotkey": [65515, 100],
                "suppress_animations": false
            },
            "ipc": {
                "enabled": false,
                "bus_name": "org.example.Touchpad",
                "object_path": "/org/example/Touchpad"
            },
            "overview": { "max_preview_scale": 0.5 }
        }"#;
        let cfg = Config::from_json(json).unwrap();
        assert_eq!(cfg.gestures.first_motion_threshold, 80.0);
        assert_eq!(cfg.gestures.vertical_cooldown_ms, 500);
        assert_eq!(cfg.relay.fingers, vec![3]);
        assert_eq!(
            cfg.relay.socket_path(),
            PathBuf::from("/run/user/1000/tp.sock")
        );
        assert_eq!(cfg.desktop.strategy, DesktopStrategy::Hotkey);
        assert_eq!(cfg.desktop.hotkey, vec![65515, 100]);
        assert!(!cfg.ipc.enabled);
        assert_eq!(cfg.ipc.bus_name, "org.example.Touchpad");
        assert_eq!(cfg.overview.max_preview_scale, 0.5);
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg = Config::from_json("{}").unwrap();
        let gd = GestureConfig::default();
        assert_eq!(cfg.gestures.first_motion_threshold, gd.first_motion_threshold);
        assert_eq!(cfg.gestures.motion_threshold, gd.motion_threshold);
        assert_eq!(cfg.gestures.vertical_cooldown_ms, 1000);
        assert_eq!(cfg.relay.first_motion_threshold, 25.0);
        assert_eq!(cfg.relay.motion_threshold, 50.0);
        assert_eq!(cfg.relay.fingers, vec![3, 4]);
        assert_eq!(cfg.desktop.strategy, DesktopStrategy::Minimize);
        assert!(cfg.ipc.enabled);
        assert_eq!(cfg.ipc.bus_name, "com.gonzaarcr.tpgesture");
        assert_eq!(cfg.ipc.object_path, "/com/gonzaarcr/tpgesture");
        assert_eq!(cfg.overview.max_preview_scale, 0.7);
    }

    #[test]
    fn deserialize_partial_gestures() {
        let cfg = Config::from_json(r#"{ "gestures": { "motion_threshold": 300.0 } }"#).unwrap();
        assert_eq!(cfg.gestures.motion_threshold, 300.0);
        assert_eq!(
            cfg.gestures.first_motion_threshold,
            GestureConfig::default().first_motion_threshold
        );
    }

    #[test]
    fn unknown_top_level_keys_ignored() {
        let json = r#"{ "gestures": {}, "future_section": { "key": 42 } }"#;
        Config::from_json(json).unwrap();
    }

    #[test]
    fn steady_below_first_is_rejected() {
        let json = r#"{ "gestures": { "first_motion_threshold": 300.0, "motion_threshold": 200.0 } }"#;
        assert!(Config::from_json(json).is_err());
        let json = r#"{ "relay": { "first_motion_threshold": 60.0 } }"#;
        assert!(Config::from_json(json).is_err());
    }

    #[test]
    fn non_positive_threshold_is_rejected() {
        let json = r#"{ "gestures": { "first_motion_threshold": 0.0 } }"#;
        assert!(Config::from_json(json).is_err());
    }

    #[test]
    fn overlapping_finger_counts_rejected() {
        let json = r#"{ "gestures": { "switch_fingers": 4 } }"#;
        assert!(Config::from_json(json).is_err());
        let json = r#"{ "gestures": { "switch_fingers": 0 } }"#;
        assert!(Config::from_json(json).is_err());
    }

    #[test]
    fn bad_strategy_is_a_parse_error() {
        let json = r#"{ "desktop": { "strategy": "teleport" } }"#;
        assert!(Config::from_json(json).is_err());
    }

    #[test]
    fn load_missing_file_fails() {
        let path = std::env::temp_dir().join("tpswitcher-does-not-exist.json");
        assert!(Config::load(&path).is_err());
    }
}
