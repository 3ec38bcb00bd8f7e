//! Show-desktop / unshow-desktop strategies.
//!
//! Two interchangeable [`DesktopEffector`]s exist because direct window
//! minimization is not available on every display-server backend:
//!
//! * [`MinimizeDesktop`] minimizes every visible window on the active
//!   workspace itself and remembers exactly which ones, so unshow restores
//!   those and nothing a third party minimized.
//! * [`HotkeyDesktop`] sends the host's show-desktop chord through a
//!   [`VirtualKeyboard`].  It works everywhere, but the host owns the toggle
//!   and nobody knows who hid what.

use crate::traits::{AnimationSettings, KeyState, VirtualKeyboard, WindowManager};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// XKB keysym for `Super_L`.
pub const KEY_SUPER_L: u32 = 0xffeb;
/// XKB keysym for `D`.
pub const KEY_D: u32 = 0x0044;

/// Which [`DesktopEffector`] to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesktopStrategy {
    Minimize,
    Hotkey,
}

/// Desktop effector settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DesktopConfig {
    /// Default: `minimize`.
    pub strategy: DesktopStrategy,
    /// Keysyms pressed in order, then released in order, by the hotkey
    /// strategy.  Default: `Super_L + D`.
    pub hotkey: Vec<u32>,
    /// Turn host animations off while minimizing or restoring.
    /// Default: `true`.
    pub suppress_animations: bool,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            strategy: DesktopStrategy::Minimize,
            hotkey: vec![KEY_SUPER_L, KEY_D],
            suppress_animations: true,
        }
    }
}

/// Error from a desktop effector.
#[derive(Debug, thiserror::Error)]
#[error("desktop effector error: {0}")]
pub struct EffectorError(String);

/// Capability interface both strategies satisfy.
pub trait DesktopEffector<W: WindowManager> {
    /// The active workspace has at least one window that is not hidden.
    fn can_show_desktop(&self, wm: &W) -> bool;

    /// The active workspace has windows and all of them are hidden (and,
    /// where the strategy can tell, this effector hid them).
    fn can_unshow_desktop(&self, wm: &W) -> bool;

    fn show_desktop(&mut self, wm: &W) -> Result<(), EffectorError>;

    fn unshow_desktop(&mut self, wm: &W) -> Result<(), EffectorError>;
}

/// Build the effector selected by `config`.
pub fn effector_for<W, K>(
    config: &DesktopConfig,
    keyboard: K,
    animations: Option<Box<dyn AnimationSettings>>,
) -> Box<dyn DesktopEffector<W>>
where
    W: WindowManager + 'static,
    K: VirtualKeyboard + 'static,
{
    match config.strategy {
        DesktopStrategy::Minimize => {
            let animations = if config.suppress_animations {
                animations
            } else {
                None
            };
            Box::new(MinimizeDesktop::new(animations))
        }
        DesktopStrategy::Hotkey => Box::new(HotkeyDesktop::new(keyboard, config.hotkey.clone())),
    }
}

fn windows_or_empty<W: WindowManager>(wm: &W) -> Vec<W::Window> {
    wm.list_windows().unwrap_or_else(|e| {
        warn!("listing windows failed: {}", e);
        Vec::new()
    })
}

fn any_visible<W: WindowManager>(wm: &W) -> bool {
    windows_or_empty(wm).iter().any(|w| !wm.is_hidden(w))
}

fn all_hidden<W: WindowManager>(wm: &W) -> bool {
    let windows = windows_or_empty(wm);
    !windows.is_empty() && windows.iter().all(|w| wm.is_hidden(w))
}

/// Turns host animations off for its lifetime, then restores them if they
/// were on.
struct AnimationsSuppressed<'a> {
    settings: &'a dyn AnimationSettings,
    restore: bool,
}

impl<'a> AnimationsSuppressed<'a> {
    fn new(settings: &'a dyn AnimationSettings) -> Self {
        let restore = settings.animations_enabled();
        if restore {
            settings.set_animations_enabled(false);
        }
        Self { settings, restore }
    }
}

impl Drop for AnimationsSuppressed<'_> {
    fn drop(&mut self) {
        if self.restore {
            self.settings.set_animations_enabled(true);
        }
    }
}

/// Minimizes windows directly and tracks the ones it minimized.
pub struct MinimizeDesktop<W: WindowManager> {
    minimized_by_us: Vec<W::Window>,
    animations: Option<Box<dyn AnimationSettings>>,
}

impl<W: WindowManager> MinimizeDesktop<W> {
    pub fn new(animations: Option<Box<dyn AnimationSettings>>) -> Self {
        Self {
            minimized_by_us: Vec::new(),
            animations,
        }
    }

    /// Windows the next unshow will restore.
    pub fn minimized_by_us(&self) -> &[W::Window] {
        &self.minimized_by_us
    }
}

impl<W: WindowManager> DesktopEffector<W> for MinimizeDesktop<W> {
    fn can_show_desktop(&self, wm: &W) -> bool {
        any_visible(wm)
    }

    fn can_unshow_desktop(&self, wm: &W) -> bool {
        !self.minimized_by_us.is_empty() && all_hidden(wm)
    }

    fn show_desktop(&mut self, wm: &W) -> Result<(), EffectorError> {
        let windows = wm
            .list_windows()
            .map_err(|e| EffectorError(format!("list windows: {}", e)))?;
        let _quiet = self.animations.as_deref().map(AnimationsSuppressed::new);

        self.minimized_by_us.clear();
        for window in windows {
            if wm.is_hidden(&window) {
                continue;
            }
            match wm.minimize(&window) {
                Ok(()) => self.minimized_by_us.push(window),
                Err(e) => warn!("minimize {:?}: {}", window, e),
            }
        }
        info!("minimized {} window(s)", self.minimized_by_us.len());
        Ok(())
    }

    fn unshow_desktop(&mut self, wm: &W) -> Result<(), EffectorError> {
        if self.minimized_by_us.is_empty() {
            debug!("nothing to restore");
            return Ok(());
        }
        let _quiet = self.animations.as_deref().map(AnimationsSuppressed::new);

        let windows = std::mem::take(&mut self.minimized_by_us);
        for window in &windows {
            if let Err(e) = wm.unminimize(window) {
                warn!("unminimize {:?}: {}", window, e);
            }
        }
        info!("restored {} window(s)", windows.len());
        Ok(())
    }
}

/// Delegates the show-desktop toggle to the host's keyboard shortcut.
pub struct HotkeyDesktop<K: VirtualKeyboard> {
    keyboard: K,
    chord: Vec<u32>,
}

impl<K: VirtualKeyboard> HotkeyDesktop<K> {
    pub fn new(keyboard: K, chord: Vec<u32>) -> Self {
        Self { keyboard, chord }
    }

    pub fn keyboard(&self) -> &K {
        &self.keyboard
    }

    /// Press every key in order, then release every key in order.
    fn send_chord(&self) -> Result<(), EffectorError> {
        for state in [KeyState::Pressed, KeyState::Released] {
            for &key in &self.chord {
                self.keyboard
                    .notify_key(key, state)
                    .map_err(|e| EffectorError(format!("key {:#x}: {}", key, e)))?;
            }
        }
        Ok(())
    }
}

impl<W: WindowManager, K: VirtualKeyboard> DesktopEffector<W> for HotkeyDesktop<K> {
    fn can_show_desktop(&self, wm: &W) -> bool {
        any_visible(wm)
    }

    fn can_unshow_desktop(&self, wm: &W) -> bool {
        all_hidden(wm)
    }

    fn show_desktop(&mut self, _wm: &W) -> Result<(), EffectorError> {
        debug!("sending show-desktop chord");
        self.send_chord()
    }

    fn unshow_desktop(&mut self, _wm: &W) -> Result<(), EffectorError> {
        debug!("sending show-desktop chord (toggle back)");
        self.send_chord()
    }
}
