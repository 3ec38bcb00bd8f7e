//! Capability interfaces the engine consumes.
//!
//! The host compositor, its switcher popup, its overview and its synthetic
//! input devices are all injected through these traits.  Nothing in the
//! engine touches a host object directly, so every component can be driven
//! by a recording test double.

use crate::action::InputEvent;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::mpsc;

/// Window and workspace queries and manipulation on the host.
///
/// All queries refer to the **active** workspace.
pub trait WindowManager {
    /// Opaque, comparable handle to a host window.
    type Window: Clone + Eq + Hash + Debug;
    /// The error type produced by this window manager.
    type Error: std::error::Error + Send + 'static;

    /// Windows on the active workspace.
    fn list_windows(&self) -> Result<Vec<Self::Window>, Self::Error>;

    /// Whether the window is currently hidden (minimized or otherwise not
    /// shown).
    fn is_hidden(&self, window: &Self::Window) -> bool;

    fn minimize(&self, window: &Self::Window) -> Result<(), Self::Error>;

    fn unminimize(&self, window: &Self::Window) -> Result<(), Self::Error>;

    /// Zero-based index of the active workspace.
    fn active_workspace_index(&self) -> usize;

    fn workspace_count(&self) -> usize;

    fn activate_workspace(&self, index: usize) -> Result<(), Self::Error>;
}

/// The host's all-windows overview.
///
/// Visibility is only sampled when an action is dispatched.  If the host
/// hides and reopens the overview between two dispatches, the dispatcher
/// cannot tell and keeps its focus cursor.
pub trait Overview {
    type Error: std::error::Error + Send + 'static;

    fn is_visible(&self) -> bool;

    fn show(&self) -> Result<(), Self::Error>;

    fn hide(&self) -> Result<(), Self::Error>;

    /// Move keyboard focus to entry `index` of the focus chain.  `forward`
    /// tells the host which way the cursor travelled.
    fn navigate_focus(&self, index: usize, forward: bool) -> Result<(), Self::Error>;

    /// Number of navigable windows on the current workspace.
    fn focus_chain_length(&self) -> usize;

    /// Activate entry `index` of the focus chain, closing the overview.
    fn activate_focused(&self, index: usize) -> Result<(), Self::Error>;
}

/// The on-screen window switcher popup.
///
/// The engine owns at most one [`Session`](SwitcherController::Session) at a
/// time and hands it back on [`close`](SwitcherController::close).
pub trait SwitcherController {
    type Session;
    type Error: std::error::Error + Send + 'static;

    /// Show a new popup.  `Ok(None)` means the host declined (for example
    /// there is nothing to switch between).
    fn open(&self) -> Result<Option<Self::Session>, Self::Error>;

    /// Move the selection by `step` (`+1` forward, `-1` backward).
    fn advance(&self, session: &mut Self::Session, step: i32) -> Result<(), Self::Error>;

    /// Finish the session, activating the selection.
    fn close(&self, session: Self::Session) -> Result<(), Self::Error>;
}

/// Key press state for [`VirtualKeyboard::notify_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// A synthetic keyboard device on the host.
pub trait VirtualKeyboard {
    type Error: std::error::Error + Send + 'static;

    /// Inject one key event.  `keysym` is an XKB keysym.
    fn notify_key(&self, keysym: u32, state: KeyState) -> Result<(), Self::Error>;
}

/// The host's global "enable animations" switch.
pub trait AnimationSettings {
    fn animations_enabled(&self) -> bool;

    fn set_animations_enabled(&self, enabled: bool);
}

/// A source of [`InputEvent`]s.
///
/// Implementations listen on some transport (a Unix socket, the session
/// bus, …) and forward every event into the provided [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](EventSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received event is sent through `sink` at most once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait EventSource: Send {
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`InputEvent`] into
    /// `sink`.
    fn run(&mut self, sink: mpsc::Sender<InputEvent>) -> Result<(), Self::Error>;
}

