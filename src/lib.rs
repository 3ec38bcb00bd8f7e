//! **tpswitcher**: touchpad swipe gestures for window switching.
//!
//! Three-finger swipes drive an alt-tab style switcher (left/right), the
//! overview (up/down) and show-desktop (down/up).  Four-finger swipes,
//! relayed over the session bus, change workspace.
//!
//! # Architecture
//!
//! * [`quantize`] and [`gesture`] turn motion samples and relayed tuples
//!   into [`action::Gesture`]s.
//! * [`dispatcher`] resolves gestures to [`action::Action`]s and applies
//!   them through the collaborator traits in [`traits`]; [`desktop`]
//!   provides the show-desktop strategies.
//! * [`engine::GestureEngine`] owns all of the above with an explicit
//!   start/stop lifecycle.
//! * [`ipc`] holds the bus bridge the engine subscribes through and the
//!   relay daemon that publishes swipes (`tpswitcher-relay`).
//! * [`layout`] computes the MRU overview arrangement.

pub mod action;
pub mod config;
pub mod desktop;
pub mod dispatcher;
pub mod engine;
pub mod gesture;
pub mod ipc;
pub mod layout;
pub mod quantize;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;
