//! Events and actions shared by every component.
//!
//! Input arrives as an [`InputEvent`]: either a phase-tagged
//! [`MotionSample`] from local capture, or a discrete `(fingers, direction)`
//! tuple relayed over the bus.  The state machine turns those into
//! [`Gesture`]s, and the dispatcher resolves gestures into [`Action`]s.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One of the four compass directions a swipe resolves to.
///
/// The discriminants are the bus wire codes (`0=Right, 1=Down, 2=Left,
/// 3=Up`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    Right = 0,
    Down = 1,
    Left = 2,
    Up = 3,
}

impl Direction {
    /// Decode a bus wire code.  Codes above 3 have no direction.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Direction::Right),
            1 => Some(Direction::Down),
            2 => Some(Direction::Left),
            3 => Some(Direction::Up),
            _ => None,
        }
    }

    /// The bus wire code for this direction.
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Up and down are vertical; they are subject to the cooldown.
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Right => write!(f, "right"),
            Direction::Down => write!(f, "down"),
            Direction::Left => write!(f, "left"),
            Direction::Up => write!(f, "up"),
        }
    }
}

/// Accepts either the wire code (`2`) or a name (`"left"`, `"Left"`).
impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = Direction;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "direction code 0-3 or direction name")
            }
            fn visit_u64<E>(self, n: u64) -> Result<Direction, E>
            where
                E: DeError,
            {
                u32::try_from(n)
                    .ok()
                    .and_then(Direction::from_code)
                    .ok_or_else(|| DeError::custom(format!("invalid direction code: {}", n)))
            }
            fn visit_str<E>(self, s: &str) -> Result<Direction, E>
            where
                E: DeError,
            {
                match s.trim().to_lowercase().as_str() {
                    "right" => Ok(Direction::Right),
                    "down" => Ok(Direction::Down),
                    "left" => Ok(Direction::Left),
                    "up" => Ok(Direction::Up),
                    _ => Err(DeError::custom(format!("invalid direction: {:?}", s))),
                }
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// Phase of a touchpad swipe as reported by the input stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Begin,
    Update,
    End,
    Cancel,
}

/// A single motion tick from local capture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub dx: f64,
    pub dy: f64,
    pub phase: Phase,
    pub fingers: u32,
}

impl MotionSample {
    pub fn new(phase: Phase, fingers: u32, dx: f64, dy: f64) -> Self {
        Self {
            dx,
            dy,
            phase,
            fingers,
        }
    }

    pub fn begin(fingers: u32) -> Self {
        Self::new(Phase::Begin, fingers, 0.0, 0.0)
    }

    pub fn update(fingers: u32, dx: f64, dy: f64) -> Self {
        Self::new(Phase::Update, fingers, dx, dy)
    }

    pub fn end(fingers: u32) -> Self {
        Self::new(Phase::End, fingers, 0.0, 0.0)
    }
}

/// The single event shape consumed by the gesture state machine, whichever
/// pipeline produced it.
///
/// On the wire (Unix socket) every event is one line of JSON:
///
/// ```json
/// {"Motion":{"dx":12.5,"dy":-3.0,"phase":"Update","fingers":3}}
/// {"Remote":{"fingers":4,"direction":2}}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Raw sample from local capture; accumulated against the threshold.
    Motion(MotionSample),
    /// Discrete tuple relayed by the gesture-capture daemon.
    Remote { fingers: u32, direction: Direction },
}

/// What the state machine recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// A switch-finger swipe crossed the threshold in `Direction`.
    Swipe(Direction),
    /// A workspace-finger swipe (relayed only).
    Workspace(Direction),
    /// The gesture ended; close whatever it opened.
    Finish,
}

/// Relative workspace move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceStep {
    Next,
    Previous,
}

impl WorkspaceStep {
    /// Content follows the fingers: swiping left or up reveals the next
    /// workspace.
    pub fn from_direction(dir: Direction) -> Self {
        match dir {
            Direction::Left | Direction::Up => WorkspaceStep::Next,
            Direction::Right | Direction::Down => WorkspaceStep::Previous,
        }
    }

    pub fn delta(self) -> i64 {
        match self {
            WorkspaceStep::Next => 1,
            WorkspaceStep::Previous => -1,
        }
    }
}

/// Every discrete effect the dispatcher can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveRight,
    MoveLeft,
    CloseSwitcher,
    ShowDesktop,
    UnshowDesktop,
    ShowOverview,
    HideOverview,
    ChangeWorkspace(WorkspaceStep),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::MoveRight => write!(f, "move-right"),
            Action::MoveLeft => write!(f, "move-left"),
            Action::CloseSwitcher => write!(f, "close-switcher"),
            Action::ShowDesktop => write!(f, "show-desktop"),
            Action::UnshowDesktop => write!(f, "unshow-desktop"),
            Action::ShowOverview => write!(f, "show-overview"),
            Action::HideOverview => write!(f, "hide-overview"),
            Action::ChangeWorkspace(step) => write!(f, "change-workspace({:+})", step.delta()),
        }
    }
}

/// Whether the host should keep delivering an input event down its stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Propagate,
    Stop,
}
