//! Core editor types shared by scenes, states and tool modes.

mod selection;
mod settings;
mod signal;

pub use selection::{SelectionManager, SelectionMode};
pub use settings::{ConfigError, ToolSettings};
pub use signal::{EditorSignals, SignalId, SignalRegistry};

/// Entity identifier used throughout the editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Modifier keys, sampled by the host when a signal is dispatched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self { shift: false, ctrl: false, alt: false };

    /// Picks toggle into the existing selection instead of replacing it.
    #[inline]
    pub fn additive(&self) -> bool {
        self.shift
    }

    /// Duplicate requests actually copy.
    #[inline]
    pub fn copy(&self) -> bool {
        self.ctrl
    }
}

/// Axis lock for the transform tools.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(&self) -> glam::Vec3 {
        match self {
            Axis::X => glam::Vec3::X,
            Axis::Y => glam::Vec3::Y,
            Axis::Z => glam::Vec3::Z,
        }
    }
}
