//! Tool modes.
//!
//! A mode ([`Mod`]) owns one state machine and turns the events its states
//! report into scene changes. The [`ModManager`] keeps a permanent base mode
//! at the bottom of its stack and at most one tool mode above it.

mod base;
mod manager;
mod select;
mod transform;

pub use base::BaseMod;
pub use manager::{ModFactory, ModManager};
pub use select::{CursorMod, SelectMod};
pub use transform::TransformMod;

use crate::context::ToolContext;
use crate::core::{SignalId, SignalRegistry};
use crate::state::{State, StateTag};
use crate::states::TransformKind;

/// Identifier of a tool mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModId {
    Base,
    Select,
    Cursor,
    Move,
    Rotate,
    Scale,
    Anchor,
}

impl ModId {
    pub fn name(&self) -> &'static str {
        match self {
            ModId::Base => "Base",
            ModId::Select => "Select",
            ModId::Cursor => "Cursor",
            ModId::Move => "Move",
            ModId::Rotate => "Rotate",
            ModId::Scale => "Scale",
            ModId::Anchor => "Anchor",
        }
    }

    /// Keyboard shortcut (e.g., "Q", "W", "E", "R").
    pub fn shortcut(&self) -> Option<&'static str> {
        match self {
            ModId::Select => Some("Q"),
            ModId::Move => Some("W"),
            ModId::Rotate => Some("E"),
            ModId::Scale => Some("R"),
            ModId::Cursor => Some("C"),
            ModId::Anchor | ModId::Base => None,
        }
    }

    /// Every mode a host can activate.
    pub fn tools() -> &'static [ModId] {
        &[
            ModId::Select,
            ModId::Cursor,
            ModId::Move,
            ModId::Rotate,
            ModId::Scale,
            ModId::Anchor,
        ]
    }

    /// Find a mode by its shortcut key.
    pub fn from_shortcut(key: &str) -> Option<ModId> {
        Self::tools().iter().copied().find(|id| id.shortcut() == Some(key))
    }
}

impl std::fmt::Display for ModId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One complete tool mode.
pub trait Mod {
    fn id(&self) -> ModId;

    /// Build and wire the state machine.
    fn init(&mut self, _signals: &SignalRegistry) {}

    /// Called right before the mode is destroyed.
    fn un_init(&mut self) {}

    /// Called once per frame while the mode is on top of the stack.
    fn update(&mut self, dt: f32, ctx: &mut ToolContext<'_>);

    /// Called once per signal while the mode is on top of the stack.
    fn signal(&mut self, signal: SignalId, ctx: &mut ToolContext<'_>);

    /// Tag of the machine's current state.
    fn current_state(&self) -> Option<StateTag>;
}

/// Construct a tool mode by id. The base mode is not constructible.
pub fn create_mod(id: ModId) -> Option<Box<dyn Mod>> {
    match id {
        ModId::Select => Some(Box::new(SelectMod::new())),
        ModId::Cursor => Some(Box::new(CursorMod::new())),
        ModId::Move => Some(Box::new(TransformMod::new(TransformKind::Move))),
        ModId::Rotate => Some(Box::new(TransformMod::new(TransformKind::Rotate))),
        ModId::Scale => Some(Box::new(TransformMod::new(TransformKind::Scale))),
        ModId::Anchor => Some(Box::new(TransformMod::new(TransformKind::Anchor))),
        ModId::Base => None,
    }
}

/// Box a state after adding its fallback links.
pub(crate) fn linked<D, S>(mut state: S, links: &[(SignalId, StateTag)]) -> Box<dyn State<D>>
where
    S: State<D> + 'static,
{
    for &(signal, target) in links {
        state.link(signal, target);
    }
    Box::new(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcuts() {
        assert_eq!(ModId::from_shortcut("W"), Some(ModId::Move));
        assert_eq!(ModId::from_shortcut("Z"), None);
    }

    #[test]
    fn test_factory_covers_tools_only() {
        for &id in ModId::tools() {
            let created = create_mod(id).map(|m| m.id());
            assert_eq!(created, Some(id));
        }
        assert!(create_mod(ModId::Base).is_none());
    }
}
