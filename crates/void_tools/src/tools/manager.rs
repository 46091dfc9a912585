//! Tool mode stack.

use super::{create_mod, BaseMod, Mod, ModId};
use crate::context::ToolContext;
use crate::core::{SignalId, SignalRegistry};
use crate::viewport::Viewport;

/// Builds tool modes by id. `None` marks an id the factory cannot build.
pub type ModFactory = Box<dyn Fn(ModId) -> Option<Box<dyn Mod>>>;

/// Stack of tool modes. The bottom entry is the permanent base mode; at most
/// one tool mode sits above it and receives every tick and signal.
pub struct ModManager {
    stack: Vec<Box<dyn Mod>>,
    factory: ModFactory,
}

impl Default for ModManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ModManager {
    pub fn new() -> Self {
        Self::with_factory(Box::new(BaseMod::new()), Box::new(create_mod))
    }

    /// Use a custom base mode and factory.
    pub fn with_factory(base: Box<dyn Mod>, factory: ModFactory) -> Self {
        Self {
            stack: vec![base],
            factory,
        }
    }

    /// Replace the active tool mode with a fresh `id` mode. Does nothing
    /// unless `activate` is set.
    ///
    /// Any overlay commands queued on `viewport` are dropped.
    ///
    /// # Panics
    ///
    /// Panics if the factory cannot build `id`.
    pub fn set_mod(
        &mut self,
        activate: bool,
        id: ModId,
        signals: &SignalRegistry,
        viewport: Option<&mut dyn Viewport>,
    ) {
        if !activate {
            return;
        }

        if self.stack.len() > 1 {
            if let Some(mut prev) = self.stack.pop() {
                prev.un_init();
                log::debug!("Released mod {}", prev.id());
            }
        }

        let Some(mut next) = (self.factory)(id) else {
            panic!("no tool mode registered for {:?}", id);
        };
        next.init(signals);
        self.stack.push(next);
        log::info!("Mod: {}", id);

        if let Some(vp) = viewport {
            vp.clear_draw_commands();
        }
    }

    /// Tick the active mode.
    pub fn update(&mut self, dt: f32, ctx: &mut ToolContext<'_>) {
        if let Some(top) = self.stack.last_mut() {
            top.update(dt, ctx);
        }
    }

    /// Deliver a signal to the active mode.
    pub fn dispatch_signal(&mut self, signal: SignalId, ctx: &mut ToolContext<'_>) {
        if let Some(top) = self.stack.last_mut() {
            top.signal(signal, ctx);
        }
    }

    pub fn active(&self) -> Option<&dyn Mod> {
        self.stack.last().map(|m| m.as_ref())
    }

    pub fn active_id(&self) -> Option<ModId> {
        self.active().map(|m| m.id())
    }

    /// Number of modes on the stack, base included.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::{DrawCommand, ViewportState};
    use glam::Vec2;

    #[test]
    fn test_base_stays_at_bottom() {
        let signals = SignalRegistry::new();
        let mut mods = ModManager::new();
        assert_eq!(mods.active_id(), Some(ModId::Base));

        mods.set_mod(true, ModId::Select, &signals, None);
        mods.set_mod(true, ModId::Move, &signals, None);
        assert_eq!(mods.depth(), 2);
        assert_eq!(mods.active_id(), Some(ModId::Move));

        mods.set_mod(false, ModId::Cursor, &signals, None);
        assert_eq!(mods.active_id(), Some(ModId::Move));
    }

    #[test]
    fn test_set_mod_clears_overlay() {
        let signals = SignalRegistry::new();
        let mut vp = ViewportState::new(100, 100);
        vp.push_draw_command(DrawCommand::SelectionRect { min: Vec2::ZERO, max: Vec2::ONE });

        let mut mods = ModManager::new();
        mods.set_mod(true, ModId::Select, &signals, Some(&mut vp));
        assert!(vp.draw_commands().is_empty());
    }

    #[test]
    fn test_new_mod_starts_in_begin_state() {
        let signals = SignalRegistry::new();
        let mut mods = ModManager::new();
        mods.set_mod(true, ModId::Anchor, &signals, None);
        assert_eq!(mods.active().and_then(|m| m.current_state()), Some(crate::state::StateTag::ANCHOR_BEGIN));
    }

    #[test]
    #[should_panic(expected = "no tool mode")]
    fn test_base_is_not_constructible() {
        let signals = SignalRegistry::new();
        let mut mods = ModManager::new();
        mods.set_mod(true, ModId::Base, &signals, None);
    }
}
