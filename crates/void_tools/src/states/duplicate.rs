//! Duplicate state.

use glam::Vec3;
use void_transform::TransformSpace;

use crate::actions::CreateAction;
use crate::context::ToolContext;
use crate::core::{EntityId, SelectionMode};
use crate::scene::EntityKind;
use crate::state::{State, StateBase, StateReply, StateTag, ToolEvent};

/// Copies the selected root entities on entry and selects the copies.
///
/// Nothing is copied unless the copy modifier is held, but the source
/// selection is cleared either way. Generic over the scratch data so any
/// tool mode can wire it in.
pub struct Duplicate<D> {
    base: StateBase<D>,
    copies: Vec<EntityId>,
}

impl<D: Default> Default for Duplicate<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Default> Duplicate<D> {
    pub fn new() -> Self {
        Self {
            base: StateBase::new(),
            copies: Vec::new(),
        }
    }
}

impl<D> State<D> for Duplicate<D> {
    fn tag(&self) -> StateTag {
        StateTag::DUPLICATE
    }

    fn base(&self) -> &StateBase<D> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut StateBase<D> {
        &mut self.base
    }

    fn transition_in(&mut self, _prev: Option<StateTag>, ctx: &mut ToolContext<'_>) {
        self.copies.clear();

        let selected = ctx.scene.selected_entities();
        if selected.is_empty() {
            return;
        }

        ctx.scene.clear_selection();
        ctx.actions.begin_action_group();

        let roots = ctx.scene.root_entities(&selected);
        let offset = Vec3::from(ctx.settings.duplicate_offset);

        let mut count = 0;
        if ctx.modifiers.copy() {
            for root in roots {
                let is_prefab = ctx
                    .scene
                    .get_entity(root)
                    .is_some_and(|e| e.kind == EntityKind::Prefab);

                // A prefab recreates its own nested entities.
                let copies = if is_prefab {
                    ctx.scene.copy_entity(root).map(|copy| vec![copy])
                } else {
                    ctx.scene.deep_copy(root)
                };
                let copies = match copies {
                    Ok(copies) if !copies.is_empty() => copies,
                    Ok(_) => continue,
                    Err(e) => {
                        log::warn!("Could not copy {}: {}", root, e);
                        continue;
                    }
                };

                let first = copies[0];
                if offset != Vec3::ZERO {
                    if let Some(node) = ctx.scene.node_of(first) {
                        ctx.scene.nodes_mut().translate(node, offset, TransformSpace::World);
                    }
                }

                for &copy in &copies {
                    ctx.actions.add_action(Box::new(CreateAction::new(copy)));
                }
                ctx.scene.select(first, SelectionMode::Add);

                count += copies.len();
                self.copies.extend(copies);
                ctx.scene.set_status(format!("{} entities are copied.", count));
            }
        }

        ctx.actions.group_last_actions(count);
    }

    fn update(&mut self, _dt: f32, _ctx: &mut ToolContext<'_>) -> StateReply {
        StateReply::Event(ToolEvent::Duplicated(self.copies.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionManager;
    use crate::core::{Modifiers, SignalRegistry, ToolSettings};
    use crate::scene::EditorScene;

    fn enter(scene: &mut EditorScene, actions: &mut ActionManager, modifiers: Modifiers) -> Vec<EntityId> {
        let signals = SignalRegistry::new();
        let settings = ToolSettings::default();
        let mut ctx = ToolContext::new(scene, actions, &signals, &settings).with_modifiers(modifiers);

        let mut state: Duplicate<()> = Duplicate::new();
        state.transition_in(None, &mut ctx);
        match state.update(0.0, &mut ctx) {
            StateReply::Event(ToolEvent::Duplicated(ids)) => ids,
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn test_copy_modifier_required() {
        let mut scene = EditorScene::new();
        let mut actions = ActionManager::new();
        let a = scene.add_entity("a", EntityKind::Node);
        scene.select(a, SelectionMode::Replace);

        let copies = enter(&mut scene, &mut actions, Modifiers::NONE);
        assert!(copies.is_empty());
        assert_eq!(scene.len(), 1);
        assert!(scene.selected_entities().is_empty());
        assert!(!actions.can_undo());
    }

    #[test]
    fn test_copies_roots_as_one_group() {
        let mut scene = EditorScene::new();
        let mut actions = ActionManager::new();
        let p = scene.add_entity("p", EntityKind::Node);
        let c = scene.add_entity("c", EntityKind::Node);
        scene.set_parent(c, Some(p)).unwrap();
        scene.add_to_selection(&[p, c], false);

        let ctrl = Modifiers { ctrl: true, ..Modifiers::NONE };
        let copies = enter(&mut scene, &mut actions, ctrl);

        assert_eq!(copies.len(), 2);
        assert_eq!(scene.len(), 4);
        assert_eq!(scene.selected_entities(), vec![copies[0]]);
        assert_eq!(actions.undo_count(), 1);
        assert_eq!(scene.status(), "2 entities are copied.");

        actions.undo(&mut scene).unwrap();
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_prefab_copied_shallow() {
        let mut scene = EditorScene::new();
        let mut actions = ActionManager::new();
        let prefab = scene.add_entity("prefab", EntityKind::Prefab);
        let part = scene.add_entity("part", EntityKind::Node);
        scene.set_parent(part, Some(prefab)).unwrap();
        scene.select(prefab, SelectionMode::Replace);

        let ctrl = Modifiers { ctrl: true, ..Modifiers::NONE };
        let copies = enter(&mut scene, &mut actions, ctrl);

        assert_eq!(copies.len(), 1);
        assert_eq!(scene.children_of(copies[0]).len(), 1);
    }
}
