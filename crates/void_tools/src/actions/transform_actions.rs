//! Transform swap action.

use void_transform::Decomposed;

use super::{Action, ActionError, ActionResult};
use crate::core::EntityId;
use crate::scene::EditorScene;

/// Holds a full local transform snapshot. Undo and redo both swap it with
/// the node's current transform, so repeated undo/redo never drifts.
pub struct TransformAction {
    pub entity: EntityId,
    transform: Decomposed,
}

impl TransformAction {
    /// Capture the entity's current local transform.
    pub fn capture(entity: EntityId, scene: &EditorScene) -> Result<Self, ActionError> {
        let node = scene
            .node_of(entity)
            .and_then(|h| scene.nodes().get(h))
            .ok_or(ActionError::EntityNotFound(entity))?;
        Ok(Self {
            entity,
            transform: Decomposed {
                translation: node.translation,
                orientation: node.orientation,
                scale: node.scale,
            },
        })
    }

    fn swap(&mut self, scene: &mut EditorScene) -> ActionResult {
        let handle = scene
            .node_of(self.entity)
            .ok_or(ActionError::EntityNotFound(self.entity))?;
        let node = scene
            .nodes_mut()
            .get_mut(handle)
            .ok_or(ActionError::EntityNotFound(self.entity))?;

        std::mem::swap(&mut node.translation, &mut self.transform.translation);
        std::mem::swap(&mut node.orientation, &mut self.transform.orientation);
        std::mem::swap(&mut node.scale, &mut self.transform.scale);
        Ok(())
    }
}

impl Action for TransformAction {
    fn description(&self) -> &str {
        "Transform"
    }

    fn undo(&mut self, scene: &mut EditorScene) -> ActionResult {
        self.swap(scene)
    }

    fn redo(&mut self, scene: &mut EditorScene) -> ActionResult {
        self.swap(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::EntityKind;
    use glam::{Quat, Vec3};
    use void_transform::TransformSpace;

    #[test]
    fn test_swap_restores_exact_snapshot() {
        let mut scene = EditorScene::new();
        let a = scene.add_entity("a", EntityKind::Node);
        let h = scene.node_of(a).unwrap();

        let mut action = TransformAction::capture(a, &scene).unwrap();
        scene.nodes_mut().translate(h, Vec3::new(1.0, 2.0, 3.0), TransformSpace::World);
        scene.nodes_mut().rotate(h, Quat::from_rotation_y(0.5), TransformSpace::Local);
        let moved = scene.nodes().get(h).unwrap().clone();

        for _ in 0..3 {
            action.undo(&mut scene).unwrap();
            assert_eq!(scene.nodes().get(h).unwrap().translation, Vec3::ZERO);
            action.redo(&mut scene).unwrap();
            assert_eq!(scene.nodes().get(h).unwrap().translation, moved.translation);
            assert_eq!(scene.nodes().get(h).unwrap().orientation, moved.orientation);
        }
    }

    #[test]
    fn test_capture_missing_entity() {
        let scene = EditorScene::new();
        assert!(TransformAction::capture(EntityId(1), &scene).is_err());
    }
}
