//! Entity creation and deletion actions.

use super::{Action, ActionError, ActionResult};
use crate::core::EntityId;
use crate::scene::{EditorScene, EntitySnapshot};

/// Records an entity that was added to the scene.
pub struct CreateAction {
    pub entity: EntityId,
    // Filled on undo
    removed: Vec<EntitySnapshot>,
}

impl CreateAction {
    pub fn new(entity: EntityId) -> Self {
        Self {
            entity,
            removed: Vec::new(),
        }
    }
}

impl Action for CreateAction {
    fn description(&self) -> &str {
        "Create Entity"
    }

    fn undo(&mut self, scene: &mut EditorScene) -> ActionResult {
        self.removed = scene.remove_entity(self.entity);
        if self.removed.is_empty() {
            return Err(ActionError::EntityNotFound(self.entity));
        }
        Ok(())
    }

    fn redo(&mut self, scene: &mut EditorScene) -> ActionResult {
        if self.removed.is_empty() {
            return Err(ActionError::NothingToRestore);
        }
        scene.restore(&self.removed)?;
        self.removed.clear();
        Ok(())
    }
}

/// Removes an entity, keeping its parent link, child index and children
/// so undo puts the hierarchy back together.
pub struct DeleteAction {
    pub entity: EntityId,
    // Stored for undo
    removed: Vec<EntitySnapshot>,
}

impl DeleteAction {
    /// Delete `entity` now and return the action recording it.
    pub fn apply(entity: EntityId, scene: &mut EditorScene) -> Result<Self, ActionError> {
        let removed = scene.remove_entity(entity);
        if removed.is_empty() {
            return Err(ActionError::EntityNotFound(entity));
        }
        Ok(Self { entity, removed })
    }
}

impl Action for DeleteAction {
    fn description(&self) -> &str {
        "Delete Entity"
    }

    fn undo(&mut self, scene: &mut EditorScene) -> ActionResult {
        if self.removed.is_empty() {
            return Err(ActionError::NothingToRestore);
        }
        scene.restore(&self.removed)?;
        self.removed.clear();
        Ok(())
    }

    fn redo(&mut self, scene: &mut EditorScene) -> ActionResult {
        self.removed = scene.remove_entity(self.entity);
        if self.removed.is_empty() {
            return Err(ActionError::EntityNotFound(self.entity));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::EntityKind;

    #[test]
    fn test_delete_undo_redo() {
        let mut scene = EditorScene::new();
        let a = scene.add_entity("a", EntityKind::Node);

        let mut action = DeleteAction::apply(a, &mut scene).unwrap();
        assert!(!scene.contains(a));

        action.undo(&mut scene).unwrap();
        assert!(scene.contains(a));
        assert_eq!(action.undo(&mut scene), Err(ActionError::NothingToRestore));

        action.redo(&mut scene).unwrap();
        assert!(!scene.contains(a));
    }

    #[test]
    fn test_delete_missing_entity() {
        let mut scene = EditorScene::new();
        assert!(matches!(
            DeleteAction::apply(EntityId(7), &mut scene),
            Err(ActionError::EntityNotFound(EntityId(7)))
        ));
    }

    #[test]
    fn test_create_undo_redo() {
        let mut scene = EditorScene::new();
        let a = scene.add_entity("a", EntityKind::Node);
        let mut action = CreateAction::new(a);

        assert_eq!(action.redo(&mut scene), Err(ActionError::NothingToRestore));
        action.undo(&mut scene).unwrap();
        assert!(!scene.contains(a));
        action.redo(&mut scene).unwrap();
        assert_eq!(scene.get_entity(a).map(|e| e.name.as_str()), Some("a"));
    }
}
