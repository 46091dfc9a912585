//! Action trait and result types.

use thiserror::Error;
use void_transform::HierarchyError;

use crate::core::EntityId;
use crate::scene::EditorScene;

/// Result type for undo and redo.
pub type ActionResult = Result<(), ActionError>;

/// Errors that can occur while undoing or redoing an action.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ActionError {
    /// Entity is not in the scene
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),
    /// Entity is already in the scene
    #[error("Entity already exists: {0}")]
    EntityExists(EntityId),
    /// The action holds no captured state to put back
    #[error("Nothing to restore")]
    NothingToRestore,
    /// Re-linking the hierarchy failed
    #[error("Hierarchy error: {0}")]
    Node(#[from] HierarchyError),
}

/// An edit that has already been applied and can be reversed.
///
/// Actions keep a reference (the entity id) to what they changed, never
/// ownership of it, plus whatever state is needed to go back and forth.
///
/// # Example
///
/// ```ignore
/// struct Rename {
///     entity: EntityId,
///     name: String,
/// }
///
/// impl Action for Rename {
///     fn description(&self) -> &str { "Rename" }
///
///     fn undo(&mut self, scene: &mut EditorScene) -> ActionResult {
///         let entity = scene.get_entity_mut(self.entity)
///             .ok_or(ActionError::EntityNotFound(self.entity))?;
///         std::mem::swap(&mut entity.name, &mut self.name);
///         Ok(())
///     }
///
///     fn redo(&mut self, scene: &mut EditorScene) -> ActionResult {
///         self.undo(scene)
///     }
/// }
/// ```
pub trait Action {
    /// Human-readable description for the undo/redo menu.
    fn description(&self) -> &str;

    /// Reverse the edit.
    fn undo(&mut self, scene: &mut EditorScene) -> ActionResult;

    /// Re-apply the edit.
    fn redo(&mut self, scene: &mut EditorScene) -> ActionResult;
}
