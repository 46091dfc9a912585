//! Editor scene the tool states query and mutate.
//!
//! Entities are thin records on top of a [`void_transform::NodeTree`]: the
//! entity hierarchy is the node hierarchy.

mod editor_scene;

pub use editor_scene::{EditorScene, EntityKind, EntitySnapshot, PickData, SceneEntity, PICK_MISS_DISTANCE};
