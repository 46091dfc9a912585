//! Undoable edit records.
//!
//! Tool states mutate the scene directly and record an [`Action`] that can
//! reverse the edit. Consecutive actions are batched into one undo step
//! with [`ActionManager::begin_action_group`] and
//! [`ActionManager::group_last_actions`].

mod action;
mod entity_actions;
mod manager;
mod transform_actions;

pub use action::{Action, ActionError, ActionResult};
pub use entity_actions::{CreateAction, DeleteAction};
pub use manager::{ActionGroup, ActionManager};
pub use transform_actions::TransformAction;
