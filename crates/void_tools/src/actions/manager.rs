//! Undo/redo stacks with action grouping.
//!
//! Actions pushed between [`ActionManager::begin_action_group`] and
//! [`ActionManager::group_last_actions`] collapse into one [`ActionGroup`]
//! that is undone and redone as a single step.

use super::{Action, ActionResult};
use crate::scene::EditorScene;

/// Consecutive actions reversed and reapplied together.
pub struct ActionGroup {
    name: String,
    actions: Vec<Box<dyn Action>>,
}

impl ActionGroup {
    pub fn new(actions: Vec<Box<dyn Action>>) -> Self {
        let name = match actions.first() {
            Some(first) => format!("{} ({})", first.description(), actions.len()),
            None => "Empty Group".to_string(),
        };
        Self { name, actions }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Descriptions of the grouped actions, in recording order.
    pub fn descriptions(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.description()).collect()
    }
}

impl Action for ActionGroup {
    fn description(&self) -> &str {
        &self.name
    }

    /// Undo in reverse order. If one action fails, the ones already undone
    /// are redone so the scene is left as it was.
    fn undo(&mut self, scene: &mut EditorScene) -> ActionResult {
        for i in (0..self.actions.len()).rev() {
            if let Err(e) = self.actions[i].undo(scene) {
                for action in &mut self.actions[i + 1..] {
                    if let Err(rollback) = action.redo(scene) {
                        log::error!("Rollback of '{}' failed: {}", action.description(), rollback);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Redo in recording order, undoing the applied prefix on failure.
    fn redo(&mut self, scene: &mut EditorScene) -> ActionResult {
        for i in 0..self.actions.len() {
            if let Err(e) = self.actions[i].redo(scene) {
                for action in self.actions[..i].iter_mut().rev() {
                    if let Err(rollback) = action.undo(scene) {
                        log::error!("Rollback of '{}' failed: {}", action.description(), rollback);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Undo/redo history.
pub struct ActionManager {
    /// Actions that can be undone
    undo_stack: Vec<Box<dyn Action>>,
    /// Actions that can be redone
    redo_stack: Vec<Box<dyn Action>>,
    /// Maximum history size
    max_size: usize,
    /// Undo stack length when the open group began
    group_start: Option<usize>,
    /// Whether history has been modified since last save
    dirty: bool,
}

impl Default for ActionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionManager {
    /// Default maximum history size.
    pub const DEFAULT_MAX_SIZE: usize = 100;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_SIZE)
    }

    pub fn with_capacity(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
            group_start: None,
            dirty: false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|a| a.description())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|a| a.description())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark as saved (clears dirty flag).
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn in_group(&self) -> bool {
        self.group_start.is_some()
    }

    /// Start collecting actions for one undo step.
    pub fn begin_action_group(&mut self) {
        if self.group_start.is_some() {
            log::warn!("Beginning action group while one is already open");
        }
        self.group_start = Some(self.undo_stack.len());
    }

    /// Record an action that has already been applied.
    pub fn add_action(&mut self, action: Box<dyn Action>) {
        log::debug!("Action: {}", action.description());
        self.undo_stack.push(action);
        self.redo_stack.clear();
        self.dirty = true;
        self.trim();
    }

    /// Apply an action (via redo) and record it.
    pub fn execute(&mut self, mut action: Box<dyn Action>, scene: &mut EditorScene) -> ActionResult {
        action.redo(scene)?;
        self.add_action(action);
        Ok(())
    }

    /// Collapse the last `count` actions into a single undo step and close
    /// the open group. A count of zero only closes the group.
    pub fn group_last_actions(&mut self, count: usize) {
        let open = self.group_start.take();

        if count == 0 {
            return;
        }

        let available = self.undo_stack.len() - open.unwrap_or(0).min(self.undo_stack.len());
        let count = if count > available {
            log::warn!("Grouping {} actions but only {} were recorded", count, available);
            available
        } else {
            count
        };

        if count > 1 {
            let actions = self.undo_stack.split_off(self.undo_stack.len() - count);
            self.undo_stack.push(Box::new(ActionGroup::new(actions)));
        }
        self.trim();
    }

    /// Undo the last step. On failure the step stays on the undo stack.
    pub fn undo(&mut self, scene: &mut EditorScene) -> ActionResult {
        let Some(mut action) = self.undo_stack.pop() else {
            log::debug!("Nothing to undo");
            return Ok(());
        };

        match action.undo(scene) {
            Ok(()) => {
                log::info!("Undo: {}", action.description());
                self.redo_stack.push(action);
                self.dirty = true;
                Ok(())
            }
            Err(e) => {
                log::error!("Undo failed: {}", e);
                self.undo_stack.push(action);
                Err(e)
            }
        }
    }

    /// Redo the last undone step. On failure the step stays on the redo stack.
    pub fn redo(&mut self, scene: &mut EditorScene) -> ActionResult {
        let Some(mut action) = self.redo_stack.pop() else {
            log::debug!("Nothing to redo");
            return Ok(());
        };

        match action.redo(scene) {
            Ok(()) => {
                log::info!("Redo: {}", action.description());
                self.undo_stack.push(action);
                self.dirty = true;
                Ok(())
            }
            Err(e) => {
                log::error!("Redo failed: {}", e);
                self.redo_stack.push(action);
                Err(e)
            }
        }
    }

    /// Clear all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.group_start = None;
        self.dirty = false;
    }

    fn trim(&mut self) {
        // Never split an open group.
        if self.group_start.is_some() {
            return;
        }
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
    }
}
