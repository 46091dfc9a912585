//! Selection bookkeeping for the editor scene.
//!
//! Picks either replace the selection or toggle entities in and out of it
//! (additive modifier). The last entity added is the primary selection.

use super::EntityId;

/// How a pick merges into the current selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Replace current selection
    #[default]
    Replace,
    /// Add to current selection
    Add,
    /// Remove from current selection
    Remove,
    /// Flip selection state
    Toggle,
}

impl SelectionMode {
    /// Mode used when applying pick results.
    pub fn from_additive(additive: bool) -> Self {
        if additive {
            Self::Toggle
        } else {
            Self::Replace
        }
    }
}

/// Ordered set of selected entities.
#[derive(Clone, Debug, Default)]
pub struct SelectionManager {
    /// Currently selected entities (in selection order)
    selected: Vec<EntityId>,
    /// Last selected entity
    primary: Option<EntityId>,
    /// Whether selection changed since the flag was last taken
    dirty: bool,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primary(&self) -> Option<EntityId> {
        self.primary
    }

    pub fn selected(&self) -> &[EntityId] {
        &self.selected
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_selected(&self, id: EntityId) -> bool {
        self.selected.contains(&id)
    }

    /// Check and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn select(&mut self, id: EntityId, mode: SelectionMode) {
        match mode {
            SelectionMode::Replace => {
                self.selected.clear();
                self.selected.push(id);
                self.primary = Some(id);
            }
            SelectionMode::Add => {
                if !self.selected.contains(&id) {
                    self.selected.push(id);
                }
                self.primary = Some(id);
            }
            SelectionMode::Remove => self.deselect(id),
            SelectionMode::Toggle => {
                if self.selected.contains(&id) {
                    self.deselect(id);
                } else {
                    self.selected.push(id);
                    self.primary = Some(id);
                }
            }
        }
        self.dirty = true;
    }

    /// Apply a batch of picks. `Replace` clears first, then adds every id.
    pub fn apply(&mut self, ids: impl IntoIterator<Item = EntityId>, mode: SelectionMode) {
        let per_id = match mode {
            SelectionMode::Replace => {
                self.clear();
                SelectionMode::Add
            }
            other => other,
        };
        for id in ids {
            self.select(id, per_id);
        }
    }

    pub fn clear(&mut self) {
        if !self.selected.is_empty() {
            self.selected.clear();
            self.primary = None;
            self.dirty = true;
        }
    }

    /// Drop an entity that left the scene.
    pub fn remove_entity(&mut self, id: EntityId) {
        if self.selected.contains(&id) {
            self.deselect(id);
            self.dirty = true;
        }
    }

    fn deselect(&mut self, id: EntityId) {
        self.selected.retain(|&e| e != id);
        if self.primary == Some(id) {
            self.primary = self.selected.last().copied();
        }
    }
}
