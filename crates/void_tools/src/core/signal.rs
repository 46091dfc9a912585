//! Signal identifiers.
//!
//! A [`SignalRegistry`] is built once by the host and handed to every
//! state through the tool context. Built-in editor signals are registered
//! first, with ids counting up from 101.

use std::collections::HashMap;
use std::fmt;

/// Identifier of a discrete input signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId(pub u32);

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signal({})", self.0)
    }
}

/// Ids of the signals every tool mode understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditorSignals {
    pub left_mouse_down: SignalId,
    pub left_mouse_up: SignalId,
    pub left_mouse_drag: SignalId,
    pub mouse_move: SignalId,
    pub back_to_start: SignalId,
    pub delete: SignalId,
    pub duplicate: SignalId,
}

/// Registry of signal names.
#[derive(Clone, Debug)]
pub struct SignalRegistry {
    editor: EditorSignals,
    names: HashMap<SignalId, String>,
    next: u32,
}

impl Default for SignalRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalRegistry {
    /// First id handed out.
    pub const FIRST_ID: u32 = 101;

    /// Create a registry holding the built-in editor signals.
    pub fn new() -> Self {
        let mut registry = Self {
            editor: EditorSignals {
                left_mouse_down: SignalId(0),
                left_mouse_up: SignalId(0),
                left_mouse_drag: SignalId(0),
                mouse_move: SignalId(0),
                back_to_start: SignalId(0),
                delete: SignalId(0),
                duplicate: SignalId(0),
            },
            names: HashMap::new(),
            next: Self::FIRST_ID,
        };

        registry.editor = EditorSignals {
            left_mouse_down: registry.register("LeftMouseDown"),
            left_mouse_up: registry.register("LeftMouseUp"),
            left_mouse_drag: registry.register("LeftMouseDrag"),
            mouse_move: registry.register("MouseMove"),
            back_to_start: registry.register("BackToStart"),
            delete: registry.register("Delete"),
            duplicate: registry.register("Duplicate"),
        };
        registry
    }

    /// Register a host signal and return its id.
    pub fn register(&mut self, name: impl Into<String>) -> SignalId {
        let id = SignalId(self.next);
        self.next += 1;
        self.names.insert(id, name.into());
        id
    }

    /// Built-in editor signals.
    #[inline]
    pub fn editor(&self) -> &EditorSignals {
        &self.editor
    }

    pub fn name(&self, id: SignalId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids_start_at_101() {
        let registry = SignalRegistry::new();
        let editor = registry.editor();

        assert_eq!(editor.left_mouse_down, SignalId(101));
        assert_eq!(editor.duplicate, SignalId(107));
        assert_eq!(registry.name(editor.back_to_start), Some("BackToStart"));
        assert_eq!(registry.len(), 7);
    }

    #[test]
    fn test_register_host_signal() {
        let mut registry = SignalRegistry::new();
        let focus = registry.register("Focus");

        assert_eq!(focus, SignalId(108));
        assert_eq!(registry.name(focus), Some("Focus"));
        assert_eq!(registry.name(SignalId(5)), None);
    }
}
