//! Per-dispatch context handed to tool modes and their states.

use crate::actions::ActionManager;
use crate::core::{Axis, Modifiers, SignalRegistry, ToolSettings};
use crate::scene::EditorScene;
use crate::viewport::Viewport;

/// Everything a state may read or mutate while handling a tick or signal.
pub struct ToolContext<'a> {
    pub scene: &'a mut EditorScene,
    pub actions: &'a mut ActionManager,
    /// Active viewport, if any
    pub viewport: Option<&'a mut dyn Viewport>,
    pub signals: &'a SignalRegistry,
    pub settings: &'a ToolSettings,
    /// Modifier keys at dispatch time
    pub modifiers: Modifiers,
    /// Axis lock for the transform tools
    pub axis: Option<Axis>,
}

impl<'a> ToolContext<'a> {
    pub fn new(
        scene: &'a mut EditorScene,
        actions: &'a mut ActionManager,
        signals: &'a SignalRegistry,
        settings: &'a ToolSettings,
    ) -> Self {
        Self {
            scene,
            actions,
            viewport: None,
            signals,
            settings,
            modifiers: Modifiers::NONE,
            axis: None,
        }
    }

    pub fn with_viewport(mut self, viewport: &'a mut dyn Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}
