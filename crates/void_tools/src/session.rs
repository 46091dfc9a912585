//! Editor session - owns everything the tool modes operate on.
//!
//! The host feeds one [`EditorSession::update`] per frame and any number of
//! [`EditorSession::signal`] calls, all from the same thread.

use std::path::Path;

use crate::actions::{ActionManager, ActionResult};
use crate::context::ToolContext;
use crate::core::{Axis, ConfigError, Modifiers, SignalId, SignalRegistry, ToolSettings};
use crate::scene::EditorScene;
use crate::tools::{ModId, ModManager};
use crate::viewport::{Viewport, ViewportState};

/// Central editor session.
pub struct EditorSession<V: Viewport = ViewportState> {
    // Scene data
    pub scene: EditorScene,

    // Active viewport, if any
    pub viewport: Option<V>,

    // Input sampled by the host before dispatching
    pub modifiers: Modifiers,
    pub axis: Option<Axis>,

    actions: ActionManager,
    signals: SignalRegistry,
    settings: ToolSettings,
    mods: ModManager,
}

impl<V: Viewport> Default for EditorSession<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Viewport> EditorSession<V> {
    pub fn new() -> Self {
        Self::with_settings(ToolSettings::default())
    }

    pub fn with_settings(settings: ToolSettings) -> Self {
        Self::with_mod_manager(settings, ModManager::new())
    }

    pub fn with_mod_manager(settings: ToolSettings, mods: ModManager) -> Self {
        Self {
            scene: EditorScene::new(),
            viewport: None,
            modifiers: Modifiers::NONE,
            axis: None,
            actions: ActionManager::with_capacity(settings.undo_capacity),
            signals: SignalRegistry::new(),
            settings,
            mods,
        }
    }

    /// Load settings from a TOML file.
    pub fn from_settings_file(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::with_settings(ToolSettings::load(path)?))
    }

    pub fn actions(&self) -> &ActionManager {
        &self.actions
    }

    pub fn signals(&self) -> &SignalRegistry {
        &self.signals
    }

    /// Register a host signal.
    pub fn register_signal(&mut self, name: impl Into<String>) -> SignalId {
        self.signals.register(name)
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn mods(&self) -> &ModManager {
        &self.mods
    }

    pub fn set_viewport(&mut self, viewport: V) {
        self.viewport = Some(viewport);
    }

    /// Switch the active tool mode.
    pub fn set_mod(&mut self, id: ModId) {
        let viewport = self.viewport.as_mut().map(|v| v as &mut dyn Viewport);
        self.mods.set_mod(true, id, &self.signals, viewport);
    }

    /// Tick the active tool mode.
    pub fn update(&mut self, dt: f32) {
        let (mods, mut ctx) = self.split();
        mods.update(dt, &mut ctx);
    }

    /// Deliver a signal to the active tool mode.
    pub fn signal(&mut self, signal: SignalId) {
        let (mods, mut ctx) = self.split();
        mods.dispatch_signal(signal, &mut ctx);
    }

    pub fn undo(&mut self) -> ActionResult {
        self.actions.undo(&mut self.scene)
    }

    pub fn redo(&mut self) -> ActionResult {
        self.actions.redo(&mut self.scene)
    }

    fn split(&mut self) -> (&mut ModManager, ToolContext<'_>) {
        let ctx = ToolContext {
            scene: &mut self.scene,
            actions: &mut self.actions,
            viewport: self.viewport.as_mut().map(|v| v as &mut dyn Viewport),
            signals: &self.signals,
            settings: &self.settings,
            modifiers: self.modifiers,
            axis: self.axis,
        };
        (&mut self.mods, ctx)
    }
}
