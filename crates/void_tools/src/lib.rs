//! Void Engine Editor Tools
//!
//! Signal-driven tool modes for the Void Engine scene editor.
//!
//! ## Features
//!
//! - **State Machines**: Tagged states with ordered enter/exit hooks and link tables
//! - **Tool Modes**: Select, Cursor, Move, Rotate, Scale and Anchor on a mode stack
//! - **Picking**: Click and box selection with per-viewport ignore lists
//! - **Undo/Redo**: Snapshot actions batched into atomic groups
//! - **Duplicate/Delete**: Hierarchy-aware copies and deletes as one undo step
//! - **TOML Settings**: Persisted tool configuration
//!
//! ## Architecture
//!
//! Input flows one way:
//!
//! ```text
//! Host Input → Signal → ModManager → Mod → StateMachine → State → Action
//! ```
//!
//! States report [`ToolEvent`]s back to their mode instead of being
//! re-queried, and every scene edit is recorded in the [`ActionManager`].

pub mod actions;
pub mod context;
pub mod core;
pub mod scene;
pub mod session;
pub mod state;
pub mod states;
pub mod tools;
pub mod viewport;

// Re-export commonly used types
pub use crate::core::{
    Axis,
    ConfigError,
    EditorSignals,
    EntityId,
    Modifiers,
    SelectionManager,
    SelectionMode,
    SignalId,
    SignalRegistry,
    ToolSettings,
};

pub use actions::{
    Action,
    ActionError,
    ActionGroup,
    ActionManager,
    ActionResult,
    CreateAction,
    DeleteAction,
    TransformAction,
};

pub use context::ToolContext;

pub use scene::{EditorScene, EntityKind, EntitySnapshot, PickData, SceneEntity};

pub use state::{State, StateBase, StateMachine, StateReply, StateTag, ToolEvent};

pub use states::TransformKind;

pub use tools::{create_mod, Mod, ModFactory, ModId, ModManager};

pub use viewport::{CameraInfo, DrawCommand, Viewport, ViewportKind, ViewportState};

pub use session::EditorSession;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = "Void Engine Editor Tools";
