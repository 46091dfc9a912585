//! Viewport collaborator interface.
//!
//! States only see a viewport through [`Viewport`]: mouse position, pick
//! rays, screen to world conversion and a per-frame list of overlay draw
//! commands. Draw commands are plain data, so a tool mode switch only has
//! to clear the list.

mod viewport_state;

pub use viewport_state::ViewportState;

use glam::{Vec2, Vec3};
use void_transform::Ray;

/// Which kind of content a viewport edits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewportKind {
    /// Scene viewport; surface (UI) entities are not pickable
    #[default]
    Scene3d,
    /// Canvas viewport; only surface entities are pickable
    Canvas2d,
}

/// Camera data needed to build pick volumes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraInfo {
    pub position: Vec3,
    /// Unit view direction
    pub direction: Vec3,
    pub orthographic: bool,
}

/// Deferred overlay drawing for the current frame.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Box-pick rectangle in screen space
    SelectionRect { min: Vec2, max: Vec2 },
}

/// View into the scene the tools interact through.
pub trait Viewport {
    fn kind(&self) -> ViewportKind;

    /// Last known mouse position in screen space.
    fn last_mouse_pos_screen_space(&self) -> Vec2;

    /// Ray from the camera through the last mouse position.
    fn ray_from_mouse_position(&self) -> Ray;

    /// Screen coordinates to viewport coordinates (origin bottom-left).
    fn screen_to_viewport_space(&self, point: Vec2) -> Vec2;

    /// Viewport coordinates to a world point on the camera's near plane.
    fn viewport_to_world_space(&self, point: Vec2) -> Vec3;

    /// Whether the camera is being navigated this frame.
    fn is_moving(&self) -> bool;

    fn camera(&self) -> CameraInfo;

    fn push_draw_command(&mut self, command: DrawCommand);

    fn draw_commands(&self) -> &[DrawCommand];

    fn clear_draw_commands(&mut self);
}
