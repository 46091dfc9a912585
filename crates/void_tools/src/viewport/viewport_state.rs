//! Concrete viewport backed by a simple camera.

use glam::{Quat, Vec2, Vec3};
use void_transform::Ray;

use super::{CameraInfo, DrawCommand, Viewport, ViewportKind};

/// Viewport rendering state.
#[derive(Clone, Debug)]
pub struct ViewportState {
    pub kind: ViewportKind,

    // Camera
    pub camera_pos: Vec3,
    pub camera_orientation: Quat,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub near: f32,
    pub orthographic: bool,
    /// Visible world height of an orthographic camera
    pub ortho_height: f32,

    // Placement on screen (top-left corner)
    pub origin: Vec2,
    pub width: u32,
    pub height: u32,

    // Mouse state
    pub mouse_pos: Vec2,
    pub camera_moving: bool,

    draw_commands: Vec<DrawCommand>,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            kind: ViewportKind::Scene3d,
            camera_pos: Vec3::new(0.0, 0.0, 10.0),
            camera_orientation: Quat::IDENTITY,
            fov_y: std::f32::consts::FRAC_PI_2,
            near: 1.0,
            orthographic: false,
            ortho_height: 10.0,
            origin: Vec2::ZERO,
            width: 1280,
            height: 720,
            mouse_pos: Vec2::ZERO,
            camera_moving: false,
            draw_commands: Vec::new(),
        }
    }
}

impl ViewportState {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Get the aspect ratio.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0 {
            self.width as f32 / self.height as f32
        } else {
            1.0
        }
    }

    /// Update viewport size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Record a mouse move reported by the host.
    pub fn set_mouse_pos(&mut self, pos: Vec2) {
        self.mouse_pos = pos;
    }

    /// Point the camera from `eye` toward `target`.
    pub fn look_at(&mut self, eye: Vec3, target: Vec3) {
        self.camera_pos = eye;
        let forward = (target - eye).normalize_or_zero();
        if forward != Vec3::ZERO {
            self.camera_orientation = Quat::from_rotation_arc(Vec3::NEG_Z, forward);
        }
    }

    fn half_extents(&self) -> Vec2 {
        let half_h = if self.orthographic {
            self.ortho_height * 0.5
        } else {
            self.near * (self.fov_y * 0.5).tan()
        };
        Vec2::new(half_h * self.aspect_ratio(), half_h)
    }
}

impl Viewport for ViewportState {
    fn kind(&self) -> ViewportKind {
        self.kind
    }

    fn last_mouse_pos_screen_space(&self) -> Vec2 {
        self.mouse_pos
    }

    fn ray_from_mouse_position(&self) -> Ray {
        let p = self.viewport_to_world_space(self.screen_to_viewport_space(self.mouse_pos));
        if self.orthographic {
            Ray::new(p, self.camera().direction)
        } else {
            Ray::new(self.camera_pos, p - self.camera_pos)
        }
    }

    fn screen_to_viewport_space(&self, point: Vec2) -> Vec2 {
        let local = point - self.origin;
        Vec2::new(local.x, self.height as f32 - local.y)
    }

    fn viewport_to_world_space(&self, point: Vec2) -> Vec3 {
        let size = Vec2::new(self.width.max(1) as f32, self.height.max(1) as f32);
        let ndc = point / size * 2.0 - Vec2::ONE;
        let half = self.half_extents();
        let local = Vec3::new(ndc.x * half.x, ndc.y * half.y, -self.near);
        self.camera_pos + self.camera_orientation * local
    }

    fn is_moving(&self) -> bool {
        self.camera_moving
    }

    fn camera(&self) -> CameraInfo {
        CameraInfo {
            position: self.camera_pos,
            direction: self.camera_orientation * Vec3::NEG_Z,
            orthographic: self.orthographic,
        }
    }

    fn push_draw_command(&mut self, command: DrawCommand) {
        self.draw_commands.push(command);
    }

    fn draw_commands(&self) -> &[DrawCommand] {
        &self.draw_commands
    }

    fn clear_draw_commands(&mut self) {
        self.draw_commands.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> ViewportState {
        ViewportState::new(100, 100)
    }

    #[test]
    fn test_center_ray_looks_down_view_axis() {
        let mut vp = square();
        vp.set_mouse_pos(Vec2::new(50.0, 50.0));
        let ray = vp.ray_from_mouse_position();

        assert!(ray.origin.abs_diff_eq(Vec3::new(0.0, 0.0, 10.0), 1e-5));
        assert!(ray.direction.abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn test_screen_y_is_flipped() {
        let mut vp = square();
        vp.origin = Vec2::new(20.0, 30.0);
        let p = vp.screen_to_viewport_space(Vec2::new(20.0, 30.0));
        assert_eq!(p, Vec2::new(0.0, 100.0));
    }

    #[test]
    fn test_top_left_maps_to_upper_left_of_near_plane() {
        let vp = square();
        let world = vp.viewport_to_world_space(Vec2::new(0.0, 100.0));
        // 90 degree fov and near 1 give a 2x2 near rectangle.
        assert!(world.abs_diff_eq(Vec3::new(-1.0, 1.0, 9.0), 1e-5));
    }

    #[test]
    fn test_orthographic_rays_are_parallel() {
        let mut vp = square();
        vp.orthographic = true;
        vp.set_mouse_pos(Vec2::new(0.0, 0.0));
        let a = vp.ray_from_mouse_position();
        vp.set_mouse_pos(Vec2::new(100.0, 100.0));
        let b = vp.ray_from_mouse_position();

        assert!(a.direction.abs_diff_eq(b.direction, 1e-6));
        assert!(!a.origin.abs_diff_eq(b.origin, 1e-3));
    }

    #[test]
    fn test_look_at() {
        let mut vp = square();
        vp.look_at(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO);
        assert!(vp.camera().direction.abs_diff_eq(Vec3::NEG_Y, 1e-5));
    }
}
