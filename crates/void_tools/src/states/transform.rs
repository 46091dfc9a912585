//! Drag gesture states for the transform and anchor modes.
//!
//! ```text
//! Begin --drag--> To --up--> End --back--> Begin
//!   \--duplicate--> Duplicate --back--> Begin
//! ```
//!
//! Begin fixes a constraint plane through the pivot and the grab point on
//! it. To applies one delta per frame to every target and accumulates it.
//! The transform actions captured when To is entered become one undo group
//! when End is entered.

use glam::{Quat, Vec2, Vec3};
use void_transform::{decompose, Plane, TransformSpace, EPSILON};

use crate::actions::TransformAction;
use crate::context::ToolContext;
use crate::core::{Axis, EntityId, SignalId, ToolSettings};
use crate::scene::{EditorScene, EntityKind};
use crate::state::{State, StateBase, StateReply, StateTag, ToolEvent};

/// What a drag does to its targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TransformKind {
    #[default]
    Move,
    Rotate,
    Scale,
    /// Move surface entities inside the canvas plane, in parent space
    Anchor,
}

impl TransformKind {
    pub fn name(&self) -> &'static str {
        match self {
            TransformKind::Move => "Move",
            TransformKind::Rotate => "Rotate",
            TransformKind::Scale => "Scale",
            TransformKind::Anchor => "Anchor",
        }
    }

    /// Begin, To and End tags.
    pub fn tags(&self) -> [StateTag; 3] {
        match self {
            TransformKind::Anchor => [StateTag::ANCHOR_BEGIN, StateTag::ANCHOR_TO, StateTag::ANCHOR_END],
            _ => [
                StateTag::TRANSFORM_BEGIN,
                StateTag::TRANSFORM_TO,
                StateTag::TRANSFORM_END,
            ],
        }
    }

    /// Space the drag works in.
    pub fn space(&self, settings: &ToolSettings) -> TransformSpace {
        match self {
            TransformKind::Anchor => TransformSpace::Parent,
            _ => settings.transform_space,
        }
    }
}

/// Scratch data carried through one drag.
#[derive(Clone, Debug, Default)]
pub struct TransformScratch {
    pub kind: TransformKind,
    /// Press point and latest drag point, in screen space
    pub mouse_data: [Vec2; 2],
    /// Plane mouse rays are projected onto
    pub plane: Plane,
    /// World position rotations and scales are measured from
    pub pivot: Vec3,
    /// Last projected mouse point
    pub grab_point: Option<Vec3>,
    pub targets: Vec<EntityId>,
    /// Last frame's delta
    pub delta: Vec3,
    /// Sum of per-frame deltas: translation for moves, axis times angle for
    /// rotations, factor minus one for scales
    pub delta_accum: Vec3,
    /// Actions recorded when the drag started
    pub captured: usize,
}

impl TransformScratch {
    pub fn new(kind: TransformKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    fn reset_gesture(&mut self) {
        *self = Self::new(self.kind);
    }
}

/// Root entities of the selection the drag applies to.
fn gesture_targets(scene: &EditorScene, kind: TransformKind) -> Vec<EntityId> {
    let roots = scene.root_entities(&scene.selected_entities());
    match kind {
        TransformKind::Anchor => roots
            .into_iter()
            .filter(|&id| scene.get_entity(id).is_some_and(|e| e.kind == EntityKind::Surface))
            .collect(),
        _ => roots,
    }
}

/// World direction of `axis` in the frame `space` defines for `entity`.
pub fn axis_in_space(scene: &EditorScene, entity: EntityId, axis: Axis, space: TransformSpace) -> Vec3 {
    let Some(node) = scene.node_of(entity) else {
        return axis.unit();
    };
    let orientation = match space {
        TransformSpace::World => Quat::IDENTITY,
        TransformSpace::Parent => decompose(&scene.nodes().parent_transform(node)).orientation,
        TransformSpace::Local => scene.nodes().get_orientation(node, TransformSpace::World),
    };
    (orientation * axis.unit()).normalize_or_zero()
}

/// Plane through `pivot` the drag is projected onto.
pub fn constraint_plane(kind: TransformKind, pivot: Vec3, view_dir: Vec3, axis: Option<Vec3>) -> Plane {
    let normal = match (kind, axis) {
        (TransformKind::Anchor, _) => Vec3::Z,
        (TransformKind::Rotate, Some(axis)) => axis,
        (_, Some(axis)) => {
            // Contains the axis and faces the camera as much as possible.
            let n = axis.cross(view_dir).cross(axis);
            if n.length_squared() > EPSILON {
                n
            } else {
                -view_dir
            }
        }
        (_, None) => -view_dir,
    };
    Plane::from_point_normal(pivot, normal)
}

fn hand_over(data: &TransformScratch, next: &mut dyn State<TransformScratch>) {
    next.base_mut().data = data.clone();
}

fn base_with(kind: TransformKind) -> StateBase<TransformScratch> {
    let mut base: StateBase<TransformScratch> = StateBase::new();
    base.data.kind = kind;
    base
}

// ============================================================================
// Begin
// ============================================================================

/// Waits for a press on the selection and a drag.
pub struct TransformBegin {
    base: StateBase<TransformScratch>,
}

impl TransformBegin {
    pub fn new(kind: TransformKind) -> Self {
        Self { base: base_with(kind) }
    }
}

impl State<TransformScratch> for TransformBegin {
    fn tag(&self) -> StateTag {
        self.base.data.kind.tags()[0]
    }

    fn base(&self) -> &StateBase<TransformScratch> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut StateBase<TransformScratch> {
        &mut self.base
    }

    fn transition_in(&mut self, _prev: Option<StateTag>, _ctx: &mut ToolContext<'_>) {
        self.base.data.reset_gesture();
    }

    fn transition_out(&mut self, next: &mut dyn State<TransformScratch>, _ctx: &mut ToolContext<'_>) {
        hand_over(&self.base.data, next);
    }

    fn signaled(&mut self, signal: SignalId, ctx: &mut ToolContext<'_>) -> StateReply {
        let sig = ctx.signals.editor();
        let data = &mut self.base.data;

        if signal == sig.left_mouse_down {
            let Some(vp) = ctx.viewport.as_deref() else {
                return StateReply::None;
            };

            let targets = gesture_targets(ctx.scene, data.kind);
            let primary = match ctx.scene.selection().primary() {
                Some(p) if targets.contains(&p) => p,
                _ => match targets.first() {
                    Some(&first) => first,
                    None => return StateReply::None,
                },
            };

            let space = data.kind.space(ctx.settings);
            let axis = ctx.axis.map(|a| axis_in_space(ctx.scene, primary, a, space));

            data.mouse_data[0] = vp.last_mouse_pos_screen_space();
            data.pivot = ctx.scene.world_position(primary);
            data.plane = constraint_plane(data.kind, data.pivot, vp.camera().direction, axis);

            let ray = vp.ray_from_mouse_position();
            data.grab_point = ray.intersect_plane(&data.plane).map(|t| ray.at(t));
            data.targets = targets;
            return StateReply::None;
        }

        if signal == sig.left_mouse_drag && data.grab_point.is_some() {
            return StateReply::Transition(data.kind.tags()[1]);
        }

        StateReply::None
    }
}

// ============================================================================
// To
// ============================================================================

/// Applies the drag to the targets every frame.
pub struct TransformTo {
    base: StateBase<TransformScratch>,
}

impl TransformTo {
    pub fn new(kind: TransformKind) -> Self {
        Self { base: base_with(kind) }
    }

    fn apply_translation(ctx: &mut ToolContext<'_>, targets: &[EntityId], delta: Vec3, kind: TransformKind) {
        for &target in targets {
            let Some(node) = ctx.scene.node_of(target) else {
                continue;
            };
            let nodes = ctx.scene.nodes_mut();
            if kind == TransformKind::Anchor {
                let parent = nodes.parent_transform(node);
                if parent.determinant().abs() < EPSILON {
                    log::warn!("Cannot anchor {} under a singular parent", target);
                    continue;
                }
                let local = parent.inverse().transform_vector3(delta);
                nodes.translate(node, local, TransformSpace::Parent);
            } else {
                nodes.translate(node, delta, TransformSpace::World);
            }
        }
    }
}

impl State<TransformScratch> for TransformTo {
    fn tag(&self) -> StateTag {
        self.base.data.kind.tags()[1]
    }

    fn base(&self) -> &StateBase<TransformScratch> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut StateBase<TransformScratch> {
        &mut self.base
    }

    fn transition_in(&mut self, _prev: Option<StateTag>, ctx: &mut ToolContext<'_>) {
        let data = &mut self.base.data;
        data.delta = Vec3::ZERO;
        data.delta_accum = Vec3::ZERO;
        data.captured = 0;

        ctx.actions.begin_action_group();
        for &target in &data.targets {
            match TransformAction::capture(target, ctx.scene) {
                Ok(action) => {
                    ctx.actions.add_action(Box::new(action));
                    data.captured += 1;
                }
                Err(e) => log::warn!("Not transforming {}: {}", target, e),
            }
        }
    }

    fn transition_out(&mut self, next: &mut dyn State<TransformScratch>, _ctx: &mut ToolContext<'_>) {
        hand_over(&self.base.data, next);
    }

    fn update(&mut self, _dt: f32, ctx: &mut ToolContext<'_>) -> StateReply {
        let data = &mut self.base.data;
        let Some(vp) = ctx.viewport.as_deref() else {
            return StateReply::None;
        };
        let Some(grab) = data.grab_point else {
            return StateReply::None;
        };

        data.mouse_data[1] = vp.last_mouse_pos_screen_space();
        let ray = vp.ray_from_mouse_position();
        let Some(t) = ray.intersect_plane(&data.plane) else {
            return StateReply::None;
        };
        let point = ray.at(t);

        let space = data.kind.space(ctx.settings);
        let axis = match (ctx.axis, data.targets.first()) {
            (Some(a), Some(&first)) => Some(axis_in_space(ctx.scene, first, a, space)),
            _ => None,
        };

        let delta = match data.kind {
            TransformKind::Move | TransformKind::Anchor => {
                let mut delta = point - grab;
                if let Some(axis) = axis {
                    delta = axis * delta.dot(axis);
                }
                Self::apply_translation(ctx, &data.targets, delta, data.kind);
                delta
            }
            TransformKind::Rotate => {
                let normal = data.plane.normal;
                let from = (grab - data.pivot).normalize_or_zero();
                let to = (point - data.pivot).normalize_or_zero();
                if from == Vec3::ZERO || to == Vec3::ZERO {
                    Vec3::ZERO
                } else {
                    let angle = from.cross(to).dot(normal).atan2(from.dot(to));
                    let rotation = Quat::from_axis_angle(normal, angle);
                    for &target in &data.targets {
                        if let Some(node) = ctx.scene.node_of(target) {
                            ctx.scene.nodes_mut().rotate(node, rotation, TransformSpace::World);
                        }
                    }
                    normal * angle
                }
            }
            TransformKind::Scale => {
                let from = (grab - data.pivot).length();
                let to = (point - data.pivot).length();
                if from < EPSILON {
                    Vec3::ZERO
                } else {
                    let ratio = to / from;
                    let factor = match ctx.axis {
                        Some(a) => Vec3::ONE + a.unit() * (ratio - 1.0),
                        None => Vec3::splat(ratio),
                    };
                    for &target in &data.targets {
                        if let Some(node) = ctx.scene.node_of(target) {
                            ctx.scene.nodes_mut().scale(node, factor, TransformSpace::Local);
                        }
                    }
                    factor - Vec3::ONE
                }
            }
        };

        data.delta = delta;
        data.delta_accum += delta;
        data.grab_point = Some(point);
        StateReply::None
    }

    fn signaled(&mut self, signal: SignalId, ctx: &mut ToolContext<'_>) -> StateReply {
        if signal == ctx.signals.editor().left_mouse_up {
            return StateReply::Transition(self.base.data.kind.tags()[2]);
        }
        StateReply::None
    }
}

// ============================================================================
// End
// ============================================================================

/// Commits the drag as one undo step.
pub struct TransformEnd {
    base: StateBase<TransformScratch>,
}

impl TransformEnd {
    pub fn new(kind: TransformKind) -> Self {
        Self { base: base_with(kind) }
    }
}

impl State<TransformScratch> for TransformEnd {
    fn tag(&self) -> StateTag {
        self.base.data.kind.tags()[2]
    }

    fn base(&self) -> &StateBase<TransformScratch> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut StateBase<TransformScratch> {
        &mut self.base
    }

    fn transition_in(&mut self, _prev: Option<StateTag>, ctx: &mut ToolContext<'_>) {
        let data = &self.base.data;
        ctx.actions.group_last_actions(data.captured);
        log::debug!(
            "{} of {} entities committed, total {}",
            data.kind.name(),
            data.captured,
            data.delta_accum
        );
    }

    fn transition_out(&mut self, next: &mut dyn State<TransformScratch>, _ctx: &mut ToolContext<'_>) {
        hand_over(&self.base.data, next);
    }

    fn update(&mut self, _dt: f32, _ctx: &mut ToolContext<'_>) -> StateReply {
        StateReply::Event(ToolEvent::TransformCommitted(self.base.data.captured))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use void_transform::Node;

    #[test]
    fn test_tags_by_kind() {
        assert_eq!(TransformKind::Scale.tags()[1], StateTag::TRANSFORM_TO);
        assert_eq!(TransformKind::Anchor.tags()[0], StateTag::ANCHOR_BEGIN);
        assert_eq!(TransformBegin::new(TransformKind::Anchor).tag(), StateTag::ANCHOR_BEGIN);
    }

    #[test]
    fn test_anchor_space_ignores_settings() {
        let settings = ToolSettings::default();
        assert_eq!(TransformKind::Anchor.space(&settings), TransformSpace::Parent);
        assert_eq!(TransformKind::Move.space(&settings), TransformSpace::World);
    }

    #[test]
    fn test_unlocked_plane_faces_camera() {
        let plane = constraint_plane(TransformKind::Move, Vec3::new(0.0, 0.0, 2.0), Vec3::NEG_Z, None);
        assert!(plane.normal.abs_diff_eq(Vec3::Z, 1e-6));
        assert!(plane.distance_to_point(Vec3::new(4.0, -3.0, 2.0)).abs() < 1e-6);
    }

    #[test]
    fn test_axis_plane_contains_axis() {
        let plane = constraint_plane(TransformKind::Move, Vec3::ZERO, Vec3::new(0.0, -1.0, -1.0).normalize(), Some(Vec3::X));
        assert!(plane.normal.dot(Vec3::X).abs() < 1e-6);

        let rotate = constraint_plane(TransformKind::Rotate, Vec3::ZERO, Vec3::NEG_Z, Some(Vec3::Y));
        assert!(rotate.normal.abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn test_axis_plane_along_view_falls_back() {
        let plane = constraint_plane(TransformKind::Move, Vec3::ZERO, Vec3::NEG_Z, Some(Vec3::Z));
        assert!(plane.normal.abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn test_axis_in_local_space_follows_orientation() {
        let mut scene = EditorScene::new();
        let turned = Node::new().with_orientation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
        let e = scene.add_entity_with_node("e", EntityKind::Node, turned);

        let local = axis_in_space(&scene, e, Axis::X, TransformSpace::Local);
        assert!(local.abs_diff_eq(Vec3::Y, 1e-5));
        assert_eq!(axis_in_space(&scene, e, Axis::X, TransformSpace::World), Vec3::X);
    }

    #[test]
    fn test_anchor_targets_only_surfaces() {
        let mut scene = EditorScene::new();
        let node = scene.add_entity("node", EntityKind::Node);
        let surface = scene.add_entity("surface", EntityKind::Surface);
        scene.add_to_selection(&[node, surface], false);

        assert_eq!(gesture_targets(&scene, TransformKind::Anchor), vec![surface]);
        assert_eq!(gesture_targets(&scene, TransformKind::Move), vec![node, surface]);
    }
}
