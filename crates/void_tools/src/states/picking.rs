//! Picking states.
//!
//! ```text
//! BeginPick --drag--> BeginBoxPick --up--> EndPick --back--> BeginPick
//!     |  \----up-------------------------->/
//!     \--delete--> DeletePick --back--> BeginPick
//! ```

use glam::{Vec2, Vec3};
use void_transform::{Frustum, Ray};

use crate::actions::DeleteAction;
use crate::context::ToolContext;
use crate::core::{EntityId, SignalId};
use crate::scene::{EditorScene, EntityKind, PickData};
use crate::state::{State, StateBase, StateReply, StateTag, ToolEvent};
use crate::viewport::{DrawCommand, Viewport, ViewportKind};

/// Scratch data shared by the states of one pick gesture.
#[derive(Clone, Debug, Default)]
pub struct PickScratch {
    /// Entities the pick queries skip
    pub ignore_list: Vec<EntityId>,
    /// Press point and current drag point, in screen space
    pub mouse_data: [Vec2; 2],
    /// Accumulated results
    pub pick_data: Vec<PickData>,
}

impl PickScratch {
    /// Screen rectangle spanned by the two mouse points.
    pub fn mouse_rect(&self) -> (Vec2, Vec2) {
        let [a, b] = self.mouse_data;
        (a.min(b), a.max(b))
    }

    /// Ids of the picked entities. Misses are skipped.
    pub fn picked_entities(&self) -> Vec<EntityId> {
        self.pick_data.iter().filter_map(|p| p.entity).collect()
    }

    /// Hand the gesture data to `next`. Results are not carried back into
    /// [`BeginPick`], and this state's results are dropped either way.
    fn hand_over(&mut self, next: &mut dyn State<PickScratch>) {
        let into_begin = next.tag() == StateTag::BEGIN_PICK;
        let data = &mut next.base_mut().data;
        data.ignore_list = self.ignore_list.clone();
        data.mouse_data = self.mouse_data;
        if !into_begin {
            data.pick_data = self.pick_data.clone();
        }
        self.pick_data.clear();
    }
}

macro_rules! pick_state_base {
    ($tag:expr) => {
        fn tag(&self) -> StateTag {
            $tag
        }

        fn base(&self) -> &StateBase<PickScratch> {
            &self.base
        }

        fn base_mut(&mut self) -> &mut StateBase<PickScratch> {
            &mut self.base
        }

        fn transition_out(&mut self, next: &mut dyn State<PickScratch>, _ctx: &mut ToolContext<'_>) {
            self.base.data.hand_over(next);
        }
    };
}

// ============================================================================
// BeginPick
// ============================================================================

/// Waits for a click, a drag or a delete request.
#[derive(Default)]
pub struct BeginPick {
    base: StateBase<PickScratch>,
}

impl BeginPick {
    pub fn new() -> Self {
        Self::default()
    }
}

impl State<PickScratch> for BeginPick {
    pick_state_base!(StateTag::BEGIN_PICK);

    fn transition_in(&mut self, _prev: Option<StateTag>, ctx: &mut ToolContext<'_>) {
        let kind = ctx.viewport.as_deref().map(|vp| vp.kind());
        self.base.data.ignore_list = ctx.scene.filter(|e| match e.kind {
            EntityKind::Helper => true,
            EntityKind::Surface => kind == Some(ViewportKind::Scene3d),
            _ => kind == Some(ViewportKind::Canvas2d),
        });
    }

    fn signaled(&mut self, signal: SignalId, ctx: &mut ToolContext<'_>) -> StateReply {
        let sig = ctx.signals.editor();

        if signal == sig.left_mouse_down {
            if let Some(vp) = ctx.viewport.as_deref() {
                self.base.data.mouse_data[0] = vp.last_mouse_pos_screen_space();
            }
            return StateReply::None;
        }

        if signal == sig.left_mouse_up {
            let Some(vp) = ctx.viewport.as_deref() else {
                return StateReply::None;
            };
            self.base.data.mouse_data[0] = vp.last_mouse_pos_screen_space();

            let ray = vp.ray_from_mouse_position();
            let pick = ctx.scene.pick_ray(&ray, &self.base.data.ignore_list);
            log::debug!("Pick {:?} at {}", pick.entity, pick.pick_pos);
            self.base.data.pick_data.push(pick);
            return StateReply::Transition(StateTag::END_PICK);
        }

        if signal == sig.left_mouse_drag {
            return StateReply::Transition(StateTag::BEGIN_BOX_PICK);
        }

        if signal == sig.delete {
            return StateReply::Transition(StateTag::DELETE_PICK);
        }

        StateReply::None
    }
}

// ============================================================================
// BeginBoxPick
// ============================================================================

/// Tracks a drag rectangle and picks everything inside it on release.
#[derive(Default)]
pub struct BeginBoxPick {
    base: StateBase<PickScratch>,
}

impl BeginBoxPick {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Pick volume behind a screen rectangle. `None` for an empty rectangle.
pub fn box_pick_frustum(viewport: &dyn Viewport, min: Vec2, max: Vec2, depth: f32) -> Option<Frustum> {
    let size = max - min;
    if size.x <= 0.0 || size.y <= 0.0 {
        return None;
    }

    let camera = viewport.camera();
    let rect = [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)];

    let mut near = [Vec3::ZERO; 4];
    let mut far = [Vec3::ZERO; 4];
    for (i, corner) in rect.into_iter().enumerate() {
        let p = viewport.viewport_to_world_space(viewport.screen_to_viewport_space(corner));
        let ray = if camera.orthographic {
            Ray::new(camera.position, camera.direction)
        } else {
            Ray::from_points(camera.position, p)
        };
        near[i] = p;
        far[i] = p + ray.direction * depth;
    }

    Some(Frustum::from_corners(near, far))
}

impl State<PickScratch> for BeginBoxPick {
    pick_state_base!(StateTag::BEGIN_BOX_PICK);

    fn signaled(&mut self, signal: SignalId, ctx: &mut ToolContext<'_>) -> StateReply {
        let sig = ctx.signals.editor();

        if signal == sig.left_mouse_up {
            if let Some(vp) = ctx.viewport.as_deref() {
                let (min, max) = self.base.data.mouse_rect();
                match box_pick_frustum(vp, min, max, ctx.settings.box_pick_depth) {
                    Some(frustum) => {
                        let picks = ctx.scene.pick_frustum(&frustum, &self.base.data.ignore_list);
                        log::debug!("Box pick found {} entities", picks.len());
                        self.base.data.pick_data.extend(picks);
                    }
                    None => log::debug!("Empty box pick rectangle"),
                }
            }
            return StateReply::Transition(StateTag::END_PICK);
        }

        if signal == sig.left_mouse_drag {
            if let Some(vp) = ctx.viewport.as_deref_mut() {
                self.base.data.mouse_data[1] = vp.last_mouse_pos_screen_space();
                if !vp.is_moving() {
                    let (min, max) = self.base.data.mouse_rect();
                    vp.push_draw_command(DrawCommand::SelectionRect { min, max });
                }
            }
        }

        StateReply::None
    }
}

// ============================================================================
// EndPick
// ============================================================================

/// Holds the gesture's results until the owning mode consumes them.
#[derive(Default)]
pub struct EndPick {
    base: StateBase<PickScratch>,
}

impl EndPick {
    pub fn new() -> Self {
        Self::default()
    }
}

impl State<PickScratch> for EndPick {
    pick_state_base!(StateTag::END_PICK);

    fn update(&mut self, _dt: f32, _ctx: &mut ToolContext<'_>) -> StateReply {
        StateReply::Event(ToolEvent::Picked(self.base.data.pick_data.clone()))
    }
}

// ============================================================================
// DeletePick
// ============================================================================

/// Deletes the selected hierarchies as one undo group.
#[derive(Default)]
pub struct DeletePick {
    base: StateBase<PickScratch>,
}

impl DeletePick {
    pub fn new() -> Self {
        Self::default()
    }
}

impl State<PickScratch> for DeletePick {
    pick_state_base!(StateTag::DELETE_PICK);

    fn update(&mut self, _dt: f32, ctx: &mut ToolContext<'_>) -> StateReply {
        let delete_list = delete_order(ctx.scene);

        let mut count = 0;
        if !delete_list.is_empty() {
            ctx.actions.begin_action_group();
            for entity in delete_list {
                match DeleteAction::apply(entity, ctx.scene) {
                    Ok(action) => {
                        ctx.actions.add_action(Box::new(action));
                        count += 1;
                    }
                    Err(e) => log::warn!("Skipping delete of {}: {}", entity, e),
                }
            }
            ctx.actions.group_last_actions(count);
        }

        StateReply::Event(ToolEvent::Deleted(count))
    }
}

/// Selected hierarchies in deletion order: every parent comes before its
/// children so its removal records them for re-adoption on undo.
fn delete_order(scene: &EditorScene) -> Vec<EntityId> {
    let selected = scene.selected_entities();
    let mut delete_list = Vec::new();
    for root in scene.root_entities(&selected) {
        delete_list.push(root);
        // A prefab removes its owned hierarchy itself.
        let is_prefab = scene.get_entity(root).is_some_and(|e| e.kind == EntityKind::Prefab);
        if !is_prefab {
            delete_list.extend(scene.descendants(root));
        }
    }
    delete_list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionManager;
    use crate::core::{SignalRegistry, ToolSettings};
    use crate::viewport::ViewportState;

    #[test]
    fn test_mouse_rect_is_order_independent() {
        let mut scratch = PickScratch::default();
        scratch.mouse_data = [Vec2::new(50.0, 10.0), Vec2::new(10.0, 50.0)];
        assert_eq!(scratch.mouse_rect(), (Vec2::new(10.0, 10.0), Vec2::new(50.0, 50.0)));
    }

    #[test]
    fn test_zero_area_rect_has_no_frustum() {
        let vp = ViewportState::new(100, 100);
        let p = Vec2::new(20.0, 20.0);
        assert!(box_pick_frustum(&vp, p, p, 100.0).is_none());
        assert!(box_pick_frustum(&vp, p, Vec2::new(20.0, 60.0), 100.0).is_none());
    }

    #[test]
    fn test_box_frustum_covers_center() {
        let vp = ViewportState::new(100, 100);
        let frustum = box_pick_frustum(&vp, Vec2::new(40.0, 40.0), Vec2::new(60.0, 60.0), 100.0).unwrap();
        assert!(frustum.contains_point(Vec3::ZERO));
        assert!(!frustum.contains_point(Vec3::new(5.0, 0.0, 0.0)));
        assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, 20.0)));
    }

    #[test]
    fn test_hand_over_keeps_results_out_of_begin() {
        let mut from = PickScratch::default();
        from.ignore_list = vec![EntityId(3)];
        from.pick_data.push(PickData { entity: Some(EntityId(1)), pick_pos: Vec3::ZERO });

        let mut end = EndPick::new();
        from.clone().hand_over(&mut end);
        assert_eq!(end.base().data.pick_data.len(), 1);

        let mut begin = BeginPick::new();
        from.hand_over(&mut begin);
        assert!(begin.base().data.pick_data.is_empty());
        assert_eq!(begin.base().data.ignore_list, vec![EntityId(3)]);
        assert!(from.pick_data.is_empty());
    }

    #[test]
    fn test_ignore_list_by_viewport_kind() {
        let mut scene = EditorScene::new();
        let node = scene.add_entity("node", EntityKind::Node);
        let surface = scene.add_entity("surface", EntityKind::Surface);
        let grid = scene.add_entity("grid", EntityKind::Helper);

        let mut actions = ActionManager::new();
        let signals = SignalRegistry::new();
        let settings = ToolSettings::default();

        let mut vp = ViewportState::new(100, 100);
        let mut begin = BeginPick::new();
        {
            let mut ctx = ToolContext::new(&mut scene, &mut actions, &signals, &settings).with_viewport(&mut vp);
            begin.transition_in(None, &mut ctx);
        }
        assert_eq!(begin.base().data.ignore_list, vec![surface, grid]);

        vp.kind = ViewportKind::Canvas2d;
        {
            let mut ctx = ToolContext::new(&mut scene, &mut actions, &signals, &settings).with_viewport(&mut vp);
            begin.transition_in(None, &mut ctx);
        }
        assert_eq!(begin.base().data.ignore_list, vec![node, grid]);
    }

    #[test]
    fn test_delete_order_parents_first() {
        let mut scene = EditorScene::new();
        let parent = scene.add_entity("parent", EntityKind::Node);
        let child = scene.add_entity("child", EntityKind::Node);
        let grandchild = scene.add_entity("grandchild", EntityKind::Node);
        let other = scene.add_entity("other", EntityKind::Node);
        scene.set_parent(child, Some(parent)).unwrap();
        scene.set_parent(grandchild, Some(child)).unwrap();

        scene.add_to_selection(&[child, other, parent], false);
        assert_eq!(delete_order(&scene), vec![other, parent, child, grandchild]);
    }

    #[test]
    fn test_delete_order_leaves_prefab_children_to_the_prefab() {
        let mut scene = EditorScene::new();
        let prefab = scene.add_entity("prefab", EntityKind::Prefab);
        let part = scene.add_entity("part", EntityKind::Node);
        scene.set_parent(part, Some(prefab)).unwrap();

        scene.add_to_selection(&[prefab], false);
        assert_eq!(delete_order(&scene), vec![prefab]);
    }

    #[test]
    fn test_delete_pick_records_one_group() {
        let mut scene = EditorScene::new();
        let parent = scene.add_entity("parent", EntityKind::Node);
        let child = scene.add_entity("child", EntityKind::Node);
        scene.set_parent(child, Some(parent)).unwrap();
        scene.add_to_selection(&[child, parent], false);

        let mut actions = ActionManager::new();
        let signals = SignalRegistry::new();
        let settings = ToolSettings::default();
        let mut delete = DeletePick::new();
        let reply = {
            let mut ctx = ToolContext::new(&mut scene, &mut actions, &signals, &settings);
            delete.update(0.016, &mut ctx)
        };

        assert_eq!(reply, StateReply::Event(ToolEvent::Deleted(2)));
        assert!(scene.is_empty());
        assert_eq!(actions.undo_count(), 1);

        actions.undo(&mut scene).unwrap();
        assert_eq!(scene.parent_of(child), Some(parent));
    }
}
