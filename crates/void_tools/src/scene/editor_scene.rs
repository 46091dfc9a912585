//! Entity storage, hierarchy helpers, picking and selection.

use std::collections::{BTreeMap, HashMap};

use glam::{Mat4, Vec3};
use void_transform::{decompose, Frustum, Node, NodeHandle, NodeTree, Ray, TransformSpace};

use crate::actions::{ActionError, ActionResult};
use crate::core::{EntityId, SelectionManager, SelectionMode};

/// Distance along the pick ray reported when nothing is hit.
pub const PICK_MISS_DISTANCE: f32 = 5.0;

/// Entity category, used by picking and copying.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Plain scene node
    Node,
    /// Instance that owns its nested hierarchy
    Prefab,
    /// 2D UI surface, edited in canvas viewports
    Surface,
    /// Editor helper (grid, debug gizmos), never pickable
    Helper,
}

impl EntityKind {
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Node => "Node",
            EntityKind::Prefab => "Prefab",
            EntityKind::Surface => "Surface",
            EntityKind::Helper => "Helper",
        }
    }
}

/// An entity in the scene.
#[derive(Clone, Debug)]
pub struct SceneEntity {
    pub id: EntityId,
    pub name: String,
    pub kind: EntityKind,
    pub node: NodeHandle,
    /// Pick sphere radius before world scale
    pub bounding_radius: f32,
}

/// Result of a pick query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickData {
    pub entity: Option<EntityId>,
    pub pick_pos: Vec3,
}

/// Everything needed to put a removed entity back.
#[derive(Clone, Debug)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub name: String,
    pub kind: EntityKind,
    pub bounding_radius: f32,
    pub node: Node,
    pub parent: Option<EntityId>,
    pub child_index: usize,
    pub children: Vec<EntityId>,
}

/// The scene edited by the tools.
pub struct EditorScene {
    entities: BTreeMap<EntityId, SceneEntity>,
    by_node: HashMap<NodeHandle, EntityId>,
    nodes: NodeTree,
    selection: SelectionManager,
    next_id: u32,
    /// 3D cursor placed by the cursor tool
    cursor: Vec3,
    status: String,
}

impl Default for EditorScene {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorScene {
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            by_node: HashMap::new(),
            nodes: NodeTree::new(),
            selection: SelectionManager::new(),
            next_id: 1,
            cursor: Vec3::ZERO,
            status: String::new(),
        }
    }

    // ========================================================================
    // Entities
    // ========================================================================

    /// Create an entity with a fresh identity node.
    pub fn add_entity(&mut self, name: impl Into<String>, kind: EntityKind) -> EntityId {
        self.add_entity_with_node(name, kind, Node::new())
    }

    pub fn add_entity_with_node(&mut self, name: impl Into<String>, kind: EntityKind, node: Node) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;

        let handle = self.nodes.insert(node);
        self.by_node.insert(handle, id);
        self.entities.insert(
            id,
            SceneEntity {
                id,
                name: name.into(),
                kind,
                node: handle,
                bounding_radius: 1.0,
            },
        );
        id
    }

    pub fn get_entity(&self, id: EntityId) -> Option<&SceneEntity> {
        self.entities.get(&id)
    }

    pub fn get_entity_mut(&mut self, id: EntityId) -> Option<&mut SceneEntity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    /// Entities matching a predicate, in id order.
    pub fn filter(&self, pred: impl Fn(&SceneEntity) -> bool) -> Vec<EntityId> {
        self.entities.values().filter(|e| pred(e)).map(|e| e.id).collect()
    }

    pub fn nodes(&self) -> &NodeTree {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut NodeTree {
        &mut self.nodes
    }

    pub fn node_of(&self, id: EntityId) -> Option<NodeHandle> {
        self.entities.get(&id).map(|e| e.node)
    }

    pub fn world_transform(&self, id: EntityId) -> Mat4 {
        self.node_of(id)
            .map(|h| self.nodes.get_transform(h, TransformSpace::World))
            .unwrap_or(Mat4::IDENTITY)
    }

    pub fn world_position(&self, id: EntityId) -> Vec3 {
        self.world_transform(id).w_axis.truncate()
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Parent `child` under `parent`, or make it a root.
    pub fn set_parent(&mut self, child: EntityId, parent: Option<EntityId>) -> ActionResult {
        let child_node = self.node_of(child).ok_or(ActionError::EntityNotFound(child))?;
        match parent {
            Some(p) => {
                let parent_node = self.node_of(p).ok_or(ActionError::EntityNotFound(p))?;
                self.nodes.add_child(parent_node, child_node)?;
            }
            None => {
                self.nodes.detach(child_node);
            }
        }
        Ok(())
    }

    pub fn parent_of(&self, id: EntityId) -> Option<EntityId> {
        let node = self.node_of(id)?;
        let parent = self.nodes.parent(node)?;
        self.by_node.get(&parent).copied()
    }

    /// Direct children in node order.
    pub fn children_of(&self, id: EntityId) -> Vec<EntityId> {
        self.node_of(id)
            .map(|h| self.entities_for(self.nodes.children(h)))
            .unwrap_or_default()
    }

    /// All descendants, parents before their children.
    pub fn descendants(&self, id: EntityId) -> Vec<EntityId> {
        self.node_of(id)
            .map(|h| self.entities_for(&self.nodes.descendants(h)))
            .unwrap_or_default()
    }

    /// Entities of `ids` that have no ancestor in `ids`, in input order.
    pub fn root_entities(&self, ids: &[EntityId]) -> Vec<EntityId> {
        ids.iter()
            .copied()
            .filter(|&id| {
                let mut current = self.parent_of(id);
                while let Some(p) = current {
                    if ids.contains(&p) {
                        return false;
                    }
                    current = self.parent_of(p);
                }
                true
            })
            .collect()
    }

    fn entities_for(&self, handles: &[NodeHandle]) -> Vec<EntityId> {
        handles.iter().filter_map(|h| self.by_node.get(h).copied()).collect()
    }

    // ========================================================================
    // Copy / remove / restore
    // ========================================================================

    /// Copy an entity and its whole subtree. The copy of `id` comes first
    /// and is attached to the same parent, right after the original.
    pub fn deep_copy(&mut self, id: EntityId) -> Result<Vec<EntityId>, ActionError> {
        let mut copies = Vec::new();
        let root = self.copy_subtree(id, &mut copies)?;
        self.attach_like(root, id)?;
        Ok(copies)
    }

    /// Copy a single entity. A prefab brings its owned hierarchy along, but
    /// only the prefab itself is returned.
    pub fn copy_entity(&mut self, id: EntityId) -> Result<EntityId, ActionError> {
        let entity = self.get_entity(id).ok_or(ActionError::EntityNotFound(id))?;
        let copy = if entity.kind == EntityKind::Prefab {
            let mut owned = Vec::new();
            self.copy_subtree(id, &mut owned)?
        } else {
            self.copy_one(id)?
        };
        self.attach_like(copy, id)?;
        Ok(copy)
    }

    fn copy_one(&mut self, id: EntityId) -> Result<EntityId, ActionError> {
        let entity = self.get_entity(id).ok_or(ActionError::EntityNotFound(id))?;
        let (name, kind, radius) = (entity.name.clone(), entity.kind, entity.bounding_radius);
        let node = self
            .nodes
            .get(entity.node)
            .map(Node::copy)
            .ok_or(ActionError::EntityNotFound(id))?;

        let copy = self.add_entity_with_node(name, kind, node);
        if let Some(e) = self.get_entity_mut(copy) {
            e.bounding_radius = radius;
        }
        Ok(copy)
    }

    fn copy_subtree(&mut self, id: EntityId, copies: &mut Vec<EntityId>) -> Result<EntityId, ActionError> {
        let copy = self.copy_one(id)?;
        copies.push(copy);
        for child in self.children_of(id) {
            let child_copy = self.copy_subtree(child, copies)?;
            self.set_parent(child_copy, Some(copy))?;
        }
        Ok(copy)
    }

    fn attach_like(&mut self, copy: EntityId, original: EntityId) -> ActionResult {
        let (Some(orig_node), Some(copy_node)) = (self.node_of(original), self.node_of(copy)) else {
            return Err(ActionError::EntityNotFound(original));
        };
        if let (Some(parent), Some(index)) = (self.nodes.parent(orig_node), self.nodes.child_index(orig_node)) {
            self.nodes.insert_child(parent, copy_node, index + 1)?;
        }
        Ok(())
    }

    /// Remove an entity. A prefab takes its owned hierarchy with it; any
    /// other entity orphans its children.
    ///
    /// Snapshots are returned parents first, ready for [`Self::restore`].
    pub fn remove_entity(&mut self, id: EntityId) -> Vec<EntitySnapshot> {
        let Some(entity) = self.get_entity(id) else {
            return Vec::new();
        };

        let mut ids = vec![id];
        if entity.kind == EntityKind::Prefab {
            ids.extend(self.descendants(id));
        }

        let snapshots: Vec<EntitySnapshot> = ids.iter().filter_map(|&e| self.snapshot(e)).collect();
        for &e in ids.iter().rev() {
            if let Some(entity) = self.entities.remove(&e) {
                self.by_node.remove(&entity.node);
                self.nodes.remove(entity.node);
                self.selection.remove_entity(e);
            }
        }
        snapshots
    }

    fn snapshot(&self, id: EntityId) -> Option<EntitySnapshot> {
        let entity = self.get_entity(id)?;
        let node = self.nodes.get(entity.node)?;
        Some(EntitySnapshot {
            id,
            name: entity.name.clone(),
            kind: entity.kind,
            bounding_radius: entity.bounding_radius,
            node: node.copy(),
            parent: self.parent_of(id),
            child_index: self.nodes.child_index(entity.node).unwrap_or(0),
            children: self.children_of(id),
        })
    }

    /// Put removed entities back, re-linking parents and orphaned children
    /// that are still in the scene.
    pub fn restore(&mut self, snapshots: &[EntitySnapshot]) -> ActionResult {
        for snap in snapshots {
            if self.contains(snap.id) {
                return Err(ActionError::EntityExists(snap.id));
            }

            let handle = self.nodes.insert(snap.node.clone());
            self.by_node.insert(handle, snap.id);
            self.entities.insert(
                snap.id,
                SceneEntity {
                    id: snap.id,
                    name: snap.name.clone(),
                    kind: snap.kind,
                    node: handle,
                    bounding_radius: snap.bounding_radius,
                },
            );
            self.next_id = self.next_id.max(snap.id.0 + 1);

            if let Some(parent) = snap.parent.and_then(|p| self.node_of(p)) {
                self.nodes.insert_child(parent, handle, snap.child_index)?;
            }
            for &child in &snap.children {
                if let Some(child_node) = self.node_of(child) {
                    if self.nodes.parent(child_node).is_none() {
                        self.nodes.add_child(handle, child_node)?;
                    }
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Picking
    // ========================================================================

    fn pick_sphere(&self, entity: &SceneEntity) -> (Vec3, f32) {
        let world = self.nodes.get_transform(entity.node, TransformSpace::World);
        let scale = decompose(&world).scale.abs().max_element();
        (world.w_axis.truncate(), entity.bounding_radius * scale)
    }

    /// Nearest entity hit by `ray`.
    pub fn pick_ray(&self, ray: &Ray, ignore: &[EntityId]) -> PickData {
        let mut best: Option<(f32, EntityId)> = None;
        for entity in self.entities.values() {
            if ignore.contains(&entity.id) {
                continue;
            }
            let (center, radius) = self.pick_sphere(entity);
            if let Some(t) = ray.intersect_sphere(center, radius) {
                if best.map_or(true, |(bt, _)| t < bt) {
                    best = Some((t, entity.id));
                }
            }
        }

        match best {
            Some((t, id)) => PickData {
                entity: Some(id),
                pick_pos: ray.at(t),
            },
            None => PickData {
                entity: None,
                pick_pos: ray.at(PICK_MISS_DISTANCE),
            },
        }
    }

    /// Every entity overlapping `frustum`, in id order.
    pub fn pick_frustum(&self, frustum: &Frustum, ignore: &[EntityId]) -> Vec<PickData> {
        self.entities
            .values()
            .filter(|e| !ignore.contains(&e.id))
            .filter_map(|e| {
                let (center, radius) = self.pick_sphere(e);
                frustum.intersects_sphere(center, radius).then_some(PickData {
                    entity: Some(e.id),
                    pick_pos: center,
                })
            })
            .collect()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn selected_entities(&self) -> Vec<EntityId> {
        self.selection.selected().to_vec()
    }

    pub fn is_selected(&self, id: EntityId) -> bool {
        self.selection.is_selected(id)
    }

    /// Merge picked ids into the selection. Non-additive picks replace it,
    /// additive picks toggle each id. Ids not in the scene are skipped.
    pub fn add_to_selection(&mut self, ids: &[EntityId], additive: bool) {
        let ids: Vec<EntityId> = ids.iter().copied().filter(|id| self.contains(*id)).collect();
        self.selection.apply(ids, SelectionMode::from_additive(additive));
    }

    pub fn select(&mut self, id: EntityId, mode: SelectionMode) {
        if self.contains(id) {
            self.selection.select(id, mode);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ========================================================================
    // Editor state
    // ========================================================================

    pub fn cursor(&self) -> Vec3 {
        self.cursor
    }

    pub fn set_cursor(&mut self, location: Vec3) {
        self.cursor = location;
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
        log::info!("{}", self.status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family(scene: &mut EditorScene) -> (EntityId, EntityId, EntityId) {
        let p = scene.add_entity("parent", EntityKind::Node);
        let c = scene.add_entity("child", EntityKind::Node);
        let g = scene.add_entity("grandchild", EntityKind::Node);
        scene.set_parent(c, Some(p)).unwrap();
        scene.set_parent(g, Some(c)).unwrap();
        (p, c, g)
    }

    #[test]
    fn test_root_entities() {
        let mut scene = EditorScene::new();
        let (p, c, g) = family(&mut scene);
        let other = scene.add_entity("other", EntityKind::Node);

        assert_eq!(scene.root_entities(&[g, p, other]), vec![p, other]);
        assert_eq!(scene.root_entities(&[g, c]), vec![c]);
    }

    #[test]
    fn test_descendants_pre_order() {
        let mut scene = EditorScene::new();
        let (p, c, g) = family(&mut scene);
        assert_eq!(scene.descendants(p), vec![c, g]);
        assert_eq!(scene.parent_of(g), Some(c));
    }

    #[test]
    fn test_deep_copy_keeps_shape_and_parent() {
        let mut scene = EditorScene::new();
        let (p, c, _) = family(&mut scene);

        let copies = scene.deep_copy(c).unwrap();
        assert_eq!(copies.len(), 2);
        assert_eq!(scene.parent_of(copies[0]), Some(p));
        assert_eq!(scene.parent_of(copies[1]), Some(copies[0]));
        assert_eq!(scene.children_of(p), vec![c, copies[0]]);
    }

    #[test]
    fn test_copy_prefab_brings_owned_hierarchy() {
        let mut scene = EditorScene::new();
        let prefab = scene.add_entity("prefab", EntityKind::Prefab);
        let part = scene.add_entity("part", EntityKind::Node);
        scene.set_parent(part, Some(prefab)).unwrap();

        let copy = scene.copy_entity(prefab).unwrap();
        assert_eq!(scene.children_of(copy).len(), 1);
        assert_eq!(scene.len(), 4);
    }

    #[test]
    fn test_remove_orphans_and_restore_relinks() {
        let mut scene = EditorScene::new();
        let (p, c, g) = family(&mut scene);

        let snaps = scene.remove_entity(c);
        assert_eq!(snaps.len(), 1);
        assert!(!scene.contains(c));
        assert_eq!(scene.parent_of(g), None);
        assert!(scene.children_of(p).is_empty());

        scene.restore(&snaps).unwrap();
        assert_eq!(scene.parent_of(c), Some(p));
        assert_eq!(scene.parent_of(g), Some(c));
    }

    #[test]
    fn test_remove_prefab_takes_subtree() {
        let mut scene = EditorScene::new();
        let prefab = scene.add_entity("prefab", EntityKind::Prefab);
        let part = scene.add_entity("part", EntityKind::Node);
        scene.set_parent(part, Some(prefab)).unwrap();

        let snaps = scene.remove_entity(prefab);
        assert_eq!(snaps.len(), 2);
        assert!(scene.is_empty());

        scene.restore(&snaps).unwrap();
        assert_eq!(scene.parent_of(part), Some(prefab));
    }

    #[test]
    fn test_restore_existing_entity_fails() {
        let mut scene = EditorScene::new();
        let a = scene.add_entity("a", EntityKind::Node);
        let snaps = scene.remove_entity(a);
        scene.restore(&snaps).unwrap();

        assert!(matches!(scene.restore(&snaps), Err(ActionError::EntityExists(id)) if id == a));
    }

    #[test]
    fn test_pick_ray_nearest_and_ignore() {
        let mut scene = EditorScene::new();
        let near = scene.add_entity_with_node("near", EntityKind::Node, Node::new().with_translation(Vec3::new(0.0, 0.0, 5.0)));
        let far = scene.add_entity("far", EntityKind::Node);

        let ray = Ray::new(Vec3::new(0.0, 0.0, 20.0), Vec3::NEG_Z);
        assert_eq!(scene.pick_ray(&ray, &[]).entity, Some(near));
        assert_eq!(scene.pick_ray(&ray, &[near]).entity, Some(far));

        let miss = scene.pick_ray(&Ray::new(Vec3::new(50.0, 0.0, 20.0), Vec3::NEG_Z), &[]);
        assert_eq!(miss.entity, None);
        assert!(miss.pick_pos.abs_diff_eq(Vec3::new(50.0, 0.0, 15.0), 1e-5));
    }

    #[test]
    fn test_pick_sphere_follows_world_scale() {
        let mut scene = EditorScene::new();
        let big = scene.add_entity_with_node("big", EntityKind::Node, Node::new().with_scale(Vec3::splat(4.0)));

        let ray = Ray::new(Vec3::new(3.0, 0.0, 20.0), Vec3::NEG_Z);
        assert_eq!(scene.pick_ray(&ray, &[]).entity, Some(big));
    }

    #[test]
    fn test_add_to_selection_skips_unknown() {
        let mut scene = EditorScene::new();
        let a = scene.add_entity("a", EntityKind::Node);
        scene.add_to_selection(&[a, EntityId(99)], false);
        assert_eq!(scene.selected_entities(), vec![a]);

        scene.add_to_selection(&[a], true);
        assert!(scene.selected_entities().is_empty());
    }
}
