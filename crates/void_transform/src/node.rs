//! Node arena - hierarchical transforms referenced by generational handles.
//!
//! A [`Node`] owns its local translation / orientation / scale, one parent
//! link and an ordered child list. Links are [`NodeHandle`]s into the owning
//! [`NodeTree`], so removing a node never leaves a dangling reference: the
//! removed slot's generation is bumped and every old handle to it goes stale.
//!
//! # Invariant
//!
//! A node either has no parent, or its parent's child list contains it
//! exactly once.

use core::fmt;

use glam::{Mat4, Quat, Vec3};

use crate::decompose::{compose, decompose, effective_parent, scale_in_space};
use crate::error::HierarchyError;
use crate::space::TransformSpace;
use crate::EPSILON;

/// Key into a [`NodeTree`] with generation tracking.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    index: u32,
    generation: u32,
}

impl NodeHandle {
    #[inline]
    pub const fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({}v{})", self.index, self.generation)
    }
}

/// A scene-graph node.
#[derive(Clone, Debug)]
pub struct Node {
    /// Translation relative to the parent
    pub translation: Vec3,
    /// Orientation relative to the parent (unit quaternion)
    pub orientation: Quat,
    /// Scale relative to the parent
    pub scale: Vec3,
    /// Inherit only the parent's translation (billboards, gizmo handles)
    pub inherit_only_translate: bool,
    /// Inherit the parent's scale
    pub inherit_scale: bool,
    parent: Option<NodeHandle>,
    children: Vec<NodeHandle>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            scale: Vec3::ONE,
            inherit_only_translate: false,
            inherit_scale: true,
            parent: None,
            children: Vec::new(),
        }
    }
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// Local affine matrix: orientation, then scale, then translation.
    #[inline]
    pub fn local_transform(&self) -> Mat4 {
        compose(self.translation, self.orientation, self.scale)
    }

    /// Detached copy: same local values and flags, no links.
    pub fn copy(&self) -> Node {
        Node {
            translation: self.translation,
            orientation: self.orientation,
            scale: self.scale,
            inherit_only_translate: self.inherit_only_translate,
            inherit_scale: self.inherit_scale,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Which decomposed components a transform operation writes back.
#[derive(Clone, Copy)]
struct Components {
    translation: bool,
    orientation: bool,
    scale: bool,
}

impl Components {
    const ALL: Self = Self { translation: true, orientation: true, scale: true };
    const TRANSLATION: Self = Self { translation: true, orientation: false, scale: false };
    const ORIENTATION: Self = Self { translation: false, orientation: true, scale: false };
    const SCALE: Self = Self { translation: false, orientation: false, scale: true };
}

struct Slot {
    node: Option<Node>,
    generation: u32,
}

/// Arena owning every node of a scene.
#[derive(Default)]
pub struct NodeTree {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    len: usize,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Create an identity node with no parent.
    pub fn create(&mut self) -> NodeHandle {
        self.insert(Node::default())
    }

    /// Insert a node. Any links it carries are dropped.
    pub fn insert(&mut self, node: Node) -> NodeHandle {
        let node = node.copy();
        self.len += 1;

        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeHandle { index, generation: slot.generation }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot { node: Some(node), generation: 0 });
            NodeHandle { index, generation: 0 }
        }
    }

    /// Remove a node. It is detached from its parent and its children are
    /// orphaned, not destroyed. The returned node carries no links.
    pub fn remove(&mut self, handle: NodeHandle) -> Option<Node> {
        if !self.contains(handle) {
            return None;
        }

        self.detach(handle);

        let slot = &mut self.slots[handle.index as usize];
        let mut node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(handle.index);
        self.len -= 1;

        for child in node.children.drain(..) {
            if let Some(c) = self.get_mut_raw(child) {
                c.parent = None;
            }
        }

        Some(node)
    }

    #[inline]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&Node> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    /// Mutable access to a node's local values. Links stay read-only.
    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.get_mut_raw(handle)
    }

    fn get_mut_raw(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Iterate over all live handles.
    pub fn handles(&self) -> impl Iterator<Item = NodeHandle> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.node.as_ref().map(|_| NodeHandle {
                index: index as u32,
                generation: slot.generation,
            })
        })
    }

    // ------------------------------------------------------------------
    // Hierarchy
    // ------------------------------------------------------------------

    /// Append `child` to `parent`'s children.
    pub fn add_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<(), HierarchyError> {
        self.insert_child(parent, child, usize::MAX)
    }

    /// Insert `child` at `index` in `parent`'s children (clamped to the end).
    ///
    /// A child that already has a parent is detached from it first. Parenting
    /// a node into its own subtree is rejected.
    pub fn insert_child(
        &mut self,
        parent: NodeHandle,
        child: NodeHandle,
        index: usize,
    ) -> Result<(), HierarchyError> {
        if !self.contains(child) {
            return Err(HierarchyError::NodeNotFound(child));
        }
        if !self.contains(parent) {
            return Err(HierarchyError::NodeNotFound(parent));
        }
        if child == parent {
            return Err(HierarchyError::SelfParent(child));
        }
        if self.is_ancestor(parent, child) {
            return Err(HierarchyError::CycleDetected { child, parent });
        }

        self.detach(child);

        if let Some(p) = self.get_mut_raw(parent) {
            let at = index.min(p.children.len());
            p.children.insert(at, child);
        }
        if let Some(c) = self.get_mut_raw(child) {
            c.parent = Some(parent);
        }

        Ok(())
    }

    /// Remove `child` from its parent's list. Returns the old parent.
    pub fn detach(&mut self, child: NodeHandle) -> Option<NodeHandle> {
        let parent = self.get_mut_raw(child)?.parent.take()?;
        if let Some(p) = self.get_mut_raw(parent) {
            if let Some(pos) = p.children.iter().position(|&c| c == child) {
                p.children.remove(pos);
            }
        }
        Some(parent)
    }

    #[inline]
    pub fn parent(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.get(handle).and_then(|n| n.parent)
    }

    #[inline]
    pub fn children(&self, handle: NodeHandle) -> &[NodeHandle] {
        self.get(handle).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Position of `handle` in its parent's child list.
    pub fn child_index(&self, handle: NodeHandle) -> Option<usize> {
        let parent = self.parent(handle)?;
        self.children(parent).iter().position(|&c| c == handle)
    }

    /// Top-most ancestor (the node itself when it has no parent).
    pub fn root(&self, handle: NodeHandle) -> NodeHandle {
        let mut current = handle;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Whether `ancestor` appears in the parent chain of `node`.
    pub fn is_ancestor(&self, node: NodeHandle, ancestor: NodeHandle) -> bool {
        let mut current = self.parent(node);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    /// Number of ancestors.
    pub fn depth(&self, handle: NodeHandle) -> usize {
        let mut depth = 0;
        let mut current = self.parent(handle);
        while let Some(p) = current {
            depth += 1;
            current = self.parent(p);
        }
        depth
    }

    /// All descendants, depth first, parents before their children.
    pub fn descendants(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeHandle> = self.children(handle).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    // ------------------------------------------------------------------
    // Transforms
    // ------------------------------------------------------------------

    /// Local affine matrix of the node (identity for stale handles).
    pub fn local_transform(&self, handle: NodeHandle) -> Mat4 {
        self.get(handle).map(Node::local_transform).unwrap_or(Mat4::IDENTITY)
    }

    /// Parent's world transform filtered by the node's inheritance flags.
    /// Identity for root nodes.
    pub fn parent_transform(&self, handle: NodeHandle) -> Mat4 {
        let Some(node) = self.get(handle) else {
            return Mat4::IDENTITY;
        };
        match node.parent {
            Some(parent) => effective_parent(
                self.world_transform(parent),
                node.inherit_only_translate,
                node.inherit_scale,
            ),
            None => Mat4::IDENTITY,
        }
    }

    /// Absolute transform of the node.
    pub fn world_transform(&self, handle: NodeHandle) -> Mat4 {
        let local = self.local_transform(handle);
        if self.parent(handle).is_some() {
            self.parent_transform(handle) * local
        } else {
            local
        }
    }

    /// Transform of the node expressed in `space`.
    ///
    /// `Local` is always identity, `Parent` is the local affine matrix and
    /// `World` composes with the effective parent chain.
    pub fn get_transform(&self, handle: NodeHandle, space: TransformSpace) -> Mat4 {
        match space {
            TransformSpace::Local => Mat4::IDENTITY,
            TransformSpace::Parent => self.local_transform(handle),
            TransformSpace::World => self.world_transform(handle),
        }
    }

    pub fn get_translation(&self, handle: NodeHandle, space: TransformSpace) -> Vec3 {
        match (space, self.get(handle)) {
            (TransformSpace::Parent, Some(node)) => node.translation,
            (TransformSpace::World, Some(_)) => decompose(&self.world_transform(handle)).translation,
            _ => Vec3::ZERO,
        }
    }

    pub fn get_orientation(&self, handle: NodeHandle, space: TransformSpace) -> Quat {
        match (space, self.get(handle)) {
            (TransformSpace::Parent, Some(node)) => node.orientation,
            (TransformSpace::World, Some(_)) => decompose(&self.world_transform(handle)).orientation,
            _ => Quat::IDENTITY,
        }
    }

    pub fn get_scale(&self, handle: NodeHandle, space: TransformSpace) -> Vec3 {
        match (space, self.get(handle)) {
            (TransformSpace::Parent, Some(node)) => node.scale,
            (TransformSpace::World, Some(_)) => decompose(&self.world_transform(handle)).scale,
            _ => Vec3::ONE,
        }
    }

    /// Move the node by `delta` expressed in `space`.
    pub fn translate(&mut self, handle: NodeHandle, delta: Vec3, space: TransformSpace) {
        self.with_neutral_scale(handle, |tree| {
            tree.transform_imp(handle, Mat4::from_translation(delta), space, Components::TRANSLATION);
        });
    }

    /// Rotate the node by `delta` expressed in `space`.
    pub fn rotate(&mut self, handle: NodeHandle, delta: Quat, space: TransformSpace) {
        self.with_neutral_scale(handle, |tree| {
            tree.transform_imp(handle, Mat4::from_quat(delta), space, Components::ORIENTATION);
        });
    }

    /// Multiply the node's scale by `factor` expressed in `space`.
    pub fn scale(&mut self, handle: NodeHandle, factor: Vec3, space: TransformSpace) {
        self.transform_imp(handle, Mat4::from_scale(factor), space, Components::SCALE);
    }

    /// Compose an arbitrary affine `delta` into the node.
    pub fn transform(&mut self, handle: NodeHandle, delta: Mat4, space: TransformSpace) {
        self.transform_imp(handle, delta, space, Components::ALL);
    }

    /// Replace the node's transform with `value` expressed in `space`.
    pub fn set_transform(&mut self, handle: NodeHandle, value: Mat4, space: TransformSpace) {
        self.set_transform_imp(handle, value, space, Components::ALL);
    }

    pub fn set_translation(&mut self, handle: NodeHandle, value: Vec3, space: TransformSpace) {
        if space == TransformSpace::Local {
            self.translate(handle, value, space);
            return;
        }

        let Some(is_root) = self.get(handle).map(|n| n.parent.is_none()) else {
            log::debug!("set_translation on stale handle {:?}", handle);
            return;
        };

        if is_root {
            if let Some(node) = self.get_mut_raw(handle) {
                node.translation = value;
            }
        } else {
            self.set_transform_imp(handle, Mat4::from_translation(value), space, Components::TRANSLATION);
        }
    }

    pub fn set_orientation(&mut self, handle: NodeHandle, value: Quat, space: TransformSpace) {
        if space == TransformSpace::Local {
            self.rotate(handle, value, space);
            return;
        }

        let Some(is_root) = self.get(handle).map(|n| n.parent.is_none()) else {
            log::debug!("set_orientation on stale handle {:?}", handle);
            return;
        };

        if is_root {
            if let Some(node) = self.get_mut_raw(handle) {
                node.orientation = value.normalize();
            }
        } else {
            self.set_transform_imp(handle, Mat4::from_quat(value), space, Components::ORIENTATION);
        }
    }

    /// Set the node's scale to `value` measured in `space`.
    ///
    /// A singular parent basis makes world-space scale unsolvable; the
    /// node keeps its current scale in that case.
    pub fn set_scale(&mut self, handle: NodeHandle, value: Vec3, space: TransformSpace) {
        let Some(node) = self.get(handle) else {
            log::debug!("set_scale on stale handle {:?}", handle);
            return;
        };
        let local_orientation = node.orientation;
        let parent = self.parent_transform(handle);
        let world_orientation = self.get_orientation(handle, TransformSpace::World);

        match scale_in_space(value, space, parent, world_orientation, local_orientation) {
            Ok(scale) => {
                if let Some(node) = self.get_mut_raw(handle) {
                    node.scale = scale;
                }
            }
            Err(e) => log::warn!("set_scale on {:?} ignored: {}", handle, e),
        }
    }

    fn with_neutral_scale(&mut self, handle: NodeHandle, f: impl FnOnce(&mut Self)) {
        let Some(node) = self.get_mut_raw(handle) else {
            log::debug!("transform on stale handle {:?}", handle);
            return;
        };
        let saved = core::mem::replace(&mut node.scale, Vec3::ONE);
        f(self);
        if let Some(node) = self.get_mut_raw(handle) {
            node.scale = saved;
        }
    }

    fn transform_imp(&mut self, handle: NodeHandle, delta: Mat4, space: TransformSpace, write: Components) {
        let Some(node) = self.get(handle) else {
            log::debug!("transform on stale handle {:?}", handle);
            return;
        };
        let local = node.local_transform();

        let ts = match space {
            TransformSpace::World => {
                let ps = self.parent_transform(handle);
                let Some(inv) = self.parent_inverse(handle, &ps) else {
                    return;
                };
                inv * delta * ps * local
            }
            TransformSpace::Parent => delta * local,
            TransformSpace::Local => local * delta,
        };

        self.write_back(handle, &ts, write);
    }

    fn set_transform_imp(&mut self, handle: NodeHandle, value: Mat4, space: TransformSpace, write: Components) {
        let ts = match space {
            TransformSpace::Local => {
                self.transform_imp(handle, value, TransformSpace::Local, write);
                return;
            }
            TransformSpace::World if self.parent(handle).is_some() => {
                let ps = self.parent_transform(handle);
                let Some(inv) = self.parent_inverse(handle, &ps) else {
                    return;
                };
                inv * value
            }
            TransformSpace::World | TransformSpace::Parent => value,
        };

        self.write_back(handle, &ts, write);
    }

    /// Inverse of the effective parent transform. `None` when the parent
    /// collapses an axis; world-space edits leave the node untouched then.
    fn parent_inverse(&self, handle: NodeHandle, ps: &Mat4) -> Option<Mat4> {
        let determinant = ps.determinant();
        if determinant.abs() < EPSILON {
            log::warn!(
                "world-space edit on {:?} ignored: singular parent (determinant {})",
                handle,
                determinant
            );
            return None;
        }
        Some(ps.inverse())
    }

    fn write_back(&mut self, handle: NodeHandle, ts: &Mat4, write: Components) {
        let d = decompose(ts);
        if let Some(node) = self.get_mut_raw(handle) {
            if write.translation {
                node.translation = d.translation;
            }
            if write.orientation {
                node.orientation = d.orientation;
            }
            if write.scale {
                node.scale = d.scale;
            }
        }
    }
}
