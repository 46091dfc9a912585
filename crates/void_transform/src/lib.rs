//! # void_transform - Hierarchical Transform Engine
//!
//! Scene-graph nodes that compose and decompose affine transforms across
//! three coordinate spaces, plus the small amount of pick geometry the
//! editor tools need.
//!
//! ## Spaces
//!
//! - [`TransformSpace::Local`] - relative to the node's own current transform
//! - [`TransformSpace::Parent`] - relative to the immediate parent
//! - [`TransformSpace::World`] - absolute
//!
//! ## Storage
//!
//! Nodes live in a [`NodeTree`] arena and are referenced by generational
//! [`NodeHandle`]s. Parent and child links are handles, so removing a node
//! only invalidates its own handle and orphans its children.
//!
//! ```ignore
//! use void_transform::prelude::*;
//!
//! let mut tree = NodeTree::new();
//! let root = tree.create();
//! let child = tree.create();
//! tree.add_child(root, child)?;
//!
//! tree.set_scale(root, Vec3::splat(2.0), TransformSpace::Local);
//! tree.translate(child, Vec3::X, TransformSpace::World);
//! let world = tree.get_transform(child, TransformSpace::World);
//! ```

pub mod decompose;
pub mod error;
pub mod geometry;
pub mod node;
pub mod space;

pub use decompose::*;
pub use error::{HierarchyError, TransformError};
pub use geometry::{Frustum, Plane, Ray};
pub use node::{Node, NodeHandle, NodeTree};
pub use space::TransformSpace;

/// Tolerance used when deciding a basis vector or determinant is degenerate.
pub const EPSILON: f32 = 1e-6;

pub mod prelude {
    pub use crate::decompose::{compose, decompose, effective_parent, scale_in_space, Decomposed};
    pub use crate::error::{HierarchyError, TransformError};
    pub use crate::geometry::{Frustum, Plane, Ray};
    pub use crate::node::{Node, NodeHandle, NodeTree};
    pub use crate::space::TransformSpace;
    pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};
}
