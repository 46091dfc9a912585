//! Error types for hierarchy and transform operations

use thiserror::Error;

use crate::node::NodeHandle;

/// Errors that can occur while editing the node hierarchy.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HierarchyError {
    /// Handle is stale or was never issued by this tree
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeHandle),
    /// A node cannot be its own parent
    #[error("node {0:?} cannot be parented to itself")]
    SelfParent(NodeHandle),
    /// The parent is already a descendant of the child
    #[error("parenting {child:?} under {parent:?} would create a cycle")]
    CycleDetected {
        /// Node being attached
        child: NodeHandle,
        /// Requested parent
        parent: NodeHandle,
    },
}

/// Errors from the pure transform helpers.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum TransformError {
    /// Parent basis has a (near) zero determinant and cannot be inverted
    #[error("parent transform is singular (determinant {determinant})")]
    SingularParent {
        /// Determinant of the parent's 3x3 basis
        determinant: f32,
    },
}
