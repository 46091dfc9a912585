//! Coordinate spaces a transform value can be expressed in.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Frame of reference for transform operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransformSpace {
    /// Relative to the node's own current transform
    Local,
    /// Relative to the immediate parent
    Parent,
    /// Absolute
    #[default]
    World,
}

impl TransformSpace {
    pub fn name(&self) -> &'static str {
        match self {
            TransformSpace::Local => "Local",
            TransformSpace::Parent => "Parent",
            TransformSpace::World => "World",
        }
    }

    pub fn all() -> &'static [TransformSpace] {
        &[TransformSpace::Local, TransformSpace::Parent, TransformSpace::World]
    }
}

impl fmt::Display for TransformSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
