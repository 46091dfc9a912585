//! Concrete states the tool modes are wired from.
//!
//! - [`picking`] - click and box selection, delete
//! - [`duplicate`] - copy the selection as one undo step
//! - [`transform`] - drag gestures for move, rotate, scale and anchor

pub mod duplicate;
pub mod picking;
pub mod transform;

pub use duplicate::Duplicate;
pub use picking::{BeginBoxPick, BeginPick, DeletePick, EndPick, PickScratch};
pub use transform::{TransformBegin, TransformEnd, TransformKind, TransformScratch, TransformTo};
