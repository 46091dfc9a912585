//! Signal-driven state automaton.
//!
//! A [`State`] reacts to per-frame ticks and discrete signals and answers
//! with a [`StateReply`]. The [`StateMachine`] owning it resolves
//! transition requests (or, failing that, the state's static link table),
//! runs the exit and enter hooks in order and hands tool events back to
//! the caller.

mod machine;

pub use machine::StateMachine;

use std::collections::HashMap;
use std::fmt;

use crate::context::ToolContext;
use crate::core::{EntityId, SignalId};
use crate::scene::PickData;

/// Stable identifier of a state inside one machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StateTag(pub &'static str);

impl StateTag {
    pub const BEGIN_PICK: Self = Self("StateBeginPick");
    pub const BEGIN_BOX_PICK: Self = Self("StateBeginBoxPick");
    pub const END_PICK: Self = Self("StateEndPick");
    pub const DELETE_PICK: Self = Self("StateDeletePick");
    pub const TRANSFORM_BEGIN: Self = Self("StateTransformBegin");
    pub const TRANSFORM_TO: Self = Self("StateTransformTo");
    pub const TRANSFORM_END: Self = Self("StateTransformEnd");
    pub const DUPLICATE: Self = Self("StateDuplicate");
    pub const ANCHOR_BEGIN: Self = Self("StateAnchorBegin");
    pub const ANCHOR_TO: Self = Self("StateAnchorTo");
    pub const ANCHOR_END: Self = Self("StateAnchorEnd");
}

impl fmt::Display for StateTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Outcome a state reports to the owning tool mode.
#[derive(Clone, Debug, PartialEq)]
pub enum ToolEvent {
    /// A pick gesture finished
    Picked(Vec<PickData>),
    /// Entities were deleted as one undo group of this many actions
    Deleted(usize),
    /// Copies created by a duplicate request
    Duplicated(Vec<EntityId>),
    /// A transform drag was committed as one undo group of this many actions
    TransformCommitted(usize),
}

/// What a state wants after handling a tick or signal.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum StateReply {
    /// Stay; for signals the link table is consulted next
    #[default]
    None,
    /// Move to the state with this tag
    Transition(StateTag),
    /// Report an event to the tool mode; for signals the link table is
    /// still consulted
    Event(ToolEvent),
}

/// Data every state carries: its signal links and the scratch data shared
/// by all states of one machine.
#[derive(Clone, Debug, Default)]
pub struct StateBase<D> {
    pub data: D,
    /// Fallback transitions for signals the state itself ignores
    pub links: HashMap<SignalId, StateTag>,
}

impl<D: Default> StateBase<D> {
    pub fn new() -> Self {
        Self {
            data: D::default(),
            links: HashMap::new(),
        }
    }
}

/// A unit of tool behavior.
///
/// Every hook has an empty default. `transition_out` is where a state
/// hands its scratch data forward to the next state of the same gesture.
pub trait State<D> {
    fn tag(&self) -> StateTag;

    fn base(&self) -> &StateBase<D>;

    fn base_mut(&mut self) -> &mut StateBase<D>;

    /// Called after the previous state (if any) was exited.
    fn transition_in(&mut self, _prev: Option<StateTag>, _ctx: &mut ToolContext<'_>) {}

    /// Called before `next` is entered.
    fn transition_out(&mut self, _next: &mut dyn State<D>, _ctx: &mut ToolContext<'_>) {}

    /// Called once per frame while current.
    fn update(&mut self, _dt: f32, _ctx: &mut ToolContext<'_>) -> StateReply {
        StateReply::None
    }

    /// Called once per signal while current.
    fn signaled(&mut self, _signal: SignalId, _ctx: &mut ToolContext<'_>) -> StateReply {
        StateReply::None
    }

    /// Add a fallback transition.
    fn link(&mut self, signal: SignalId, target: StateTag) {
        self.base_mut().links.insert(signal, target);
    }
}
