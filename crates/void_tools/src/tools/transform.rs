//! Move, rotate, scale and anchor modes.

use super::{linked, Mod, ModId};
use crate::context::ToolContext;
use crate::core::{SignalId, SignalRegistry};
use crate::state::{StateMachine, StateTag};
use crate::states::{Duplicate, TransformBegin, TransformEnd, TransformKind, TransformScratch, TransformTo};

/// Drag the selection. One mode type covers every [`TransformKind`].
pub struct TransformMod {
    kind: TransformKind,
    machine: StateMachine<TransformScratch>,
}

impl TransformMod {
    pub fn new(kind: TransformKind) -> Self {
        Self {
            kind,
            machine: StateMachine::new(),
        }
    }

    pub fn kind(&self) -> TransformKind {
        self.kind
    }
}

impl Mod for TransformMod {
    fn id(&self) -> ModId {
        match self.kind {
            TransformKind::Move => ModId::Move,
            TransformKind::Rotate => ModId::Rotate,
            TransformKind::Scale => ModId::Scale,
            TransformKind::Anchor => ModId::Anchor,
        }
    }

    fn init(&mut self, signals: &SignalRegistry) {
        let sig = signals.editor();
        let [begin, _, _] = self.kind.tags();
        let back = [(sig.back_to_start, begin)];

        // Anchors only move layout, so they have no duplicate branch.
        if self.kind == TransformKind::Anchor {
            self.machine.push_state(Box::new(TransformBegin::new(self.kind)));
        } else {
            self.machine.push_state(linked(
                TransformBegin::new(self.kind),
                &[(sig.duplicate, StateTag::DUPLICATE)],
            ));
            self.machine.push_state(linked(Duplicate::new(), &back));
        }
        self.machine.push_state(Box::new(TransformTo::new(self.kind)));
        self.machine.push_state(linked(TransformEnd::new(self.kind), &back));
        self.machine.set_current(begin);
    }

    fn update(&mut self, dt: f32, ctx: &mut ToolContext<'_>) {
        // Both committed drags and duplicates return to the start state.
        if self.machine.update(dt, ctx).is_some() {
            let signal = ctx.signals.editor().back_to_start;
            self.machine.signal(signal, ctx);
        }
    }

    fn signal(&mut self, signal: SignalId, ctx: &mut ToolContext<'_>) {
        self.machine.signal(signal, ctx);
    }

    fn current_state(&self) -> Option<StateTag> {
        self.machine.current()
    }
}
