//! Selection and cursor modes.

use super::{linked, Mod, ModId};
use crate::context::ToolContext;
use crate::core::{SignalId, SignalRegistry};
use crate::state::{StateMachine, StateTag, ToolEvent};
use crate::states::{BeginBoxPick, BeginPick, DeletePick, Duplicate, EndPick, PickScratch};

fn back_to_start(machine: &mut StateMachine<PickScratch>, ctx: &mut ToolContext<'_>) {
    let signal = ctx.signals.editor().back_to_start;
    machine.signal(signal, ctx);
}

// ============================================================================
// Select
// ============================================================================

/// Click and box selection, delete and duplicate.
#[derive(Default)]
pub struct SelectMod {
    machine: StateMachine<PickScratch>,
}

impl SelectMod {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Mod for SelectMod {
    fn id(&self) -> ModId {
        ModId::Select
    }

    fn init(&mut self, signals: &SignalRegistry) {
        let sig = signals.editor();
        let back = [(sig.back_to_start, StateTag::BEGIN_PICK)];

        self.machine
            .push_state(linked(BeginPick::new(), &[(sig.duplicate, StateTag::DUPLICATE)]));
        self.machine.push_state(Box::new(BeginBoxPick::new()));
        self.machine.push_state(linked(EndPick::new(), &back));
        self.machine.push_state(linked(DeletePick::new(), &back));
        self.machine.push_state(linked(Duplicate::new(), &back));
        self.machine.set_current(StateTag::BEGIN_PICK);
    }

    fn update(&mut self, dt: f32, ctx: &mut ToolContext<'_>) {
        match self.machine.update(dt, ctx) {
            Some(ToolEvent::Picked(picks)) => {
                let ids: Vec<_> = picks.iter().filter_map(|p| p.entity).collect();
                ctx.scene.add_to_selection(&ids, ctx.modifiers.additive());
                back_to_start(&mut self.machine, ctx);
            }
            Some(_) => back_to_start(&mut self.machine, ctx),
            None => {}
        }
    }

    fn signal(&mut self, signal: SignalId, ctx: &mut ToolContext<'_>) {
        self.machine.signal(signal, ctx);
    }

    fn current_state(&self) -> Option<StateTag> {
        self.machine.current()
    }
}

// ============================================================================
// Cursor
// ============================================================================

/// Places the 3D cursor where the user clicks.
#[derive(Default)]
pub struct CursorMod {
    machine: StateMachine<PickScratch>,
}

impl CursorMod {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Mod for CursorMod {
    fn id(&self) -> ModId {
        ModId::Cursor
    }

    fn init(&mut self, signals: &SignalRegistry) {
        let sig = signals.editor();
        self.machine.push_state(Box::new(BeginPick::new()));
        self.machine
            .push_state(linked(EndPick::new(), &[(sig.back_to_start, StateTag::BEGIN_PICK)]));
        self.machine.set_current(StateTag::BEGIN_PICK);
    }

    fn update(&mut self, dt: f32, ctx: &mut ToolContext<'_>) {
        if let Some(event) = self.machine.update(dt, ctx) {
            if let ToolEvent::Picked(picks) = event {
                if let Some(last) = picks.last() {
                    ctx.scene.set_cursor(last.pick_pos);
                }
            }
            back_to_start(&mut self.machine, ctx);
        }
    }

    fn signal(&mut self, signal: SignalId, ctx: &mut ToolContext<'_>) {
        self.machine.signal(signal, ctx);
    }

    fn current_state(&self) -> Option<StateTag> {
        self.machine.current()
    }
}
