//! Permanent base mode.

use super::{Mod, ModId};
use crate::context::ToolContext;
use crate::core::SignalId;
use crate::state::{StateMachine, StateTag};

/// Bottom of the mode stack. Its machine has no states, so it ignores
/// every tick and signal.
#[derive(Default)]
pub struct BaseMod {
    machine: StateMachine<()>,
}

impl BaseMod {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Mod for BaseMod {
    fn id(&self) -> ModId {
        ModId::Base
    }

    fn update(&mut self, dt: f32, ctx: &mut ToolContext<'_>) {
        self.machine.update(dt, ctx);
    }

    fn signal(&mut self, signal: SignalId, ctx: &mut ToolContext<'_>) {
        self.machine.signal(signal, ctx);
    }

    fn current_state(&self) -> Option<StateTag> {
        self.machine.current()
    }
}
