//! State machine dispatch.

use std::collections::HashMap;

use super::{State, StateReply, StateTag, ToolEvent};
use crate::context::ToolContext;
use crate::core::SignalId;

/// Owns uniquely tagged states and tracks the current one.
///
/// The initial state set with [`StateMachine::set_current`] is entered
/// lazily, on the first tick or signal.
pub struct StateMachine<D> {
    states: HashMap<StateTag, Box<dyn State<D>>>,
    current: Option<StateTag>,
    entered: bool,
}

impl<D> Default for StateMachine<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> StateMachine<D> {
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
            current: None,
            entered: false,
        }
    }

    /// Register a state.
    ///
    /// # Panics
    ///
    /// Panics if a state with the same tag is already registered.
    pub fn push_state(&mut self, state: Box<dyn State<D>>) {
        let tag = state.tag();
        assert!(
            !self.states.contains_key(&tag),
            "state {} registered twice in one machine",
            tag
        );
        self.states.insert(tag, state);
    }

    /// Make a registered state current without running any hooks.
    ///
    /// # Panics
    ///
    /// Panics if no state with `tag` is registered.
    pub fn set_current(&mut self, tag: StateTag) {
        assert!(self.states.contains_key(&tag), "state {} is not registered", tag);
        self.current = Some(tag);
        self.entered = false;
    }

    pub fn current(&self) -> Option<StateTag> {
        self.current
    }

    pub fn current_state(&self) -> Option<&dyn State<D>> {
        self.current.and_then(|tag| self.get(tag))
    }

    pub fn get(&self, tag: StateTag) -> Option<&dyn State<D>> {
        self.states.get(&tag).map(|s| s.as_ref())
    }

    pub fn contains(&self, tag: StateTag) -> bool {
        self.states.contains_key(&tag)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Tick the current state.
    pub fn update(&mut self, dt: f32, ctx: &mut ToolContext<'_>) -> Option<ToolEvent> {
        let current = self.enter_current(ctx)?;
        let reply = self.states.get_mut(&current)?.update(dt, ctx);
        self.resolve(current, reply, None, ctx)
    }

    /// Deliver a signal to the current state.
    ///
    /// When the state produces no transition its link table is consulted.
    /// Targets that do not resolve to a registered state are ignored.
    pub fn signal(&mut self, signal: SignalId, ctx: &mut ToolContext<'_>) -> Option<ToolEvent> {
        let current = self.enter_current(ctx)?;
        let reply = self.states.get_mut(&current)?.signaled(signal, ctx);
        self.resolve(current, reply, Some(signal), ctx)
    }

    fn enter_current(&mut self, ctx: &mut ToolContext<'_>) -> Option<StateTag> {
        let current = self.current?;
        if !self.entered {
            self.entered = true;
            if let Some(state) = self.states.get_mut(&current) {
                state.transition_in(None, ctx);
            }
        }
        Some(current)
    }

    fn resolve(
        &mut self,
        current: StateTag,
        reply: StateReply,
        signal: Option<SignalId>,
        ctx: &mut ToolContext<'_>,
    ) -> Option<ToolEvent> {
        // An event reply still follows the signal's link.
        let (event, target) = match reply {
            StateReply::Transition(tag) => (None, Some(tag)),
            StateReply::Event(event) => (Some(event), self.linked(current, signal)),
            StateReply::None => (None, self.linked(current, signal)),
        };

        if let Some(target) = target {
            self.transition(current, target, ctx);
        }
        event
    }

    fn linked(&self, current: StateTag, signal: Option<SignalId>) -> Option<StateTag> {
        let signal = signal?;
        self.states
            .get(&current)
            .and_then(|state| state.base().links.get(&signal).copied())
    }

    fn transition(&mut self, from: StateTag, to: StateTag, ctx: &mut ToolContext<'_>) {
        if from == to {
            // Re-entry: there is no second instance to hand data to.
            if let Some(state) = self.states.get_mut(&to) {
                state.transition_in(Some(from), ctx);
            }
            return;
        }

        let Some(mut next) = self.states.remove(&to) else {
            log::debug!("Transition target {} is not registered; staying in {}", to, from);
            return;
        };

        if let Some(state) = self.states.get_mut(&from) {
            state.transition_out(next.as_mut(), ctx);
        }
        next.transition_in(Some(from), ctx);
        self.states.insert(to, next);
        self.current = Some(to);

        if ctx.settings.log_state_transitions {
            log::info!("\t{} -> {}", from, to);
        } else {
            log::debug!("{} -> {}", from, to);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionManager;
    use crate::core::{SignalRegistry, ToolSettings};
    use crate::scene::EditorScene;
    use crate::state::StateBase;

    /// Records its hooks into the shared scratch vector.
    struct Recorder {
        tag: StateTag,
        base: StateBase<Vec<String>>,
        reply_to: Option<(SignalId, StateReply)>,
    }

    impl Recorder {
        fn new(tag: StateTag) -> Box<Self> {
            Box::new(Self {
                tag,
                base: StateBase::new(),
                reply_to: None,
            })
        }
    }

    impl State<Vec<String>> for Recorder {
        fn tag(&self) -> StateTag {
            self.tag
        }

        fn base(&self) -> &StateBase<Vec<String>> {
            &self.base
        }

        fn base_mut(&mut self) -> &mut StateBase<Vec<String>> {
            &mut self.base
        }

        fn transition_in(&mut self, prev: Option<StateTag>, _ctx: &mut ToolContext<'_>) {
            let prev = prev.map(|t| t.0).unwrap_or("-");
            self.base.data.push(format!("in {} from {}", self.tag, prev));
        }

        fn transition_out(&mut self, next: &mut dyn State<Vec<String>>, _ctx: &mut ToolContext<'_>) {
            self.base.data.push(format!("out {} to {}", self.tag, next.tag()));
            next.base_mut().data = std::mem::take(&mut self.base.data);
        }

        fn signaled(&mut self, signal: SignalId, _ctx: &mut ToolContext<'_>) -> StateReply {
            match &self.reply_to {
                Some((s, reply)) if *s == signal => reply.clone(),
                _ => StateReply::None,
            }
        }
    }

    const A: StateTag = StateTag("A");
    const B: StateTag = StateTag("B");

    struct Fixture {
        scene: EditorScene,
        actions: ActionManager,
        signals: SignalRegistry,
        settings: ToolSettings,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                scene: EditorScene::new(),
                actions: ActionManager::new(),
                signals: SignalRegistry::new(),
                settings: ToolSettings::default(),
            }
        }

        fn ctx(&mut self) -> ToolContext<'_> {
            ToolContext::new(&mut self.scene, &mut self.actions, &self.signals, &self.settings)
        }
    }

    #[test]
    fn test_link_transition_then_absorb() {
        let mut fx = Fixture::new();
        let sig = fx.signals.editor().left_mouse_down;

        let mut machine = StateMachine::new();
        let mut a = Recorder::new(A);
        a.link(sig, B);
        machine.push_state(a);
        machine.push_state(Recorder::new(B));
        machine.set_current(A);

        machine.signal(sig, &mut fx.ctx());
        assert_eq!(machine.current(), Some(B));

        machine.signal(sig, &mut fx.ctx());
        assert_eq!(machine.current(), Some(B));
    }

    #[test]
    fn test_hooks_run_in_order_and_carry_data() {
        let mut fx = Fixture::new();
        let sig = fx.signals.editor().delete;

        let mut machine = StateMachine::new();
        let mut a = Recorder::new(A);
        a.reply_to = Some((sig, StateReply::Transition(B)));
        machine.push_state(a);
        machine.push_state(Recorder::new(B));
        machine.set_current(A);

        machine.signal(sig, &mut fx.ctx());
        let log = &machine.get(B).unwrap().base().data;
        assert_eq!(log, &vec!["in A from -", "out A to B", "in B from A"]);
    }

    #[test]
    fn test_state_reply_beats_link() {
        let mut fx = Fixture::new();
        let sig = fx.signals.editor().delete;
        let c = StateTag("C");

        let mut machine = StateMachine::new();
        let mut a = Recorder::new(A);
        a.link(sig, B);
        a.reply_to = Some((sig, StateReply::Transition(c)));
        machine.push_state(a);
        machine.push_state(Recorder::new(B));
        machine.push_state(Recorder::new(c));
        machine.set_current(A);

        machine.signal(sig, &mut fx.ctx());
        assert_eq!(machine.current(), Some(c));
    }

    #[test]
    fn test_unknown_target_is_absorbed() {
        let mut fx = Fixture::new();
        let sig = fx.signals.editor().delete;

        let mut machine = StateMachine::new();
        let mut a = Recorder::new(A);
        a.link(sig, StateTag("Missing"));
        machine.push_state(a);
        machine.set_current(A);

        assert_eq!(machine.signal(sig, &mut fx.ctx()), None);
        assert_eq!(machine.current(), Some(A));
    }

    #[test]
    fn test_event_reply_follows_link() {
        let mut fx = Fixture::new();
        let sig = fx.signals.editor().delete;

        let mut machine = StateMachine::new();
        let mut a = Recorder::new(A);
        a.link(sig, B);
        a.reply_to = Some((sig, StateReply::Event(ToolEvent::Deleted(2))));
        machine.push_state(a);
        machine.push_state(Recorder::new(B));
        machine.set_current(A);

        assert_eq!(machine.signal(sig, &mut fx.ctx()), Some(ToolEvent::Deleted(2)));
        assert_eq!(machine.current(), Some(B));
    }

    #[test]
    fn test_event_without_link_stays() {
        let mut fx = Fixture::new();
        let sig = fx.signals.editor().delete;

        let mut machine = StateMachine::new();
        let mut a = Recorder::new(A);
        a.reply_to = Some((sig, StateReply::Event(ToolEvent::Deleted(1))));
        machine.push_state(a);
        machine.push_state(Recorder::new(B));
        machine.set_current(A);

        assert_eq!(machine.signal(sig, &mut fx.ctx()), Some(ToolEvent::Deleted(1)));
        assert_eq!(machine.current(), Some(A));
    }

    #[test]
    fn test_empty_machine_ignores_input() {
        let mut fx = Fixture::new();
        let mut machine: StateMachine<()> = StateMachine::new();
        assert_eq!(machine.update(0.016, &mut fx.ctx()), None);
        assert_eq!(machine.current(), None);
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_duplicate_tag_panics() {
        let mut machine = StateMachine::new();
        machine.push_state(Recorder::new(A));
        machine.push_state(Recorder::new(A));
    }
}
