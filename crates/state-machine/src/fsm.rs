//! The running machine.

use std::hash::Hash;

use crate::{State, StateHooks, StateId, TransitionHook};

/// Event-driven finite state machine.
///
/// Generic over the input symbol `I`, the per-state hook set `H` and the
/// transition effect `T`. Built through [`FsmBuilder`](crate::FsmBuilder).
pub struct EventFsm<I, H, T = crate::NoEffect> {
    states: Vec<State<I, H, T>>,
    current: StateId,
}

impl<I: Eq + Hash, H, T> EventFsm<I, H, T> {
    pub(crate) fn from_parts(states: Vec<State<I, H, T>>, initial: StateId) -> Self {
        Self {
            states,
            current: initial,
        }
    }

    #[inline]
    pub fn current(&self) -> StateId {
        self.current
    }

    pub fn current_name(&self) -> &str {
        &self.current_state().name
    }

    pub fn current_state(&self) -> &State<I, H, T> {
        &self.states[self.current.0]
    }

    pub fn state(&self, id: StateId) -> Option<&State<I, H, T>> {
        self.states.get(id.0)
    }

    /// Returns true if the current state reacts to `input`.
    pub fn has_transition(&self, input: &I) -> bool {
        self.current_state().transitions.contains_key(input)
    }

    /// Feeds an input symbol into the machine.
    ///
    /// When the current state has a transition for `input`, fires in order:
    /// the current state's exit hook, the transition effect, then the target
    /// state's enter hook. Returns `false` and fires nothing otherwise.
    pub fn send_input<C: ?Sized>(&mut self, input: I, ctx: &mut C) -> bool
    where
        H: StateHooks<I, C>,
        T: TransitionHook<I, C>,
    {
        let source = &self.states[self.current.0];
        let Some(transition) = source.transitions.get(&input) else {
            return false;
        };
        let target = transition.target;

        source.hooks.exit(ctx, &input);
        if let Some(effect) = &transition.effect {
            effect.fire(ctx, &input);
        }
        self.current = target;
        self.states[target.0].hooks.enter(ctx, &input);
        true
    }

    /// Forwards to the current state's update hook.
    #[inline]
    pub fn tick<C: ?Sized>(&self, ctx: &mut C)
    where
        H: StateHooks<I, C>,
    {
        self.current_state().hooks.update(ctx);
    }

    /// Forwards to the current state's late update hook.
    #[inline]
    pub fn late_tick<C: ?Sized>(&self, ctx: &mut C)
    where
        H: StateHooks<I, C>,
    {
        self.current_state().hooks.late_update(ctx);
    }

    /// Forwards to the current state's fixed update hook.
    #[inline]
    pub fn fixed_tick<C: ?Sized>(&self, ctx: &mut C)
    where
        H: StateHooks<I, C>,
    {
        self.current_state().hooks.fixed_update(ctx);
    }
}
