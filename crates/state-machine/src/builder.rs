//! Builder utilities for machine construction.
//!
//! States are registered first, then each state's outgoing transitions are
//! declared through a [`StateConfigurer`]:
//!
//! ```
//! use state_machine::{FnHooks, FsmBuilder};
//!
//! #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
//! enum Input { #[default] Calm, Alert }
//!
//! let mut builder: FsmBuilder<Input, FnHooks<Input, ()>> = FsmBuilder::new();
//! let idle = builder.state("Idle", FnHooks::new());
//! let alert = builder.state("Alert", FnHooks::new());
//! builder.configure(idle).transition(Input::Alert, alert).done().unwrap();
//! builder.configure(alert).transition(Input::Calm, idle).done().unwrap();
//!
//! let mut fsm = builder.build(idle, &mut ()).unwrap();
//! assert!(fsm.send_input(Input::Alert, &mut ()));
//! assert_eq!(fsm.current_name(), "Alert");
//! ```

use std::fmt::Debug;
use std::hash::Hash;

use crate::{EventFsm, FsmError, NoEffect, State, StateHooks, StateId, Transition};

/// Collects states and transitions before the machine is started.
pub struct FsmBuilder<I, H, T = NoEffect> {
    states: Vec<State<I, H, T>>,
}

impl<I: Eq + Hash, H, T> Default for FsmBuilder<I, H, T> {
    fn default() -> Self {
        Self { states: Vec::new() }
    }
}

impl<I: Eq + Hash, H, T> FsmBuilder<I, H, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a state and returns its handle.
    pub fn state(&mut self, name: impl Into<String>, hooks: H) -> StateId {
        let id = StateId(self.states.len());
        self.states.push(State::new(name.into(), hooks));
        id
    }

    /// Starts declaring the outgoing transitions of `state`.
    pub fn configure(&mut self, state: StateId) -> StateConfigurer<'_, I, H, T> {
        StateConfigurer {
            builder: self,
            state,
            pending: Vec::new(),
        }
    }

    /// Starts the machine in `initial`.
    ///
    /// The initial state's enter hook fires immediately with `I::default()`.
    pub fn build<C: ?Sized>(
        self,
        initial: StateId,
        ctx: &mut C,
    ) -> Result<EventFsm<I, H, T>, FsmError>
    where
        I: Default,
        H: StateHooks<I, C>,
    {
        if initial.0 >= self.states.len() {
            return Err(FsmError::UnknownState(initial));
        }
        let fsm = EventFsm::from_parts(self.states, initial);
        fsm.current_state().hooks.enter(ctx, &I::default());
        Ok(fsm)
    }

    fn contains(&self, id: StateId) -> bool {
        id.0 < self.states.len()
    }
}

/// Fluent transition declaration for one state.
///
/// Nothing is committed until [`done`](StateConfigurer::done) validates the
/// whole batch.
pub struct StateConfigurer<'b, I, H, T> {
    builder: &'b mut FsmBuilder<I, H, T>,
    state: StateId,
    pending: Vec<(I, Transition<T>)>,
}

impl<I: Eq + Hash + Debug, H, T> StateConfigurer<'_, I, H, T> {
    /// Declares `input -> target` without a side effect.
    pub fn transition(mut self, input: I, target: StateId) -> Self {
        self.pending.push((
            input,
            Transition {
                target,
                effect: None,
            },
        ));
        self
    }

    /// Declares `input -> target` firing `effect` on every traversal.
    pub fn transition_with(mut self, input: I, target: StateId, effect: T) -> Self {
        self.pending.push((
            input,
            Transition {
                target,
                effect: Some(effect),
            },
        ));
        self
    }

    /// Validates and commits the declared transitions.
    ///
    /// Fails if the configured state or any target is unknown, or if an input
    /// would map to two destinations.
    pub fn done(self) -> Result<(), FsmError> {
        let Self {
            builder,
            state,
            pending,
        } = self;

        if !builder.contains(state) {
            return Err(FsmError::UnknownState(state));
        }
        for (index, (input, transition)) in pending.iter().enumerate() {
            if !builder.contains(transition.target) {
                return Err(FsmError::UnknownState(transition.target));
            }
            let repeated = pending[..index].iter().any(|(seen, _)| seen == input);
            if repeated || builder.states[state.0].transitions.contains_key(input) {
                return Err(FsmError::DuplicateTransition {
                    state: builder.states[state.0].name.clone(),
                    input: format!("{input:?}"),
                });
            }
        }

        let transitions = &mut builder.states[state.0].transitions;
        for (input, transition) in pending {
            transitions.insert(input, transition);
        }
        Ok(())
    }
}
