//! States and transitions.

use std::collections::HashMap;
use std::hash::Hash;

/// Index of a state inside the machine that registered it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub(crate) usize);

impl StateId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Outgoing edge: destination plus an optional side effect.
#[derive(Debug)]
pub struct Transition<T> {
    pub(crate) target: StateId,
    pub(crate) effect: Option<T>,
}

impl<T> Transition<T> {
    pub fn target(&self) -> StateId {
        self.target
    }

    pub fn effect(&self) -> Option<&T> {
        self.effect.as_ref()
    }
}

/// Named node carrying its hook set and outgoing transitions.
pub struct State<I, H, T> {
    pub(crate) name: String,
    pub(crate) hooks: H,
    pub(crate) transitions: HashMap<I, Transition<T>>,
}

impl<I: Eq + Hash, H, T> State<I, H, T> {
    pub(crate) fn new(name: String, hooks: H) -> Self {
        Self {
            name,
            hooks,
            transitions: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Looks up the transition taken on `input`, if any.
    pub fn transition(&self, input: &I) -> Option<&Transition<T>> {
        self.transitions.get(input)
    }
}
