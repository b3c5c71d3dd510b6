use thiserror::Error;

use crate::StateId;

/// Errors raised while configuring a machine.
///
/// A built [`EventFsm`](crate::EventFsm) never fails at runtime; an input
/// without a transition is a no-op, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsmError {
    #[error("state {0:?} is not registered in this machine")]
    UnknownState(StateId),

    #[error("state '{state}' already has a transition for input {input}")]
    DuplicateTransition { state: String, input: String },
}
