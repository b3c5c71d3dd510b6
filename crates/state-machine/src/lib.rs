//! Event-driven finite state machine for per-entity behavior.
//!
//! The machine is driven by discrete input symbols. Each state carries a hook
//! set (enter, update, late update, fixed update, exit) and a table mapping
//! input symbols to outgoing transitions.
//!
//! - **Deterministic lookup**: at most one transition per (state, input)
//! - **No terminal state**: a machine lives as long as its owner
//! - **Context per call**: hooks receive a caller-supplied context, so a hook
//!   set may borrow simulation state that only exists for one tick
//!
//! # Architecture
//!
//! - [`StateHooks`]: lifecycle callbacks of one state
//! - [`TransitionHook`]: optional side effect fired while traversing an edge
//! - [`FsmBuilder`] / [`StateConfigurer`]: construction and validation
//! - [`EventFsm`]: the running machine

pub mod builder;
pub mod error;
pub mod fsm;
pub mod hooks;
pub mod state;

// Re-export core types for ergonomic API
pub use builder::{FsmBuilder, StateConfigurer};
pub use error::FsmError;
pub use fsm::EventFsm;
pub use hooks::{FnEffect, FnHooks, NoEffect, StateHooks, TransitionHook};
pub use state::{State, StateId, Transition};
