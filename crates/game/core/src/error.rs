//! Common error infrastructure for game-core.
//!
//! Domain-specific errors (`PoolError`, `ModifyError`, `StrategyError`,
//! `WorldError`) live next to the code that raises them and implement
//! [`GameError`] so callers can classify them uniformly.
//!
//! # Design Principles
//!
//! - **Type Safety**: each subsystem has its own error enum
//! - **Never fatal inside a tick**: strategy failures are contained per entity
//! - **Severity Classification**: errors are categorized for logging priority

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: lookups that missed; the caller continues with a no-op
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: unexpected state inconsistencies that require investigation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error, safe to ignore after logging.
    ///
    /// Examples: untracked pool handle, despawn of a vanished entity
    Recoverable,

    /// Validation error, invalid input.
    ///
    /// Examples: read-only descriptor field, occupied grid cell
    Validation,

    /// Internal error, a bug in machine configuration or bookkeeping.
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for all game-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

impl GameError for state_machine::FsmError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownState(_) => "FSM_UNKNOWN_STATE",
            Self::DuplicateTransition { .. } => "FSM_DUPLICATE_TRANSITION",
        }
    }
}
