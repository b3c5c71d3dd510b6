//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from descriptor loading and world placement so clients can
//! bubble them up with consistent context.
use game_core::{ErrorSeverity, GameError, TowerTypeId, WorldError};
use thiserror::Error;

use crate::flyweight::FlyweightError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Flyweight(#[from] FlyweightError),

    #[error(transparent)]
    World(#[from] WorldError),

    #[error("runtime requires an asset resolver to be configured before building")]
    MissingResolver,

    #[error("card {0} is not in the hand")]
    UnknownCard(TowerTypeId),

    #[error("placement load task failed")]
    LoadTask(#[source] tokio::task::JoinError),
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Flyweight(error) => error.severity(),
            Self::World(error) => error.severity(),
            Self::MissingResolver => ErrorSeverity::Internal,
            Self::UnknownCard(_) => ErrorSeverity::Validation,
            Self::LoadTask(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Flyweight(error) => error.error_code(),
            Self::World(error) => error.error_code(),
            Self::MissingResolver => "RUNTIME_MISSING_RESOLVER",
            Self::UnknownCard(_) => "RUNTIME_UNKNOWN_CARD",
            Self::LoadTask(_) => "RUNTIME_LOAD_TASK",
        }
    }
}
