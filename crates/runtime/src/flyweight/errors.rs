use game_core::{ErrorSeverity, GameError, ModifyError, TowerTypeId};
use thiserror::Error;

use crate::assets::AssetError;

#[derive(Debug, Error)]
pub enum FlyweightError {
    #[error("failed to load '{key}' for tower type {type_id}")]
    Asset {
        type_id: TowerTypeId,
        key: String,
        #[source]
        source: AssetError,
    },

    #[error("tower type {0} is not cached")]
    UnknownType(TowerTypeId),

    #[error("cannot modify tower type {type_id}")]
    Modify {
        type_id: TowerTypeId,
        #[source]
        source: ModifyError,
    },

    #[error("descriptor build task failed")]
    Task(#[source] tokio::task::JoinError),
}

impl GameError for FlyweightError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Asset { .. } | Self::UnknownType(_) => ErrorSeverity::Recoverable,
            Self::Modify { .. } => ErrorSeverity::Validation,
            Self::Task(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Asset { .. } => "FLYWEIGHT_ASSET",
            Self::UnknownType(_) => "FLYWEIGHT_UNKNOWN_TYPE",
            Self::Modify { .. } => "FLYWEIGHT_MODIFY",
            Self::Task(_) => "FLYWEIGHT_TASK",
        }
    }
}
