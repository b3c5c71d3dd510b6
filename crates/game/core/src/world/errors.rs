use state_machine::FsmError;

use crate::error::{ErrorSeverity, GameError};
use crate::grid::Cell;
use crate::types::{PrefabId, Vec2};

/// Reasons a spawn request is refused.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum WorldError {
    #[error("no grid cell at world position {0}")]
    NoCell(Vec2),

    #[error("cell {0} is outside the grid")]
    CellOutOfBounds(Cell),

    #[error("cell {0} is already occupied")]
    CellOccupied(Cell),

    #[error("no pool registered for prefab '{0}'")]
    UnknownPrefab(PrefabId),

    #[error("failed to start entity behavior: {0}")]
    Fsm(#[from] FsmError),
}

impl GameError for WorldError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NoCell(_) | Self::CellOutOfBounds(_) | Self::CellOccupied(_) => {
                ErrorSeverity::Validation
            }
            Self::UnknownPrefab(_) => ErrorSeverity::Recoverable,
            Self::Fsm(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoCell(_) => "WORLD_NO_CELL",
            Self::CellOutOfBounds(_) => "WORLD_CELL_OUT_OF_BOUNDS",
            Self::CellOccupied(_) => "WORLD_CELL_OCCUPIED",
            Self::UnknownPrefab(_) => "WORLD_UNKNOWN_PREFAB",
            Self::Fsm(_) => "WORLD_FSM",
        }
    }
}
