//! Per-state behavior objects.
//!
//! A [`Strategy`] is bound to one state of an entity's machine and receives
//! that state's enter/update/exit hooks. Strategies are stateless: everything
//! they track lives on the entity, so one instance can be shared by every
//! entity of a family.

mod enemy;
mod tower;

use std::collections::HashMap;
use std::sync::Arc;

pub use enemy::{EnemyAttack, EnemyWalking};
pub use tower::{ArrowAttack, ArrowIdle};

use crate::descriptor::DescriptorField;
use crate::entity::{EnemyBody, TickContext, TowerBody};
use crate::error::{ErrorSeverity, GameError};
use crate::types::TowerTypeId;

pub type StrategyResult = Result<(), StrategyError>;

/// Failure raised by a strategy hook. Contained and logged per entity.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum StrategyError {
    #[error("{field} must not be negative (got {value})")]
    NegativeStat { field: DescriptorField, value: i32 },

    #[error("strategy '{strategy}' failed: {reason}")]
    Failed {
        strategy: &'static str,
        reason: String,
    },
}

impl GameError for StrategyError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NegativeStat { .. } => ErrorSeverity::Validation,
            Self::Failed { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NegativeStat { .. } => "STRATEGY_NEGATIVE_STAT",
            Self::Failed { .. } => "STRATEGY_FAILED",
        }
    }
}

/// Behavior bound to one state of an entity of type `E`.
pub trait Strategy<E>: Send + Sync {
    fn name(&self) -> &'static str;

    fn on_enter(&self, _entity: &mut E, _cx: &mut TickContext<'_>) -> StrategyResult {
        Ok(())
    }

    fn on_update(&self, _entity: &mut E, _cx: &mut TickContext<'_>) -> StrategyResult {
        Ok(())
    }

    fn on_exit(&self, _entity: &mut E, _cx: &mut TickContext<'_>) -> StrategyResult {
        Ok(())
    }
}

/// The idle and active strategies assigned to one entity.
pub struct StrategyPair<E> {
    pub idle: Arc<dyn Strategy<E>>,
    pub active: Arc<dyn Strategy<E>>,
}

impl<E> StrategyPair<E> {
    pub fn new(idle: Arc<dyn Strategy<E>>, active: Arc<dyn Strategy<E>>) -> Self {
        Self { idle, active }
    }

    pub fn names(&self) -> (&'static str, &'static str) {
        (self.idle.name(), self.active.name())
    }
}

impl<E> Clone for StrategyPair<E> {
    fn clone(&self) -> Self {
        Self {
            idle: Arc::clone(&self.idle),
            active: Arc::clone(&self.active),
        }
    }
}

impl StrategyPair<TowerBody> {
    pub fn arrow() -> Self {
        Self::new(Arc::new(ArrowIdle), Arc::new(ArrowAttack))
    }
}

impl StrategyPair<EnemyBody> {
    pub fn melee() -> Self {
        Self::new(Arc::new(EnemyWalking), Arc::new(EnemyAttack))
    }
}

/// Strategy pairs by tower family, with a fallback for unregistered ones.
#[derive(Clone)]
pub struct StrategyLibrary {
    towers: HashMap<TowerTypeId, StrategyPair<TowerBody>>,
    default_tower: StrategyPair<TowerBody>,
    enemy: StrategyPair<EnemyBody>,
}

impl Default for StrategyLibrary {
    fn default() -> Self {
        Self {
            towers: HashMap::new(),
            default_tower: StrategyPair::arrow(),
            enemy: StrategyPair::melee(),
        }
    }
}

impl StrategyLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_tower(&mut self, type_id: TowerTypeId, pair: StrategyPair<TowerBody>) {
        self.towers.insert(type_id, pair);
    }

    pub fn set_enemy(&mut self, pair: StrategyPair<EnemyBody>) {
        self.enemy = pair;
    }

    pub fn tower(&self, type_id: TowerTypeId) -> StrategyPair<TowerBody> {
        self.towers
            .get(&type_id)
            .unwrap_or(&self.default_tower)
            .clone()
    }

    pub fn enemy(&self) -> StrategyPair<EnemyBody> {
        self.enemy.clone()
    }
}

/// Rejects negative descriptor stats before they are turned into distances.
pub(crate) fn non_negative(field: DescriptorField, value: i32) -> Result<i32, StrategyError> {
    if value < 0 {
        Err(StrategyError::NegativeStat { field, value })
    } else {
        Ok(value)
    }
}
