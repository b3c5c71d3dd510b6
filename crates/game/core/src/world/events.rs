use crate::types::{EntityId, EntityKind, FrameTime, Vec2};

/// Why an entity left the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum DespawnReason {
    /// Health depleted.
    Destroyed,
    /// Enemy crossed the base line.
    ReachedBase,
    /// Projectile hit its target or lost it.
    Spent,
    /// Removed on request.
    Removed,
}

/// Observable outcome of a world mutation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WorldEvent {
    Spawned {
        id: EntityId,
        kind: EntityKind,
        position: Vec2,
    },
    Damaged {
        id: EntityId,
        kind: EntityKind,
        amount: i32,
        health: i32,
    },
    Despawned {
        id: EntityId,
        kind: EntityKind,
        reason: DespawnReason,
    },
}

impl WorldEvent {
    pub fn entity(&self) -> EntityId {
        match self {
            Self::Spawned { id, .. } | Self::Damaged { id, .. } | Self::Despawned { id, .. } => *id,
        }
    }
}

/// Summary of one [`World::tick`](super::World::tick).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub time: FrameTime,
    /// Commands applied after every entity ran.
    pub commands_applied: usize,
    /// Events raised since the previous report, in order.
    pub events: Vec<WorldEvent>,
}
