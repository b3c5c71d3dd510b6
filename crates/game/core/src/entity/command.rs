//! Deferred world mutations emitted during a tick.

use crate::descriptor::Visual;
use crate::types::{EntityId, Vec2};

/// A side effect requested by an entity, applied by the world once every
/// entity of the tick has run.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    SpawnProjectile {
        source: EntityId,
        target: EntityId,
        origin: Vec2,
        damage: i32,
        visual: Visual,
    },
    Damage {
        source: EntityId,
        target: EntityId,
        amount: i32,
    },
    Despawn(EntityId),
}

/// FIFO queue of [`Command`]s.
#[derive(Clone, Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Takes every queued command in submission order.
    pub fn drain(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }
}
