use std::sync::Arc;

use crate::descriptor::TowerDescriptor;
use crate::entity::actor::Actor;
use crate::entity::agent::{Agent, TowerAgent, TowerInput};
use crate::grid::Cell;
use crate::types::{EntityId, Vec2};

/// A tower placed on the grid.
pub type Tower = Actor<TowerBody>;

/// Per-instance tower state. Shared stats live in the descriptor.
#[derive(Clone, Debug, Default)]
pub struct TowerBody {
    id: EntityId,
    cell: Cell,
    position: Vec2,
    health: i32,
    descriptor: Arc<TowerDescriptor>,
    target: Option<EntityId>,
    last_fire: f32,
    pending: Option<TowerInput>,
}

impl TowerBody {
    /// Fresh tower at full health.
    pub fn new(id: EntityId, cell: Cell, position: Vec2, descriptor: Arc<TowerDescriptor>) -> Self {
        Self {
            id,
            cell,
            position,
            health: descriptor.initial_hp,
            descriptor,
            target: None,
            last_fire: 0.0,
            pending: None,
        }
    }

    pub fn cell(&self) -> Cell {
        self.cell
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn shared_descriptor(&self) -> &Arc<TowerDescriptor> {
        &self.descriptor
    }

    /// Swaps in an updated descriptor. Current health is kept.
    pub fn set_descriptor(&mut self, descriptor: Arc<TowerDescriptor>) {
        self.descriptor = descriptor;
    }

    /// Applies damage; returns true once health is depleted.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.health -= amount;
        self.health <= 0
    }
}

impl Agent for TowerBody {
    type Input = TowerInput;

    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn target(&self) -> Option<EntityId> {
        self.target
    }

    fn set_target(&mut self, target: Option<EntityId>) {
        self.target = target;
    }

    fn request_transition(&mut self, input: TowerInput) {
        self.pending = Some(input);
    }

    fn take_transition(&mut self) -> Option<TowerInput> {
        self.pending.take()
    }
}

impl TowerAgent for TowerBody {
    fn descriptor(&self) -> &TowerDescriptor {
        &self.descriptor
    }

    fn last_fire(&self) -> f32 {
        self.last_fire
    }

    fn set_last_fire(&mut self, time: f32) {
        self.last_fire = time;
    }
}
