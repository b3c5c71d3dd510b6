//! Capability traits strategies use to drive an entity.
//!
//! Strategies never see concrete entity types. They are generic over these
//! traits, so the same behavior can govern any entity exposing the
//! capabilities it needs.

use std::fmt::Debug;
use std::hash::Hash;

use crate::config::EnemyProfile;
use crate::descriptor::TowerDescriptor;
use crate::physics::SpatialQuery;
use crate::types::{EntityId, Layers, Vec2};

/// Input alphabet of a two-state (idle / active) behavior machine.
pub trait BehaviorInput: Copy + Eq + Hash + Debug + Default + Send + Sync + 'static {
    /// Input that moves the machine to its idle state.
    const IDLE: Self;
    /// Input that moves the machine to its active state.
    const ACTIVE: Self;

    /// Name of the state this input leads to.
    fn state_name(self) -> &'static str;
}

/// Tower machine inputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
pub enum TowerInput {
    #[default]
    Idle,
    Attack,
}

impl BehaviorInput for TowerInput {
    const IDLE: Self = Self::Idle;
    const ACTIVE: Self = Self::Attack;

    fn state_name(self) -> &'static str {
        match self {
            Self::Idle => "IdleState",
            Self::Attack => "AttackState",
        }
    }
}

/// Enemy machine inputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
pub enum EnemyInput {
    #[default]
    Walking,
    Attack,
}

impl BehaviorInput for EnemyInput {
    const IDLE: Self = Self::Walking;
    const ACTIVE: Self = Self::Attack;

    fn state_name(self) -> &'static str {
        match self {
            Self::Walking => "WalkingState",
            Self::Attack => "AttackState",
        }
    }
}

/// Capabilities shared by every behavior-driven entity.
pub trait Agent: Send {
    type Input: BehaviorInput;

    fn id(&self) -> EntityId;
    fn position(&self) -> Vec2;
    fn set_position(&mut self, position: Vec2);

    /// Weak reference to the current target.
    fn target(&self) -> Option<EntityId>;
    fn set_target(&mut self, target: Option<EntityId>);

    /// Asks the entity's own machine to process `input` once the running hook
    /// returns. A later request in the same hook replaces an earlier one.
    fn request_transition(&mut self, input: Self::Input);

    /// Takes the pending transition request, if any.
    fn take_transition(&mut self) -> Option<Self::Input>;
}

/// Capabilities of a tower: stats come from its shared descriptor.
pub trait TowerAgent: Agent {
    fn descriptor(&self) -> &TowerDescriptor;
    fn last_fire(&self) -> f32;
    fn set_last_fire(&mut self, time: f32);
}

/// Capabilities of an enemy.
pub trait EnemyAgent: Agent {
    fn profile(&self) -> &EnemyProfile;

    /// Position of the tower being approached, remembered at detection time.
    fn target_position(&self) -> Vec2;
    fn set_target_position(&mut self, position: Vec2);

    fn last_attack(&self) -> f32;
    fn set_last_attack(&mut self, time: f32);

    /// Looks for a tower within attack range.
    ///
    /// Binds the first tower found as target and remembers its position;
    /// clears the target when nothing is in range.
    fn scan_for_tower(&mut self, physics: &dyn SpatialQuery) -> bool {
        let range = self.profile().attack_range;
        match physics.overlap_circle(self.position(), range, Layers::TOWER) {
            Some(hit) => {
                self.set_target(Some(hit.id));
                self.set_target_position(hit.position);
                true
            }
            None => {
                self.set_target(None);
                false
            }
        }
    }
}
