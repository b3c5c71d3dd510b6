use crate::config::EnemyProfile;
use crate::entity::actor::Actor;
use crate::entity::agent::{Agent, EnemyAgent, EnemyInput};
use crate::types::{EntityId, PrefabId, Vec2};

/// An enemy walking toward the main base.
pub type Enemy = Actor<EnemyBody>;

#[derive(Clone, Debug)]
pub struct EnemyBody {
    id: EntityId,
    prefab: PrefabId,
    profile: EnemyProfile,
    position: Vec2,
    health: i32,
    target: Option<EntityId>,
    target_position: Vec2,
    last_attack: f32,
    pending: Option<EnemyInput>,
}

impl Default for EnemyBody {
    fn default() -> Self {
        Self::new(
            EntityId::default(),
            PrefabId::new(""),
            EnemyProfile::default(),
            Vec2::ZERO,
        )
    }
}

impl EnemyBody {
    /// Fresh enemy at full health.
    pub fn new(id: EntityId, prefab: PrefabId, profile: EnemyProfile, position: Vec2) -> Self {
        Self {
            id,
            prefab,
            health: profile.initial_hp,
            profile,
            position,
            target: None,
            target_position: Vec2::ZERO,
            last_attack: 0.0,
            pending: None,
        }
    }

    pub fn prefab(&self) -> &PrefabId {
        &self.prefab
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    /// Applies damage; returns true once health is depleted.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.health -= amount;
        self.health <= 0
    }
}

impl Agent for EnemyBody {
    type Input = EnemyInput;

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

    fn request_transition(&mut self, input: EnemyInput) {
        self.pending = Some(input);
    }

    fn take_transition(&mut self) -> Option<EnemyInput> {
        self.pending.take()
    }
}

impl EnemyAgent for EnemyBody {
    fn profile(&self) -> &EnemyProfile {
        &self.profile
    }

    fn target_position(&self) -> Vec2 {
        self.target_position
    }

    fn set_target_position(&mut self, position: Vec2) {
        self.target_position = position;
    }

    fn last_attack(&self) -> f32 {
        self.last_attack
    }

    fn set_last_attack(&mut self, time: f32) {
        self.last_attack = time;
    }
}
