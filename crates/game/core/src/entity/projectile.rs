use crate::config::ProjectileConfig;
use crate::descriptor::Visual;
use crate::entity::command::Command;
use crate::entity::context::TickContext;
use crate::types::{EntityId, Vec2};

/// A homing shot fired by a tower.
///
/// Projectiles have no machine: each tick they home in on their target, hit
/// it once within `hit_radius`, and despawn when it is gone.
#[derive(Clone, Debug, Default)]
pub struct Projectile {
    id: EntityId,
    source: EntityId,
    target: EntityId,
    position: Vec2,
    damage: i32,
    speed: f32,
    hit_radius: f32,
    visual: Visual,
}

impl Projectile {
    /// Shot with default ballistics.
    pub fn new(
        id: EntityId,
        source: EntityId,
        target: EntityId,
        position: Vec2,
        damage: i32,
        visual: Visual,
    ) -> Self {
        let ballistics = ProjectileConfig::default();
        Self {
            id,
            source,
            target,
            position,
            damage,
            speed: ballistics.speed,
            hit_radius: ballistics.hit_radius,
            visual,
        }
    }

    pub fn with_ballistics(mut self, ballistics: &ProjectileConfig) -> Self {
        self.speed = ballistics.speed;
        self.hit_radius = ballistics.hit_radius;
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn target(&self) -> EntityId {
        self.target
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn damage(&self) -> i32 {
        self.damage
    }

    pub fn visual(&self) -> &Visual {
        &self.visual
    }

    pub fn tick(&mut self, cx: &mut TickContext<'_>) {
        let Some(target) = cx.physics.locate(self.target) else {
            cx.emit(Command::Despawn(self.id));
            return;
        };

        let offset = target.position - self.position;
        let distance = offset.length();
        let step = self.speed * cx.time.delta;
        self.position = if distance <= step {
            target.position
        } else {
            self.position + offset / distance * step
        };

        if self.position.distance(target.position) < self.hit_radius {
            cx.emit(Command::Damage {
                source: self.source,
                target: self.target,
                amount: self.damage,
            });
            cx.emit(Command::Despawn(self.id));
        }
    }
}
