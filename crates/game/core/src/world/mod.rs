//! The simulation world: pooled entities, the placement grid and the tick.
//!
//! [`World`] owns every tower, enemy and projectile through per-prefab pools
//! and drives them in a fixed order each frame:
//!
//! 1. Rebuild the physics snapshot from live towers and enemies.
//! 2. Tick towers, then enemies.
//! 3. Rebuild the snapshot and tick projectiles.
//! 4. Apply the commands emitted by all of the above, in submission order.
//! 5. Remove enemies that crossed the base line.
//!
//! Entities never mutate each other directly. Everything they affect outside
//! themselves goes through a [`Command`], so one entity's tick never observes
//! another's half-applied update.

mod errors;
mod events;

pub use errors::WorldError;
pub use events::{DespawnReason, TickReport, WorldEvent};

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::config::{EnemyProfile, GameConfig};
use crate::descriptor::{TowerDescriptor, Visual};
use crate::entity::{
    Agent, Command, CommandBuffer, Enemy, EnemyBody, Projectile, TickContext, Tower, TowerBody,
};
use crate::grid::{Cell, Grid};
use crate::physics::{Collider, PhysicsSnapshot};
use crate::pool::{PoolRegistry, Pooled};
use crate::strategy::StrategyPair;
use crate::types::{EntityId, EntityKind, FrameTime, Layers, PrefabId, Vec2};

/// Prefab name of the tower pool.
pub const TOWER_PREFAB: &str = "tower";
/// Prefab name of the projectile pool.
pub const PROJECTILE_PREFAB: &str = "projectile";

#[derive(Clone, Debug)]
struct EntityRef {
    kind: EntityKind,
    pooled: Pooled,
}

pub struct World {
    config: GameConfig,
    grid: Grid,
    clock: f32,
    next_id: u32,
    tower_prefab: PrefabId,
    projectile_prefab: PrefabId,
    enemy_profiles: BTreeMap<PrefabId, EnemyProfile>,
    towers: PoolRegistry<Tower>,
    enemies: PoolRegistry<Enemy>,
    projectiles: PoolRegistry<Projectile>,
    index: HashMap<EntityId, EntityRef>,
    physics: PhysicsSnapshot,
    commands: CommandBuffer,
    events: Vec<WorldEvent>,
}

impl World {
    /// Builds the grid and registers one pool per prefab, each pre-warmed
    /// with `config.pool_prewarm` instances.
    pub fn new(config: &GameConfig) -> Self {
        let prewarm = config.pool_prewarm;
        let tower_prefab = PrefabId::new(TOWER_PREFAB);
        let projectile_prefab = PrefabId::new(PROJECTILE_PREFAB);

        let mut towers = PoolRegistry::new();
        towers.register(tower_prefab.clone(), prewarm, Tower::default);

        let mut projectiles = PoolRegistry::new();
        projectiles.register(projectile_prefab.clone(), prewarm, Projectile::default);

        let mut enemies = PoolRegistry::new();
        let mut enemy_profiles = BTreeMap::new();
        for (name, profile) in &config.enemies {
            let prefab = PrefabId::new(name);
            enemies.register(prefab.clone(), prewarm, Enemy::default);
            enemy_profiles.insert(prefab, *profile);
        }

        Self {
            config: config.clone(),
            grid: config.grid.build(),
            clock: 0.0,
            next_id: 0,
            tower_prefab,
            projectile_prefab,
            enemy_profiles,
            towers,
            enemies,
            projectiles,
            index: HashMap::new(),
            physics: PhysicsSnapshot::new(),
            commands: CommandBuffer::new(),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Seconds simulated so far.
    pub fn now(&self) -> f32 {
        self.clock
    }

    /// Places a tower on `cell` and starts it in its idle state.
    pub fn spawn_tower(
        &mut self,
        cell: Cell,
        descriptor: Arc<TowerDescriptor>,
        strategies: StrategyPair<TowerBody>,
    ) -> Result<EntityId, WorldError> {
        if self.grid.cell(cell.column, cell.row).is_none() {
            return Err(WorldError::CellOutOfBounds(cell));
        }
        if self.grid.is_busy(cell) {
            return Err(WorldError::CellOccupied(cell));
        }

        let id = self.allocate_id();
        let position = self.grid.cell_center(cell);
        let time = FrameTime::new(self.clock, 0.0);
        let cell_size = self.grid.cell_size();
        let body = TowerBody::new(id, cell, position, descriptor);

        let (pooled, tower) = self
            .towers
            .spawn(&self.tower_prefab)
            .ok_or_else(|| WorldError::UnknownPrefab(self.tower_prefab.clone()))?;
        let mut cx = TickContext::new(time, cell_size, &self.physics, &mut self.commands);
        if let Err(error) = tower.activate(body, strategies, &mut cx) {
            tower.deactivate();
            self.towers.despawn(&pooled);
            return Err(error.into());
        }

        self.grid.set_busy(cell, true);
        tracing::debug!(entity = %id, %cell, "tower spawned");
        self.track(id, EntityKind::Tower, pooled, position);
        Ok(id)
    }

    /// Places a tower on the cell under `world`.
    pub fn place_tower(
        &mut self,
        world: Vec2,
        descriptor: Arc<TowerDescriptor>,
        strategies: StrategyPair<TowerBody>,
    ) -> Result<EntityId, WorldError> {
        let cell = self.grid.cell_at(world).ok_or(WorldError::NoCell(world))?;
        self.spawn_tower(cell, descriptor, strategies)
    }

    /// Spawns an enemy of `prefab` at `position`, walking.
    pub fn spawn_enemy(
        &mut self,
        prefab: &PrefabId,
        position: Vec2,
        strategies: StrategyPair<EnemyBody>,
    ) -> Result<EntityId, WorldError> {
        let profile = *self
            .enemy_profiles
            .get(prefab)
            .ok_or_else(|| WorldError::UnknownPrefab(prefab.clone()))?;

        let id = self.allocate_id();
        let time = FrameTime::new(self.clock, 0.0);
        let cell_size = self.grid.cell_size();
        let body = EnemyBody::new(id, prefab.clone(), profile, position);

        let (pooled, enemy) = self
            .enemies
            .spawn(prefab)
            .ok_or_else(|| WorldError::UnknownPrefab(prefab.clone()))?;
        let mut cx = TickContext::new(time, cell_size, &self.physics, &mut self.commands);
        if let Err(error) = enemy.activate(body, strategies, &mut cx) {
            enemy.deactivate();
            self.enemies.despawn(&pooled);
            return Err(error.into());
        }

        tracing::debug!(entity = %id, %prefab, "enemy spawned");
        self.track(id, EntityKind::Enemy, pooled, position);
        Ok(id)
    }

    /// Returns an entity to its pool. A tower frees its grid cell.
    ///
    /// Returns false for unknown or already despawned ids.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        self.despawn_with(id, DespawnReason::Removed)
    }

    /// Damages a tower or enemy, despawning it once its health is depleted.
    ///
    /// Returns the remaining health, or `None` when `target` cannot take
    /// damage.
    pub fn apply_damage(&mut self, target: EntityId, amount: i32) -> Option<i32> {
        let entry = self.index.get(&target)?;
        let kind = entry.kind;
        let (health, destroyed) = match kind {
            EntityKind::Tower => self.towers.get_mut(&entry.pooled).map(|tower| {
                let destroyed = tower.body_mut().take_damage(amount);
                (tower.body().health(), destroyed)
            })?,
            EntityKind::Enemy => self.enemies.get_mut(&entry.pooled).map(|enemy| {
                let destroyed = enemy.body_mut().take_damage(amount);
                (enemy.body().health(), destroyed)
            })?,
            EntityKind::Projectile => return None,
        };

        self.events.push(WorldEvent::Damaged {
            id: target,
            kind,
            amount,
            health,
        });
        if destroyed {
            self.despawn_with(target, DespawnReason::Destroyed);
        }
        Some(health)
    }

    /// Swaps an updated descriptor into every live tower of its family.
    ///
    /// Returns the number of towers updated.
    pub fn refresh_descriptor(&mut self, descriptor: &Arc<TowerDescriptor>) -> usize {
        let mut updated = 0;
        for tower in self.towers.iter_active_mut() {
            if tower.is_active() && tower.body().shared_descriptor().type_id == descriptor.type_id {
                tower.body_mut().set_descriptor(Arc::clone(descriptor));
                updated += 1;
            }
        }
        updated
    }

    /// Advances the simulation by `delta` seconds.
    pub fn tick(&mut self, delta: f32) -> TickReport {
        self.clock += delta;
        let time = FrameTime::new(self.clock, delta);
        let cell_size = self.grid.cell_size();

        self.rebuild_physics();
        {
            let mut cx = TickContext::new(time, cell_size, &self.physics, &mut self.commands);
            for tower in self.towers.iter_active_mut() {
                tower.tick(&mut cx);
            }
            for enemy in self.enemies.iter_active_mut() {
                enemy.tick(&mut cx);
            }
        }

        self.rebuild_physics();
        {
            let mut cx = TickContext::new(time, cell_size, &self.physics, &mut self.commands);
            for projectile in self.projectiles.iter_active_mut() {
                projectile.tick(&mut cx);
            }
        }

        let commands_applied = self.apply_commands();
        self.remove_escaped();

        tracing::trace!(now = self.clock, commands_applied, "world tick");
        TickReport {
            time,
            commands_applied,
            events: self.drain_events(),
        }
    }

    /// Takes events raised outside of [`tick`](Self::tick), such as spawns.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn kind_of(&self, id: EntityId) -> Option<EntityKind> {
        self.index.get(&id).map(|entry| entry.kind)
    }

    pub fn tower(&self, id: EntityId) -> Option<&Tower> {
        let entry = self.index.get(&id).filter(|entry| entry.kind == EntityKind::Tower)?;
        self.towers.get(&entry.pooled)
    }

    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        let entry = self.index.get(&id).filter(|entry| entry.kind == EntityKind::Enemy)?;
        self.enemies.get(&entry.pooled)
    }

    pub fn projectile(&self, id: EntityId) -> Option<&Projectile> {
        let entry = self
            .index
            .get(&id)
            .filter(|entry| entry.kind == EntityKind::Projectile)?;
        self.projectiles.get(&entry.pooled)
    }

    pub fn towers(&self) -> impl Iterator<Item = &Tower> {
        self.towers.iter_active()
    }

    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter_active()
    }

    pub fn projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter_active()
    }

    pub fn tower_count(&self) -> usize {
        self.towers.active_len()
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.active_len()
    }

    pub fn projectile_count(&self) -> usize {
        self.projectiles.active_len()
    }

    /// Tower pool, for inspecting reuse.
    pub fn tower_pool(&self) -> &PoolRegistry<Tower> {
        &self.towers
    }

    /// Projectile pool, for inspecting reuse.
    pub fn projectile_pool(&self) -> &PoolRegistry<Projectile> {
        &self.projectiles
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    fn track(&mut self, id: EntityId, kind: EntityKind, pooled: Pooled, position: Vec2) {
        self.index.insert(id, EntityRef { kind, pooled });
        self.events.push(WorldEvent::Spawned { id, kind, position });
    }

    fn despawn_with(&mut self, id: EntityId, reason: DespawnReason) -> bool {
        let Some(entry) = self.index.remove(&id) else {
            tracing::debug!(entity = %id, %reason, "despawn of untracked entity ignored");
            return false;
        };

        match entry.kind {
            EntityKind::Tower => {
                if let Some(tower) = self.towers.get_mut(&entry.pooled) {
                    let cell = tower.body().cell();
                    tower.deactivate();
                    self.grid.set_busy(cell, false);
                }
                self.towers.despawn(&entry.pooled);
            }
            EntityKind::Enemy => {
                if let Some(enemy) = self.enemies.get_mut(&entry.pooled) {
                    enemy.deactivate();
                }
                self.enemies.despawn(&entry.pooled);
            }
            EntityKind::Projectile => {
                self.projectiles.despawn(&entry.pooled);
            }
        }

        tracing::debug!(entity = %id, kind = %entry.kind, %reason, "entity despawned");
        self.events.push(WorldEvent::Despawned {
            id,
            kind: entry.kind,
            reason,
        });
        true
    }

    fn spawn_projectile(
        &mut self,
        source: EntityId,
        target: EntityId,
        origin: Vec2,
        damage: i32,
        visual: Visual,
    ) -> Option<EntityId> {
        let id = self.allocate_id();
        let (pooled, projectile) = self.projectiles.spawn(&self.projectile_prefab)?;
        *projectile = Projectile::new(id, source, target, origin, damage, visual)
            .with_ballistics(&self.config.projectile);
        self.track(id, EntityKind::Projectile, pooled, origin);
        Some(id)
    }

    fn rebuild_physics(&mut self) {
        self.physics.clear();
        let radii = &self.config.colliders;
        for tower in self.towers.iter_active().filter(|tower| tower.is_active()) {
            let body = tower.body();
            self.physics.insert(Collider {
                id: body.id(),
                position: body.position(),
                radius: radii.tower,
                layer: Layers::TOWER,
            });
        }
        for enemy in self.enemies.iter_active().filter(|enemy| enemy.is_active()) {
            let body = enemy.body();
            self.physics.insert(Collider {
                id: body.id(),
                position: body.position(),
                radius: radii.enemy,
                layer: Layers::ENEMY,
            });
        }
    }

    fn apply_commands(&mut self) -> usize {
        let commands = self.commands.drain();
        let applied = commands.len();
        for command in commands {
            match command {
                Command::SpawnProjectile {
                    source,
                    target,
                    origin,
                    damage,
                    visual,
                } => {
                    self.spawn_projectile(source, target, origin, damage, visual);
                }
                Command::Damage {
                    source,
                    target,
                    amount,
                } => {
                    if self.apply_damage(target, amount).is_none() {
                        tracing::trace!(%source, %target, "damage to untracked entity dropped");
                    }
                }
                Command::Despawn(id) => {
                    let reason = match self.kind_of(id) {
                        Some(EntityKind::Projectile) => DespawnReason::Spent,
                        _ => DespawnReason::Removed,
                    };
                    self.despawn_with(id, reason);
                }
            }
        }
        applied
    }

    fn remove_escaped(&mut self) {
        let line = self.config.base_line_y;
        let escaped: Vec<EntityId> = self
            .enemies
            .iter_active()
            .filter(|enemy| enemy.is_active() && enemy.body().position().y <= line)
            .map(|enemy| enemy.body().id())
            .collect();
        for id in escaped {
            self.despawn_with(id, DespawnReason::ReachedBase);
        }
    }
}
