//! Timed enemy spawning.

use game_core::{Cell, EntityId, PrefabId, SpawnerConfig, StrategyLibrary, Vec2, World};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Spawns a random enemy prefab above a random grid column every `interval`
/// seconds of simulated time.
#[derive(Debug)]
pub struct EnemySpawner {
    interval: f32,
    spawn_y: f32,
    elapsed: f32,
    prefabs: Vec<PrefabId>,
    rng: StdRng,
}

impl EnemySpawner {
    pub fn new(config: &SpawnerConfig, prefabs: Vec<PrefabId>, seed: u64) -> Self {
        Self {
            interval: config.interval,
            spawn_y: config.spawn_y,
            elapsed: 0.0,
            prefabs,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn prefabs(&self) -> &[PrefabId] {
        &self.prefabs
    }

    /// Advances the timer, spawning at most one enemy.
    pub fn update(
        &mut self,
        delta: f32,
        world: &mut World,
        strategies: &StrategyLibrary,
    ) -> Option<EntityId> {
        self.elapsed += delta;
        if self.elapsed < self.interval {
            return None;
        }
        self.elapsed -= self.interval;

        let prefab = self.prefabs.choose(&mut self.rng)?.clone();
        let columns = world.grid().columns();
        if columns == 0 {
            return None;
        }
        let column = self.rng.gen_range(0..columns);
        let x = world.grid().cell_center(Cell::new(column, 0)).x;
        let position = Vec2::new(x, self.spawn_y);

        match world.spawn_enemy(&prefab, position, strategies.enemy()) {
            Ok(id) => {
                tracing::debug!(entity = %id, %prefab, column, "enemy spawned by timer");
                Some(id)
            }
            Err(error) => {
                tracing::warn!(%prefab, %error, "enemy spawn failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use game_core::{Agent, GameConfig};

    use super::*;

    fn spawner(config: &GameConfig, seed: u64) -> EnemySpawner {
        let prefabs = config.enemies.keys().map(PrefabId::new).collect();
        EnemySpawner::new(&config.spawner, prefabs, seed)
    }

    #[test]
    fn spawns_once_per_interval_above_a_column_centre() {
        let config = GameConfig::default();
        let mut world = World::new(&config);
        let strategies = StrategyLibrary::new();
        let mut spawner = spawner(&config, 7);

        assert_eq!(spawner.update(1.5, &mut world, &strategies), None);
        let id = spawner.update(1.5, &mut world, &strategies).unwrap();
        assert_eq!(spawner.update(1.5, &mut world, &strategies), None);

        let position = world.enemy(id).unwrap().body().position();
        assert_eq!(position.y, config.spawner.spawn_y);
        let grid = world.grid();
        assert!((0..grid.columns()).any(|c| grid.cell_center(Cell::new(c, 0)).x == position.x));
        assert_eq!(world.enemy_count(), 1);
    }

    #[test]
    fn same_seed_gives_the_same_columns() {
        let config = GameConfig::default();
        let strategies = StrategyLibrary::new();
        let columns = |seed| {
            let mut world = World::new(&config);
            let mut spawner = spawner(&config, seed);
            let ids: Vec<EntityId> = (0..5)
                .filter_map(|_| spawner.update(3.0, &mut world, &strategies))
                .collect();
            ids.into_iter()
                .map(|id| world.enemy(id).unwrap().body().position().x)
                .collect::<Vec<_>>()
        };

        assert_eq!(columns(42), columns(42));
        assert_eq!(columns(42).len(), 5);
    }

    #[test]
    fn no_prefabs_spawns_nothing() {
        let config = GameConfig::default();
        let mut world = World::new(&config);
        let mut spawner = EnemySpawner::new(&config.spawner, Vec::new(), 1);

        assert_eq!(spawner.update(10.0, &mut world, &StrategyLibrary::new()), None);
    }
}
