use std::collections::BTreeMap;

use crate::grid::Grid;
use crate::types::Vec2;

/// Game configuration constants and tunable parameters.
///
/// Every section falls back to its defaults, so a config file only needs the
/// values it overrides.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    pub grid: GridConfig,
    /// Instances constructed up front for every registered pool.
    pub pool_prewarm: usize,
    /// Enemies at or below this y coordinate have reached the main base.
    pub base_line_y: f32,
    pub projectile: ProjectileConfig,
    pub colliders: ColliderConfig,
    pub spawner: SpawnerConfig,
    /// Enemy prefabs by name.
    pub enemies: BTreeMap<String, EnemyProfile>,
}

impl GameConfig {
    pub const DEFAULT_POOL_PREWARM: usize = 10;
    pub const DEFAULT_BASE_LINE_Y: f32 = -1.0;
    pub const DEFAULT_ENEMY: &'static str = "grunt";

    pub fn new() -> Self {
        Self {
            grid: GridConfig::default(),
            pool_prewarm: Self::DEFAULT_POOL_PREWARM,
            base_line_y: Self::DEFAULT_BASE_LINE_Y,
            projectile: ProjectileConfig::default(),
            colliders: ColliderConfig::default(),
            spawner: SpawnerConfig::default(),
            enemies: BTreeMap::from([(Self::DEFAULT_ENEMY.to_string(), EnemyProfile::default())]),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Placement grid layout. The grid's bottom edge is centred on `anchor`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridConfig {
    pub columns: u32,
    pub rows: u32,
    pub cell_size: f32,
    pub anchor: Vec2,
}

impl GridConfig {
    pub fn build(&self) -> Grid {
        Grid::centered(self.anchor, self.columns, self.rows, self.cell_size)
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 10,
            rows: 5,
            cell_size: 1.0,
            anchor: Vec2::ZERO,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProjectileConfig {
    /// World units per second.
    pub speed: f32,
    /// Distance at which a projectile counts as having hit its target.
    pub hit_radius: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 5.0,
            hit_radius: 0.1,
        }
    }
}

/// Collider radii registered in the physics snapshot.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ColliderConfig {
    pub tower: f32,
    pub enemy: f32,
}

impl Default for ColliderConfig {
    fn default() -> Self {
        Self {
            tower: 0.5,
            enemy: 0.25,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpawnerConfig {
    /// Seconds between two enemy spawns.
    pub interval: f32,
    /// World y coordinate enemies appear at.
    pub spawn_y: f32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            interval: 3.0,
            spawn_y: 6.0,
        }
    }
}

/// Per-prefab enemy stats.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EnemyProfile {
    pub initial_hp: i32,
    /// World units per second.
    pub speed: f32,
    pub damage: i32,
    /// Tower detection radius.
    pub attack_range: f32,
    /// Distance to the target at which the enemy stops and strikes.
    pub stopping_distance: f32,
    /// Seconds between strikes.
    pub attack_cooldown: f32,
}

impl Default for EnemyProfile {
    fn default() -> Self {
        Self {
            initial_hp: 10,
            speed: 2.0,
            damage: 1,
            attack_range: 1.5,
            stopping_distance: 1.5,
            attack_cooldown: 1.5,
        }
    }
}
