//! Deterministic entity behavior for the tower-defense board.
//!
//! `game-core` defines the pooled entities (towers, enemies, projectiles),
//! the strategies that drive them through their state machines, the placement
//! grid and the spatial queries they run against. Nothing here touches I/O or
//! async; the runtime feeds frames into [`World::tick`] and publishes what
//! comes out.
pub mod config;
pub mod descriptor;
pub mod entity;
pub mod error;
pub mod grid;
pub mod physics;
pub mod pool;
pub mod strategy;
pub mod tween;
pub mod types;
pub mod world;

// Re-export core types for ergonomic API
pub use config::{
    ColliderConfig, EnemyProfile, GameConfig, GridConfig, ProjectileConfig, SpawnerConfig,
};
pub use descriptor::{
    AssetHandle, CardRecord, DescriptorField, DescriptorVisuals, FieldValue, ModifyError,
    TowerDescriptor, Visual,
};
pub use entity::{
    Actor, Agent, BehaviorInput, Command, CommandBuffer, Enemy, EnemyAgent, EnemyBody, EnemyInput,
    Projectile, TickContext, Tower, TowerAgent, TowerBody, TowerInput,
};
pub use error::{ErrorSeverity, GameError};
pub use grid::{Cell, Grid};
pub use physics::{Collider, Hit, PhysicsSnapshot, SpatialQuery};
pub use pool::{ObjectPool, PoolError, PoolHandle, PoolRegistry, Pooled};
pub use strategy::{
    ArrowAttack, ArrowIdle, EnemyAttack, EnemyWalking, Strategy, StrategyError, StrategyLibrary,
    StrategyPair, StrategyResult,
};
pub use tween::{AbortToken, ScaleTween, TweenStep};
pub use types::{EntityId, EntityKind, FrameTime, Layers, PrefabId, TowerTypeId, Vec2};
pub use world::{DespawnReason, TickReport, World, WorldError, WorldEvent};
