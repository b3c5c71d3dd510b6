//! Runtime orchestration for the tower-defense simulation.
//!
//! This crate wires the deterministic `game-core` world to the asynchronous
//! edges: asset resolution, the shared tower descriptor cache, the card hand
//! and the event bus. Consumers build a [`Runtime`] and drive it one frame at
//! a time.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the error types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`flyweight`] caches one shared descriptor per tower family
//! - [`assets`] resolves sprite keys to loaded handles
//! - [`cards`] and [`spawner`] are the hand and the enemy wave source
pub mod api;
pub mod assets;
pub mod cards;
pub mod events;
pub mod flyweight;
pub mod runtime;
pub mod spawner;

pub use api::{Result, RuntimeError};
pub use assets::{AssetError, AssetLayout, AssetResolver, DirectoryAssets, InMemoryAssets};
pub use cards::{
    CardComponent, CardController, CardDatabase, CardDrag, CardState, CardView, DragSettings,
    Hand, HandLayout, Lifecycle, PlacementRequest, Pointer,
};
pub use events::{
    CardDragEvent, CardDropEvent, CardSlot, Event, EventBus, HandSnapshot, SubscriptionId, Topic,
};
pub use flyweight::{AssetPolicy, FlyweightCache, FlyweightError};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use spawner::EnemySpawner;
