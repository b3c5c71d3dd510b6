//! Shared tower descriptors, built once per type from asynchronously loaded
//! assets.
//!
//! # Architecture
//!
//! - [`FlyweightCache`] maps each [`TowerTypeId`](game_core::TowerTypeId) to
//!   one `Arc<TowerDescriptor>` shared by every tower of that type
//! - Concurrent misses for the same type coalesce into a single build
//! - Mutation is copy-on-write: a modified descriptor is published under the
//!   same id and readers holding the old `Arc` keep a consistent snapshot

mod cache;
mod errors;

pub use cache::{AssetPolicy, FlyweightCache};
pub use errors::FlyweightError;
