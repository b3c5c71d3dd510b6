//! Data-driven content definitions and loaders.
//!
//! This crate reads the static data the runtime is seeded with:
//! - Card lists (JSON `{"cards": [...]}` or RON)
//! - Game configuration (TOML)
//!
//! Loaded records feed the descriptor cache; they never appear in the
//! simulation directly.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{CardCatalog, CardLoader, ConfigLoader, ContentFactory, LoadResult};
