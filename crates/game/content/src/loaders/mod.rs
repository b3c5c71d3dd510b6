//! Content loaders for reading game data from files.
//!
//! Every loader returns [`LoadResult`]; errors carry the offending path.

pub mod cards;
pub mod config;
pub mod factory;

pub use cards::{CardCatalog, CardLoader};
pub use config::ConfigLoader;
pub use factory::ContentFactory;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
