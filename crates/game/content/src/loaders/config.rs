//! Game configuration loader.

use std::path::Path;

use anyhow::ensure;
use game_core::GameConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for game configuration from TOML files.
///
/// Missing sections and fields fall back to [`GameConfig::default`].
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<GameConfig> {
        let config: GameConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        Self::validate(&config)?;
        Ok(config)
    }

    fn validate(config: &GameConfig) -> LoadResult<()> {
        let grid = &config.grid;
        ensure!(
            grid.columns > 0 && grid.rows > 0,
            "Grid must have at least one cell (got {}x{})",
            grid.columns,
            grid.rows
        );
        ensure!(
            grid.cell_size > 0.0,
            "Grid cell size must be positive (got {})",
            grid.cell_size
        );
        ensure!(
            config.spawner.interval > 0.0,
            "Spawner interval must be positive (got {})",
            config.spawner.interval
        );
        ensure!(!config.enemies.is_empty(), "At least one enemy prefab is required");
        Ok(())
    }
}
