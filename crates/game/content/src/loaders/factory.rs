//! Content factory for loading everything the runtime is seeded with.

use std::path::{Path, PathBuf};

use game_core::{CardRecord, GameConfig};

use crate::loaders::{CardLoader, ConfigLoader, LoadResult};

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml      (optional)
/// └── cards.json       (or cards.ron)
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    const CARD_FILES: [&'static str; 2] = ["cards.json", "cards.ron"];

    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load game configuration from `config.toml`, or defaults when the file
    /// does not exist.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(GameConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the card list from `cards.json`, falling back to `cards.ron`.
    pub fn load_cards(&self) -> LoadResult<Vec<CardRecord>> {
        let path = self.cards_path().ok_or_else(|| {
            anyhow::anyhow!(
                "No card list found in {} (expected one of {:?})",
                self.data_dir.display(),
                Self::CARD_FILES
            )
        })?;
        CardLoader::load(&path)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn cards_path(&self) -> Option<PathBuf> {
        Self::CARD_FILES
            .iter()
            .map(|name| self.data_dir.join(name))
            .find(|path| path.exists())
    }
}
