use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use game_core::AssetHandle;

use super::{AssetError, AssetResolver};

/// Resolves keys as file paths relative to a root directory.
///
/// Only the file's presence is checked; decoding is left to the renderer.
/// Handle ids are derived from the key, so they are stable across runs.
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn handle_id(key: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }
}

#[async_trait]
impl AssetResolver for DirectoryAssets {
    async fn resolve(&self, key: &str) -> Result<AssetHandle, AssetError> {
        let path = self.root.join(key);
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(AssetHandle::new(key, Self::handle_id(key))),
            Ok(_) => Err(AssetError::Load {
                key: key.to_string(),
                reason: format!("{} is not a file", path.display()),
            }),
            Err(error) if error.kind() == ErrorKind::NotFound => {
                Err(AssetError::NotFound(key.to_string()))
            }
            Err(error) => Err(AssetError::Load {
                key: key.to_string(),
                reason: error.to_string(),
            }),
        }
    }
}
