//! Asynchronous asset resolution.
//!
//! The core never loads images itself. It asks an [`AssetResolver`] for a
//! handle by key and awaits the answer; the key layout is described by
//! [`AssetLayout`].

mod directory;
mod memory;

pub use directory::DirectoryAssets;
pub use memory::InMemoryAssets;

use async_trait::async_trait;
use game_core::{AssetHandle, GameError, ErrorSeverity, TowerTypeId};
use thiserror::Error;

/// Resolves asset keys to loaded handles.
#[async_trait]
pub trait AssetResolver: Send + Sync {
    async fn resolve(&self, key: &str) -> Result<AssetHandle, AssetError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("asset '{0}' not found")]
    NotFound(String),

    #[error("failed to load asset '{key}': {reason}")]
    Load { key: String, reason: String },
}

impl GameError for AssetError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "ASSET_NOT_FOUND",
            Self::Load { .. } => "ASSET_LOAD",
        }
    }
}

/// Key layout of the sprites a tower descriptor needs.
///
/// ```
/// use runtime::AssetLayout;
/// use game_core::TowerTypeId;
///
/// let layout = AssetLayout::new("Assets");
/// assert_eq!(layout.tower_sprite(TowerTypeId(1)), "Assets/Sprites/Towers/Tower_1.png");
/// assert_eq!(layout.type_icon("Ranged"), "Assets/Sprites/UI/Ranged.png");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetLayout {
    root: String,
}

impl AssetLayout {
    /// Layout with every key prefixed by `root`. An empty root yields bare
    /// `Sprites/...` keys.
    pub fn new(root: impl Into<String>) -> Self {
        let root: String = root.into();
        Self {
            root: root.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn tower_sprite(&self, type_id: TowerTypeId) -> String {
        self.key(&format!("Sprites/Towers/Tower_{type_id}.png"))
    }

    pub fn projectile_sprite(&self, name: &str) -> String {
        self.key(&format!("Sprites/Projectiles/{name}.png"))
    }

    pub fn card_icon(&self, name: &str) -> String {
        self.key(&format!("Sprites/UI/icons/{name}.png"))
    }

    pub fn type_icon(&self, kind: &str) -> String {
        self.key(&format!("Sprites/UI/{kind}.png"))
    }

    fn key(&self, relative: &str) -> String {
        if self.root.is_empty() {
            relative.to_string()
        } else {
            format!("{}/{}", self.root, relative)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_layout_has_no_prefix() {
        let layout = AssetLayout::default();
        assert_eq!(layout.card_icon("bow"), "Sprites/UI/icons/bow.png");
        assert_eq!(layout.projectile_sprite("arrow"), "Sprites/Projectiles/arrow.png");
    }

    #[test]
    fn trailing_slashes_are_trimmed_from_the_root() {
        let layout = AssetLayout::new("Assets/Assets/");
        assert_eq!(
            layout.tower_sprite(TowerTypeId(7)),
            "Assets/Assets/Sprites/Towers/Tower_7.png"
        );
    }
}
