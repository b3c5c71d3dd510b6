//! Card list loader.
//!
//! The card list is an object with a single `cards` array. Records use the
//! PascalCase field names of the card table; `CardID` may be a string or an
//! integer.
//!
//! ```json
//! { "cards": [ { "CardID": "1", "CardIcon": "arrow", "Level": 1, ... } ] }
//! ```

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context};
use game_core::CardRecord;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Card list structure shared by the JSON and RON formats.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardCatalog {
    pub cards: Vec<CardRecord>,
}

/// Loader for card lists.
pub struct CardLoader;

impl CardLoader {
    /// Loads a card list, picking the format from the file extension
    /// (`.json` or `.ron`).
    pub fn load(path: &Path) -> LoadResult<Vec<CardRecord>> {
        let content = read_file(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let cards = match extension.as_deref() {
            Some("json") => Self::from_json(&content),
            Some("ron") => Self::from_ron(&content),
            _ => bail!("Unsupported card list format: {}", path.display()),
        }
        .with_context(|| format!("Failed to load card list {}", path.display()))?;

        tracing::info!(path = %path.display(), count = cards.len(), "card list loaded");
        Ok(cards)
    }

    pub fn from_json(content: &str) -> LoadResult<Vec<CardRecord>> {
        let catalog: CardCatalog = serde_json::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse card list JSON: {}", e))?;
        Self::validate(catalog)
    }

    pub fn from_ron(content: &str) -> LoadResult<Vec<CardRecord>> {
        let catalog: CardCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse card list RON: {}", e))?;
        Self::validate(catalog)
    }

    /// Rejects duplicate card ids; descriptors are keyed by them.
    fn validate(catalog: CardCatalog) -> LoadResult<Vec<CardRecord>> {
        let mut seen = HashSet::new();
        for card in &catalog.cards {
            if !seen.insert(card.card_id) {
                bail!("Duplicate card id {}", card.card_id);
            }
        }
        Ok(catalog.cards)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use game_core::TowerTypeId;

    use super::*;

    const ARROW_JSON: &str = r#"{
        "cards": [
            {
                "CardID": "1",
                "CardIcon": "arrow_icon",
                "Level": 2,
                "ManaCost": 3,
                "Type": "Ranged",
                "HorizontalCellsRange": 2,
                "VerticalCellsRange": 1,
                "Damage": 4,
                "FireCooldown": 0.75,
                "ProjectileSprite": "arrow",
                "InitialHp": 12
            },
            {
                "CardID": 2,
                "CardIcon": "cannon_icon",
                "Level": 1,
                "ManaCost": 5,
                "Type": "Siege",
                "HorizontalCellsRange": 1,
                "VerticalCellsRange": 3,
                "Damage": 8,
                "FireCooldown": 2.0,
                "ProjectileSprite": "ball",
                "InitialHp": 20
            }
        ]
    }"#;

    #[test]
    fn parses_string_and_numeric_card_ids() {
        let cards = CardLoader::from_json(ARROW_JSON).unwrap();

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].card_id, TowerTypeId(1));
        assert_eq!(cards[0].kind, "Ranged");
        assert_eq!(cards[0].horizontal_cells_range, 2);
        assert_eq!(cards[0].fire_cooldown, 0.75);
        assert_eq!(cards[1].card_id, TowerTypeId(2));
        assert_eq!(cards[1].projectile_sprite, "ball");
    }

    #[test]
    fn rejects_duplicate_card_ids() {
        let content = r#"{ "cards": [
            { "CardID": "7", "CardIcon": "a", "Level": 1, "ManaCost": 1, "Type": "T",
              "HorizontalCellsRange": 1, "VerticalCellsRange": 1, "Damage": 1,
              "FireCooldown": 1.0, "ProjectileSprite": "p", "InitialHp": 1 },
            { "CardID": 7, "CardIcon": "b", "Level": 1, "ManaCost": 1, "Type": "T",
              "HorizontalCellsRange": 1, "VerticalCellsRange": 1, "Damage": 1,
              "FireCooldown": 1.0, "ProjectileSprite": "p", "InitialHp": 1 }
        ] }"#;

        let error = CardLoader::from_json(content).unwrap_err();
        assert!(error.to_string().contains("Duplicate card id 7"));
    }

    #[test]
    fn rejects_malformed_card_ids() {
        let content = ARROW_JSON.replacen("\"1\"", "\"one\"", 1);
        assert!(CardLoader::from_json(&content).is_err());
    }

    #[test]
    fn loads_ron_card_lists_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".ron").tempfile().unwrap();
        write!(
            file,
            r#"(cards: [(
                CardID: "3",
                CardIcon: "frost_icon",
                Level: 1,
                ManaCost: 4,
                Type: "Magic",
                HorizontalCellsRange: 1,
                VerticalCellsRange: 2,
                Damage: 2,
                FireCooldown: 1.5,
                ProjectileSprite: "shard",
                InitialHp: 9,
            )])"#
        )
        .unwrap();

        let cards = CardLoader::load(file.path()).unwrap();

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].card_id, TowerTypeId(3));
        assert_eq!(cards[0].initial_hp, 9);
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        assert!(CardLoader::load(file.path()).is_err());
    }
}
