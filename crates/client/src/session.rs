//! Headless play session.
//!
//! Loads the content, drops every card of the hand onto the bottom row,
//! upgrades the first tower family halfway through and lets the waves run.

use std::sync::Arc;

use anyhow::{Context, Result};
use game_content::ContentFactory;
use game_core::{Cell, DespawnReason, EntityKind, WorldEvent};
use runtime::{AssetResolver, DirectoryAssets, InMemoryAssets, Runtime, RuntimeConfig};

use crate::config::ClientConfig;

/// Damage added to the first tower family by the mid-session upgrade.
const UPGRADE_DAMAGE_BONUS: i32 = 1;

/// What happened during a session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames: u32,
    pub towers: usize,
    pub enemies_spawned: usize,
    pub enemies_destroyed: usize,
    pub enemies_escaped: usize,
    pub towers_destroyed: usize,
}

pub async fn run(config: &ClientConfig) -> Result<SessionSummary> {
    let content = ContentFactory::new(&config.data_dir);
    let game_config = content.load_config()?;
    let cards = content.load_cards()?;

    let resolver: Arc<dyn AssetResolver> = match &config.asset_dir {
        Some(dir) => Arc::new(DirectoryAssets::new(dir)),
        None => Arc::new(InMemoryAssets::permissive()),
    };

    let runtime_config = RuntimeConfig {
        game_config,
        spawn_seed: config.spawn_seed,
        ..RuntimeConfig::default()
    };
    let mut runtime = Runtime::builder()
        .config(runtime_config)
        .resolver(resolver)
        .build()
        .context("Failed to build runtime")?;

    let built = runtime.load_cards(cards.clone()).await?;
    tracing::info!(cards = cards.len(), built, "content loaded");

    let columns = runtime.world().grid().columns();
    for (index, card) in cards.iter().enumerate() {
        let column = (index as u32 * 2) % columns.max(1);
        let target = runtime.world().grid().cell_center(Cell::new(column, 0));
        runtime.drop_card(card.card_id, target)?;
    }

    let mut summary = SessionSummary {
        frames: config.frames,
        ..SessionSummary::default()
    };
    for frame in 0..config.frames {
        if frame == config.frames / 2
            && let Some(first) = cards.first()
            && let Some(descriptor) = runtime.cache().get(first.card_id)
        {
            runtime.upgrade_by_name(
                first.card_id,
                "Damage",
                descriptor.damage + UPGRADE_DAMAGE_BONUS,
            );
        }

        let report = runtime.step(config.frame_dt).await;
        for event in &report.events {
            summary.record(event);
        }
        if frame == 0 {
            runtime.settle().await?;
        }
    }

    summary.towers = runtime.world().tower_count();
    Ok(summary)
}

impl SessionSummary {
    fn record(&mut self, event: &WorldEvent) {
        match event {
            WorldEvent::Spawned {
                kind: EntityKind::Enemy,
                ..
            } => self.enemies_spawned += 1,
            WorldEvent::Despawned { kind, reason, .. } => match (kind, reason) {
                (EntityKind::Enemy, DespawnReason::Destroyed) => self.enemies_destroyed += 1,
                (EntityKind::Enemy, DespawnReason::ReachedBase) => self.enemies_escaped += 1,
                (EntityKind::Tower, DespawnReason::Destroyed) => self.towers_destroyed += 1,
                _ => {}
            },
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARDS: &str = r#"{ "cards": [
        { "CardID": "1", "CardIcon": "bow", "Level": 1, "ManaCost": 3, "Type": "Ranged",
          "HorizontalCellsRange": 3, "VerticalCellsRange": 4, "Damage": 2,
          "FireCooldown": 1, "ProjectileSprite": "arrow", "InitialHp": 20 }
    ] }"#;

    #[tokio::test]
    async fn session_places_the_hand_and_runs_waves() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cards.json"), CARDS).unwrap();
        let config = ClientConfig {
            data_dir: dir.path().to_path_buf(),
            frames: 600,
            frame_dt: 1.0 / 30.0,
            ..ClientConfig::default()
        };

        let summary = run(&config).await.unwrap();

        assert_eq!(summary.frames, 600);
        assert!(summary.enemies_spawned >= 5);
        assert!(summary.towers + summary.towers_destroyed >= 1);
    }

    #[tokio::test]
    async fn missing_card_list_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig {
            data_dir: dir.path().to_path_buf(),
            ..ClientConfig::default()
        };

        assert!(run(&config).await.is_err());
    }
}
