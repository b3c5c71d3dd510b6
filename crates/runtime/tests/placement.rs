use std::sync::{Arc, Mutex};
use std::time::Duration;

use game_core::{
    CardRecord, Cell, DescriptorField, EntityKind, TowerTypeId, Vec2, WorldEvent,
};
use runtime::{
    AssetPolicy, Event, FlyweightError, InMemoryAssets, Runtime, RuntimeConfig, RuntimeError,
    Topic,
};

fn record(id: u32) -> CardRecord {
    CardRecord {
        card_id: TowerTypeId(id),
        card_icon: format!("icon_{id}"),
        level: 1,
        mana_cost: 3,
        kind: "Ranged".into(),
        horizontal_cells_range: 2,
        vertical_cells_range: 1,
        damage: 2,
        fire_cooldown: 1.0,
        projectile_sprite: "arrow".into(),
        initial_hp: 10,
    }
}

fn quiet_config() -> RuntimeConfig {
    RuntimeConfig {
        spawner_enabled: false,
        ..RuntimeConfig::default()
    }
}

fn runtime(config: RuntimeConfig) -> Runtime {
    let assets = InMemoryAssets::permissive().with_latency(Duration::from_millis(5));
    Runtime::builder()
        .config(config)
        .resolver(Arc::new(assets))
        .build()
        .unwrap()
}

fn collect(runtime: &Runtime, topic: Topic) -> Arc<Mutex<Vec<Event>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    runtime
        .bus()
        .subscribe(topic, move |event| sink.lock().unwrap().push(event.clone()));
    seen
}

fn center(runtime: &Runtime, column: u32, row: u32) -> Vec2 {
    runtime.world().grid().cell_center(Cell::new(column, row))
}

/// Card drop to live tower:
/// 1. Cards are loaded, their descriptors cached and dealt into the hand
/// 2. A card is dropped over a free cell
/// 3. The next frame queues the placement and launches its descriptor load
/// 4. Once the load is applied the cell is busy and the tower shares the
///    cached descriptor
#[tokio::test]
async fn card_drop_places_a_tower() {
    let mut runtime = runtime(quiet_config());
    let built = runtime.load_cards(vec![record(1), record(2)]).await.unwrap();
    assert_eq!(built, 2);

    let target = center(&runtime, 2, 1);
    runtime.drop_card(TowerTypeId(1), target).unwrap();
    runtime.step(0.016).await;
    runtime.settle().await.unwrap();

    assert_eq!(runtime.world().tower_count(), 1);
    assert!(runtime.world().grid().is_busy(Cell::new(2, 1)));
    let tower = runtime.world().towers().next().unwrap();
    let cached = runtime.cache().get(TowerTypeId(1)).unwrap();
    assert!(Arc::ptr_eq(tower.body().shared_descriptor(), &cached));
    assert_eq!(runtime.pending_loads(), 0);
}

#[tokio::test]
async fn settle_places_a_drop_without_a_frame() {
    let mut runtime = runtime(quiet_config());
    runtime.load_cards(vec![record(1)]).await.unwrap();

    runtime.drop_card(TowerTypeId(1), center(&runtime, 4, 0)).unwrap();
    let placed = runtime.settle().await.unwrap();

    assert_eq!(placed, 1);
    assert_eq!(runtime.world().tower_count(), 1);
    assert!(runtime.world().grid().is_busy(Cell::new(4, 0)));
}

#[tokio::test]
async fn second_placement_on_the_same_cell_is_discarded() {
    let mut runtime = runtime(quiet_config());
    runtime.load_cards(vec![record(1), record(2)]).await.unwrap();

    let target = center(&runtime, 4, 2);
    runtime.drop_card(TowerTypeId(1), target).unwrap();
    runtime.drop_card(TowerTypeId(2), target).unwrap();
    runtime.step(0.016).await;
    runtime.settle().await.unwrap();

    assert_eq!(runtime.world().tower_count(), 1);
    assert_eq!(runtime.world().grid().occupied_count(), 1);
}

#[tokio::test]
async fn drops_outside_the_grid_or_on_busy_cells_are_ignored() {
    let mut runtime = runtime(quiet_config());
    runtime.load_cards(vec![record(1)]).await.unwrap();

    runtime.drop_card(TowerTypeId(1), Vec2::new(100.0, 100.0)).unwrap();
    runtime.step(0.016).await;
    assert_eq!(runtime.settle().await.unwrap(), 0);

    let target = center(&runtime, 0, 0);
    runtime.drop_card(TowerTypeId(1), target).unwrap();
    runtime.step(0.016).await;
    runtime.settle().await.unwrap();
    runtime.drop_card(TowerTypeId(1), target).unwrap();
    runtime.step(0.016).await;

    assert_eq!(runtime.pending_loads(), 0);
    assert_eq!(runtime.world().tower_count(), 1);
}

#[tokio::test]
async fn dropping_a_card_not_in_the_hand_fails() {
    let mut runtime = runtime(quiet_config());
    runtime.load_cards(vec![record(1)]).await.unwrap();

    assert!(matches!(
        runtime.drop_card(TowerTypeId(5), Vec2::ZERO),
        Err(RuntimeError::UnknownCard(TowerTypeId(5)))
    ));
}

/// An upgrade replaces the family's descriptor, reaches live towers at once,
/// and flows back into the card list and the card in the hand.
#[tokio::test]
async fn upgrade_reaches_towers_cards_and_the_card_list() {
    let mut runtime = runtime(quiet_config());
    runtime.load_cards(vec![record(1)]).await.unwrap();
    let updates = collect(&runtime, Topic::CardUpdate);
    let target = center(&runtime, 1, 1);
    runtime.drop_card(TowerTypeId(1), target).unwrap();
    runtime.step(0.016).await;
    runtime.settle().await.unwrap();

    assert!(runtime.upgrade_by_name(TowerTypeId(1), "Damage", 9));
    assert!(!runtime.upgrade(TowerTypeId(1), DescriptorField::TypeId, 3));
    assert!(!runtime.upgrade(TowerTypeId(8), DescriptorField::Damage, 3));

    let tower = runtime.world().towers().next().unwrap();
    assert_eq!(tower.body().shared_descriptor().damage, 9);
    assert_eq!(
        runtime.database().get(TowerTypeId(1)).map(|r| r.damage),
        Some(9)
    );
    assert_eq!(updates.lock().unwrap().len(), 1);

    runtime.step(0.016).await;
    let card = runtime.hand().card(TowerTypeId(1)).unwrap();
    assert_eq!(card.state().record.damage, 9);
}

#[tokio::test]
async fn loading_publishes_the_card_list_and_the_hand() {
    let mut runtime = runtime(quiet_config());
    let loaded = collect(&runtime, Topic::CardsLoaded);
    let hands = collect(&runtime, Topic::HandUpdate);

    runtime
        .load_cards(vec![record(1), record(2), record(3)])
        .await
        .unwrap();

    assert_eq!(loaded.lock().unwrap().len(), 1);
    let hands = hands.lock().unwrap();
    assert_eq!(hands.len(), 1);
    assert!(matches!(&hands[0], Event::HandUpdate(snapshot) if snapshot.cards.len() == 3));
    assert_eq!(runtime.hand().len(), 3);
    assert_eq!(runtime.database().len(), 3);
}

#[tokio::test]
async fn strict_asset_policy_fails_loading() {
    let config = RuntimeConfig {
        asset_policy: AssetPolicy::Strict,
        ..quiet_config()
    };
    let mut runtime = Runtime::builder()
        .config(config)
        .resolver(Arc::new(InMemoryAssets::new()))
        .build()
        .unwrap();
    let loaded = collect(&runtime, Topic::CardsLoaded);

    let result = runtime.load_cards(vec![record(1)]).await;

    assert!(matches!(
        result,
        Err(RuntimeError::Flyweight(FlyweightError::Asset { .. }))
    ));
    assert!(loaded.lock().unwrap().is_empty());
    assert!(runtime.hand().is_empty());
    assert!(runtime.cache().is_empty());
}

#[test]
fn building_without_a_resolver_fails() {
    assert!(matches!(
        Runtime::builder().build(),
        Err(RuntimeError::MissingResolver)
    ));
}

#[tokio::test]
async fn spawner_feeds_enemies_into_simulation_events() {
    let config = RuntimeConfig {
        spawn_seed: 3,
        ..RuntimeConfig::default()
    };
    let mut runtime = runtime(config);
    let simulation = collect(&runtime, Topic::Simulation);

    runtime.step(1.5).await;
    assert_eq!(runtime.world().enemy_count(), 0);
    let report = runtime.step(1.5).await;

    assert_eq!(runtime.world().enemy_count(), 1);
    assert!(report.events.iter().any(|event| matches!(
        event,
        WorldEvent::Spawned { kind: EntityKind::Enemy, .. }
    )));
    assert!(!simulation.lock().unwrap().is_empty());
}
