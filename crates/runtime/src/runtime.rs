//! High-level runtime orchestrator.
//!
//! The runtime owns the shared services (event bus, descriptor cache,
//! strategy library), the world, the hand and the enemy spawner, and drives
//! them frame by frame through [`Runtime::step`]. Descriptor loads for card
//! drops run as tokio tasks and are applied on a later frame.

use std::sync::{Arc, PoisonError, RwLock};

use game_core::{
    CardRecord, Cell, DescriptorField, FieldValue, GameConfig, GameError, PrefabId,
    StrategyLibrary, TickReport, TowerDescriptor, TowerTypeId, Vec2, World,
};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinSet;

use crate::api::{Result, RuntimeError};
use crate::assets::{AssetLayout, AssetResolver};
use crate::cards::{CardDatabase, DragSettings, Hand, HandLayout, PlacementRequest, Pointer};
use crate::events::{CardDropEvent, Event, EventBus, SubscriptionId, Topic};
use crate::flyweight::{AssetPolicy, FlyweightCache, FlyweightError};
use crate::spawner::EnemySpawner;

/// Runtime configuration shared across the orchestrator and its services.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    pub asset_layout: AssetLayout,
    pub asset_policy: AssetPolicy,
    pub hand_layout: HandLayout,
    pub drag: DragSettings,
    /// Seed of the enemy spawner's random source.
    pub spawn_seed: u64,
    pub spawner_enabled: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            asset_layout: AssetLayout::default(),
            asset_policy: AssetPolicy::default(),
            hand_layout: HandLayout::default(),
            drag: DragSettings::default(),
            spawn_seed: 0,
            spawner_enabled: true,
        }
    }
}

/// A descriptor load launched for a card drop.
struct PlacementLoad {
    request: PlacementRequest,
    cell: Cell,
    descriptor: std::result::Result<Arc<TowerDescriptor>, FlyweightError>,
}

/// Main runtime that orchestrates the simulation
///
/// Design: Runtime owns every service explicitly; nothing is global. Clones
/// of the [`EventBus`] and [`FlyweightCache`] handed out by the accessors
/// share state with the runtime.
pub struct Runtime {
    bus: EventBus,
    cache: FlyweightCache,
    strategies: StrategyLibrary,
    world: World,
    hand: Hand,
    database: Arc<RwLock<CardDatabase>>,
    spawner: Option<EnemySpawner>,
    placements: UnboundedReceiver<PlacementRequest>,
    refreshes: UnboundedReceiver<TowerTypeId>,
    loads: JoinSet<PlacementLoad>,
    card_updates: SubscriptionId,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn cache(&self) -> &FlyweightCache {
        &self.cache
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn strategies(&self) -> &StrategyLibrary {
        &self.strategies
    }

    /// Snapshot of the card list.
    pub fn database(&self) -> CardDatabase {
        self.database
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of descriptor loads still in flight.
    pub fn pending_loads(&self) -> usize {
        self.loads.len()
    }

    /// Stores the card list, builds every descriptor, publishes
    /// `CardsLoaded` and deals one card per record into the hand.
    ///
    /// Returns the number of descriptors built.
    pub async fn load_cards(&mut self, records: Vec<CardRecord>) -> Result<usize> {
        self.database
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(records.clone());

        let built = self.cache.preload(&records).await?;
        self.bus.publish(Event::CardsLoaded(records.clone()));
        self.hand.populate(&records);

        tracing::info!(cards = records.len(), built, "cards loaded");
        Ok(built)
    }

    /// Releases `card_id` over `world_position` without a drag gesture.
    pub fn drop_card(&mut self, card_id: TowerTypeId, world_position: Vec2) -> Result<()> {
        if !self.hand.contains(card_id) {
            return Err(RuntimeError::UnknownCard(card_id));
        }
        self.bus.publish(Event::CardEndDrag(CardDropEvent {
            card_id,
            world_position,
        }));
        Ok(())
    }

    /// Routes a pointer gesture to a card in the hand.
    pub fn pointer(&mut self, card_id: TowerTypeId, pointer: Pointer) -> bool {
        self.hand.pointer(card_id, pointer)
    }

    /// Advances one frame.
    ///
    /// Order: card components, placement requests, finished loads, descriptor
    /// refreshes, spawner, world tick. The tick's events are republished on
    /// the `Simulation` topic.
    pub async fn step(&mut self, delta: f32) -> TickReport {
        self.hand.update(delta);
        self.launch_placements();
        tokio::task::yield_now().await;

        while let Some(joined) = self.loads.try_join_next() {
            match joined {
                Ok(load) => {
                    if let Err(error) = self.apply_load(load) {
                        tracing::warn!(code = error.error_code(), %error, "tower placement failed");
                    }
                }
                Err(error) => tracing::error!(%error, "placement load task failed"),
            }
        }
        self.apply_refreshes();

        if let Some(spawner) = self.spawner.as_mut() {
            spawner.update(delta, &mut self.world, &self.strategies);
        }

        let report = self.world.tick(delta);
        for event in &report.events {
            self.bus.publish(Event::Simulation(event.clone()));
        }
        report
    }

    /// Waits for every in-flight descriptor load and applies the results.
    ///
    /// Card events still queued on the hand are dispatched first, so a
    /// [`drop_card`](Self::drop_card) is placed without an intervening
    /// [`step`](Self::step). Every load is applied even if one fails; the
    /// first failure is returned. Otherwise returns the number of towers
    /// placed.
    pub async fn settle(&mut self) -> Result<usize> {
        self.hand.update(0.0);
        self.launch_placements();
        let mut placed = 0;
        let mut failure = None;
        while let Some(joined) = self.loads.join_next().await {
            let applied = joined
                .map_err(RuntimeError::LoadTask)
                .and_then(|load| self.apply_load(load));
            match applied {
                Ok(true) => placed += 1,
                Ok(false) => {}
                Err(error) => {
                    tracing::warn!(code = error.error_code(), %error, "tower placement failed");
                    failure.get_or_insert(error);
                }
            }
        }
        match failure {
            Some(error) => Err(error),
            None => Ok(placed),
        }
    }

    /// Sets `field` of a tower family's descriptor. Live towers of that
    /// family pick up the new descriptor immediately.
    pub fn upgrade(
        &mut self,
        type_id: TowerTypeId,
        field: DescriptorField,
        value: impl Into<FieldValue>,
    ) -> bool {
        let applied = self.cache.modify(type_id, field, value);
        if applied {
            self.apply_refreshes();
        }
        applied
    }

    /// [`upgrade`](Self::upgrade) addressed by field name, e.g. `"Damage"`.
    pub fn upgrade_by_name(
        &mut self,
        type_id: TowerTypeId,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> bool {
        let applied = self.cache.modify_by_name(type_id, field, value);
        if applied {
            self.apply_refreshes();
        }
        applied
    }

    fn launch_placements(&mut self) {
        while let Ok(request) = self.placements.try_recv() {
            let type_id = request.card_id;
            let Some(cell) = self.world.grid().cell_at(request.world_position) else {
                tracing::debug!(%type_id, position = ?request.world_position, "card dropped outside the grid");
                continue;
            };
            if self.world.grid().is_busy(cell) {
                tracing::debug!(%type_id, %cell, "card dropped on a busy cell");
                continue;
            }

            let cache = self.cache.clone();
            self.loads.spawn(async move {
                let descriptor = cache.get_or_create(&request.record).await;
                PlacementLoad {
                    request,
                    cell,
                    descriptor,
                }
            });
        }
    }

    /// Places the tower of a finished load if its cell is still free.
    ///
    /// Returns `Ok(false)` when the placement is dropped.
    fn apply_load(&mut self, load: PlacementLoad) -> Result<bool> {
        let type_id = load.request.card_id;
        let descriptor = match load.descriptor {
            Ok(descriptor) => descriptor,
            Err(error) => {
                tracing::warn!(%type_id, %error, "descriptor load failed, placement dropped");
                return Ok(false);
            }
        };
        if self.world.grid().is_busy(load.cell) {
            tracing::debug!(
                %type_id,
                cell = %load.cell,
                "cell taken while loading, placement discarded"
            );
            return Ok(false);
        }

        let strategies = self.strategies.tower(type_id);
        let id = self.world.spawn_tower(load.cell, descriptor, strategies)?;
        tracing::info!(entity = %id, %type_id, cell = %load.cell, "tower placed");
        Ok(true)
    }

    fn apply_refreshes(&mut self) {
        while let Ok(type_id) = self.refreshes.try_recv() {
            let Some(descriptor) = self.cache.get(type_id) else {
                continue;
            };
            let refreshed = self.world.refresh_descriptor(&descriptor);
            tracing::debug!(%type_id, refreshed, "live towers refreshed");
        }
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.bus.unsubscribe(Topic::CardUpdate, self.card_updates);
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    resolver: Option<Arc<dyn AssetResolver>>,
    strategies: Option<StrategyLibrary>,
    bus: Option<EventBus>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            resolver: None,
            strategies: None,
            bus: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the required asset resolver
    pub fn resolver(mut self, resolver: Arc<dyn AssetResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Override the strategy library (default: arrow towers, melee enemies)
    pub fn strategies(mut self, strategies: StrategyLibrary) -> Self {
        self.strategies = Some(strategies);
        self
    }

    /// Share an existing event bus instead of creating one
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Build the runtime
    pub fn build(self) -> Result<Runtime> {
        let resolver = self.resolver.ok_or(RuntimeError::MissingResolver)?;
        let config = self.config;
        let bus = self.bus.unwrap_or_default();

        let cache = FlyweightCache::with_options(
            resolver,
            bus.clone(),
            config.asset_layout.clone(),
            config.asset_policy,
        );

        let (placement_tx, placements) = mpsc::unbounded_channel();
        let hand = Hand::new(config.hand_layout, config.drag, bus.clone(), placement_tx);

        let database = Arc::new(RwLock::new(CardDatabase::default()));
        let (refresh_tx, refreshes) = mpsc::unbounded_channel();
        let card_updates = {
            let database = Arc::clone(&database);
            bus.subscribe(Topic::CardUpdate, move |event| {
                if let Event::CardUpdate(record) = event {
                    database
                        .write()
                        .unwrap_or_else(PoisonError::into_inner)
                        .apply_update(record.clone());
                    // Receiver is gone only once the runtime is dropped
                    let _ = refresh_tx.send(record.card_id);
                }
            })
        };

        let game_config = &config.game_config;
        let spawner = config.spawner_enabled.then(|| {
            let prefabs = game_config.enemies.keys().map(PrefabId::new).collect();
            EnemySpawner::new(&game_config.spawner, prefabs, config.spawn_seed)
        });

        tracing::info!(
            columns = game_config.grid.columns,
            rows = game_config.grid.rows,
            policy = ?config.asset_policy,
            spawner = config.spawner_enabled,
            "runtime built"
        );

        Ok(Runtime {
            bus,
            cache,
            strategies: self.strategies.unwrap_or_default(),
            world: World::new(game_config),
            hand,
            database,
            spawner,
            placements,
            refreshes,
            loads: JoinSet::new(),
            card_updates,
        })
    }
}
