use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use game_core::{
    CardRecord, DescriptorField, DescriptorVisuals, FieldValue, ModifyError, TowerDescriptor,
    TowerTypeId, Visual,
};
use tokio::sync::OnceCell;
use tokio::task::JoinSet;

use super::FlyweightError;
use crate::assets::{AssetLayout, AssetResolver};
use crate::events::{Event, EventBus};

/// What a descriptor build does when one of its assets fails to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssetPolicy {
    /// Log the failure and keep building with a placeholder visual.
    #[default]
    Placeholder,
    /// Fail the whole build.
    Strict,
}

type PendingBuild = Arc<OnceCell<Arc<TowerDescriptor>>>;

struct Shared {
    resolver: Arc<dyn AssetResolver>,
    layout: AssetLayout,
    policy: AssetPolicy,
    bus: EventBus,
    ready: RwLock<HashMap<TowerTypeId, Arc<TowerDescriptor>>>,
    pending: Mutex<HashMap<TowerTypeId, PendingBuild>>,
    builds: AtomicUsize,
}

/// Process-wide tower descriptor cache.
///
/// Clones share the same table.
#[derive(Clone)]
pub struct FlyweightCache {
    shared: Arc<Shared>,
}

impl FlyweightCache {
    pub fn new(resolver: Arc<dyn AssetResolver>, bus: EventBus) -> Self {
        Self::with_options(resolver, bus, AssetLayout::default(), AssetPolicy::default())
    }

    pub fn with_options(
        resolver: Arc<dyn AssetResolver>,
        bus: EventBus,
        layout: AssetLayout,
        policy: AssetPolicy,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                resolver,
                layout,
                policy,
                bus,
                ready: RwLock::new(HashMap::new()),
                pending: Mutex::new(HashMap::new()),
                builds: AtomicUsize::new(0),
            }),
        }
    }

    pub fn get(&self, type_id: TowerTypeId) -> Option<Arc<TowerDescriptor>> {
        self.shared
            .ready
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .cloned()
    }

    pub fn contains(&self, type_id: TowerTypeId) -> bool {
        self.get(type_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.shared
            .ready
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of descriptors constructed since the cache was created.
    pub fn builds(&self) -> usize {
        self.shared.builds.load(Ordering::SeqCst)
    }

    pub fn policy(&self) -> AssetPolicy {
        self.shared.policy
    }

    /// Returns the descriptor for `record`'s type, building it on a miss.
    ///
    /// Every caller that misses while a build for the same type is in flight
    /// awaits that build instead of starting another one.
    pub async fn get_or_create(
        &self,
        record: &CardRecord,
    ) -> Result<Arc<TowerDescriptor>, FlyweightError> {
        let type_id = record.card_id;
        if let Some(descriptor) = self.get(type_id) {
            return Ok(descriptor);
        }

        let build = {
            let mut pending = self
                .shared
                .pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            // A build may have been published since the lookup above.
            if let Some(descriptor) = self.get(type_id) {
                return Ok(descriptor);
            }
            Arc::clone(pending.entry(type_id).or_default())
        };
        let result = build
            .get_or_try_init(|| self.build(record))
            .await
            .cloned();
        self.finish(type_id, &build, result)
    }

    /// Builds every uncached descriptor in `records` concurrently.
    ///
    /// All builds are joined before returning. Returns the number of
    /// descriptors built, or the first failure.
    pub async fn preload(&self, records: &[CardRecord]) -> Result<usize, FlyweightError> {
        let mut scheduled = HashSet::new();
        let mut builds = JoinSet::new();
        for record in records {
            if self.contains(record.card_id) || !scheduled.insert(record.card_id) {
                continue;
            }
            let cache = self.clone();
            let record = record.clone();
            builds.spawn(async move { cache.get_or_create(&record).await });
        }

        let mut built = 0;
        let mut failure = None;
        while let Some(joined) = builds.join_next().await {
            match joined {
                Ok(Ok(_)) => built += 1,
                Ok(Err(error)) => {
                    tracing::error!(%error, "descriptor preload failed");
                    failure.get_or_insert(error);
                }
                Err(error) => {
                    failure.get_or_insert(FlyweightError::Task(error));
                }
            }
        }

        match failure {
            Some(error) => Err(error),
            None => {
                tracing::info!(built, cached = self.len(), "descriptors preloaded");
                Ok(built)
            }
        }
    }

    /// Replaces the descriptor of `type_id` with a copy that has `field` set
    /// to `value`, then publishes one [`Event::CardUpdate`].
    ///
    /// On failure the cache is unchanged and nothing is published.
    pub fn try_modify(
        &self,
        type_id: TowerTypeId,
        field: DescriptorField,
        value: impl Into<FieldValue>,
    ) -> Result<Arc<TowerDescriptor>, FlyweightError> {
        let updated = {
            let mut ready = self
                .shared
                .ready
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let current = ready
                .get(&type_id)
                .ok_or(FlyweightError::UnknownType(type_id))?;
            let mut next = TowerDescriptor::clone(current);
            next.apply(field, value.into())
                .map_err(|source| FlyweightError::Modify { type_id, source })?;
            let next = Arc::new(next);
            ready.insert(type_id, Arc::clone(&next));
            next
        };

        tracing::info!(%type_id, %field, "tower descriptor modified");
        self.shared.bus.publish(Event::CardUpdate(updated.to_record()));
        Ok(updated)
    }

    /// [`try_modify`](Self::try_modify), logging the failure.
    pub fn modify(
        &self,
        type_id: TowerTypeId,
        field: DescriptorField,
        value: impl Into<FieldValue>,
    ) -> bool {
        match self.try_modify(type_id, field, value) {
            Ok(_) => true,
            Err(error) => {
                tracing::warn!(%type_id, %field, %error, "descriptor modification rejected");
                false
            }
        }
    }

    /// [`modify`](Self::modify) addressed by a field name such as `"Damage"`
    /// or `"horizontal_range"`.
    pub fn modify_by_name(
        &self,
        type_id: TowerTypeId,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> bool {
        match DescriptorField::from_str(field) {
            Ok(field) => self.modify(type_id, field, value),
            Err(_) => {
                let error = ModifyError::UnknownField(field.to_string());
                tracing::warn!(%type_id, %error, "descriptor modification rejected");
                false
            }
        }
    }

    async fn build(&self, record: &CardRecord) -> Result<Arc<TowerDescriptor>, FlyweightError> {
        let type_id = record.card_id;
        let layout = &self.shared.layout;

        let (tower_sprite, card_icon, type_icon, projectile_sprite) = tokio::join!(
            self.resolve_visual(
                type_id,
                format!("Tower_{type_id}"),
                layout.tower_sprite(type_id)
            ),
            self.resolve_visual(
                type_id,
                record.card_icon.clone(),
                layout.card_icon(&record.card_icon)
            ),
            self.resolve_visual(type_id, record.kind.clone(), layout.type_icon(&record.kind)),
            self.resolve_visual(
                type_id,
                record.projectile_sprite.clone(),
                layout.projectile_sprite(&record.projectile_sprite)
            ),
        );
        let visuals = DescriptorVisuals {
            tower_sprite: tower_sprite?,
            card_icon: card_icon?,
            type_icon: type_icon?,
            projectile_sprite: projectile_sprite?,
        };

        let descriptor = TowerDescriptor::from_record(record, visuals);
        let builds = self.shared.builds.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(%type_id, builds, "tower descriptor built");
        Ok(Arc::new(descriptor))
    }

    async fn resolve_visual(
        &self,
        type_id: TowerTypeId,
        name: String,
        key: String,
    ) -> Result<Visual, FlyweightError> {
        let resolved = self.shared.resolver.resolve(&key).await;
        match (resolved, self.shared.policy) {
            (Ok(handle), _) => Ok(Visual::resolved(name, handle)),
            (Err(error), AssetPolicy::Placeholder) => {
                tracing::error!(%type_id, %key, %error, "asset load failed, using placeholder");
                Ok(Visual::placeholder(name))
            }
            (Err(source), AssetPolicy::Strict) => Err(FlyweightError::Asset {
                type_id,
                key,
                source,
            }),
        }
    }

    /// Publishes a finished build and retires its pending entry.
    ///
    /// Both happen under the pending lock, so a caller that takes the lock
    /// afterwards finds the descriptor instead of starting another build.
    fn finish(
        &self,
        type_id: TowerTypeId,
        build: &PendingBuild,
        result: Result<Arc<TowerDescriptor>, FlyweightError>,
    ) -> Result<Arc<TowerDescriptor>, FlyweightError> {
        let mut pending = self
            .shared
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let descriptor = result.map(|built| {
            let mut ready = self
                .shared
                .ready
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            Arc::clone(ready.entry(type_id).or_insert(built))
        });
        if pending
            .get(&type_id)
            .is_some_and(|current| Arc::ptr_eq(current, build))
        {
            pending.remove(&type_id);
        }
        descriptor
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use crate::assets::InMemoryAssets;

    use super::*;

    fn record(id: u32) -> CardRecord {
        CardRecord {
            card_id: TowerTypeId(id),
            card_icon: "bow".into(),
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

    fn update_counter(bus: &EventBus) -> Arc<Mutex<Vec<CardRecord>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.subscribe(crate::events::Topic::CardUpdate, move |event| {
            if let Event::CardUpdate(record) = event {
                sink.lock().unwrap().push(record.clone());
            }
        });
        seen
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_misses_build_once() {
        let assets = Arc::new(InMemoryAssets::permissive().with_latency(Duration::from_millis(20)));
        let cache = FlyweightCache::new(assets.clone(), EventBus::new());

        let mut callers = JoinSet::new();
        for _ in 0..8 {
            let cache = cache.clone();
            callers.spawn(async move { cache.get_or_create(&record(1)).await.unwrap() });
        }
        let mut results = Vec::new();
        while let Some(joined) = callers.join_next().await {
            results.push(joined.unwrap());
        }

        assert_eq!(cache.builds(), 1);
        assert_eq!(assets.loads(), 4);
        assert!(results.iter().all(|d| Arc::ptr_eq(d, &results[0])));
        assert!(Arc::ptr_eq(&results[0], &cache.get(TowerTypeId(1)).unwrap()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn misses_spread_over_a_finishing_build_still_build_once() {
        for _ in 0..50 {
            let assets =
                Arc::new(InMemoryAssets::permissive().with_latency(Duration::from_millis(1)));
            let cache = FlyweightCache::new(assets.clone(), EventBus::new());

            let mut callers = JoinSet::new();
            for i in 0..32u64 {
                let cache = cache.clone();
                callers.spawn(async move {
                    let delay = Duration::from_micros(i * 50);
                    let started = Instant::now();
                    while started.elapsed() < delay {
                        std::hint::spin_loop();
                    }
                    cache.get_or_create(&record(1)).await.unwrap()
                });
            }
            let mut results = Vec::new();
            while let Some(joined) = callers.join_next().await {
                results.push(joined.unwrap());
            }

            assert_eq!(cache.builds(), 1);
            assert_eq!(assets.loads(), 4);
            assert!(results.iter().all(|d| Arc::ptr_eq(d, &results[0])));
        }
    }

    #[tokio::test]
    async fn cache_hit_returns_the_shared_descriptor() {
        let cache = FlyweightCache::new(Arc::new(InMemoryAssets::permissive()), EventBus::new());

        let first = cache.get_or_create(&record(2)).await.unwrap();
        let second = cache.get_or_create(&record(2)).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.builds(), 1);
        assert_eq!(first.tower_sprite.name, "Tower_2");
        assert!(first.tower_sprite.is_resolved());
    }

    #[tokio::test]
    async fn preload_builds_each_uncached_type_once() {
        let cache = FlyweightCache::new(Arc::new(InMemoryAssets::permissive()), EventBus::new());
        cache.get_or_create(&record(1)).await.unwrap();

        let built = cache
            .preload(&[record(1), record(2), record(3), record(3)])
            .await
            .unwrap();

        assert_eq!(built, 2);
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.builds(), 3);
    }

    #[tokio::test]
    async fn missing_asset_falls_back_to_a_placeholder() {
        let layout = AssetLayout::default();
        let assets = InMemoryAssets::new().with_assets([
            layout.tower_sprite(TowerTypeId(1)),
            layout.card_icon("bow"),
            layout.type_icon("Ranged"),
        ]);
        let cache = FlyweightCache::new(Arc::new(assets), EventBus::new());

        let descriptor = cache.get_or_create(&record(1)).await.unwrap();

        assert!(descriptor.card_icon.is_resolved());
        assert!(!descriptor.projectile_sprite.is_resolved());
        assert_eq!(descriptor.projectile_sprite.name, "arrow");
    }

    #[tokio::test]
    async fn strict_policy_fails_the_build() {
        let cache = FlyweightCache::with_options(
            Arc::new(InMemoryAssets::new()),
            EventBus::new(),
            AssetLayout::default(),
            AssetPolicy::Strict,
        );

        let error = cache.get_or_create(&record(1)).await.unwrap_err();

        assert!(matches!(error, FlyweightError::Asset { .. }));
        assert!(cache.is_empty());
        assert_eq!(cache.builds(), 0);
    }

    #[tokio::test]
    async fn modify_unknown_type_publishes_nothing() {
        let bus = EventBus::new();
        let updates = update_counter(&bus);
        let cache = FlyweightCache::new(Arc::new(InMemoryAssets::permissive()), bus);

        assert!(!cache.modify(TowerTypeId(9), DescriptorField::Damage, 5));
        assert!(updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn modify_publishes_exactly_one_update() {
        let bus = EventBus::new();
        let updates = update_counter(&bus);
        let cache = FlyweightCache::new(Arc::new(InMemoryAssets::permissive()), bus);
        let before = cache.get_or_create(&record(1)).await.unwrap();

        assert!(cache.modify(TowerTypeId(1), DescriptorField::Damage, 5));

        let updates = updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].card_id, TowerTypeId(1));
        assert_eq!(updates[0].damage, 5);
        assert_eq!(before.damage, 2);
        assert_eq!(cache.get(TowerTypeId(1)).unwrap().damage, 5);
    }

    #[tokio::test]
    async fn invalid_modifications_leave_the_cache_unchanged() {
        let bus = EventBus::new();
        let updates = update_counter(&bus);
        let cache = FlyweightCache::new(Arc::new(InMemoryAssets::permissive()), bus);
        let before = cache.get_or_create(&record(1)).await.unwrap();

        assert!(!cache.modify(TowerTypeId(1), DescriptorField::TypeId, 4));
        assert!(!cache.modify(TowerTypeId(1), DescriptorField::Damage, 0.5_f32));
        assert!(!cache.modify_by_name(TowerTypeId(1), "Dmg", 4));

        assert!(Arc::ptr_eq(&before, &cache.get(TowerTypeId(1)).unwrap()));
        assert!(updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn modify_by_name_accepts_card_list_names() {
        let cache = FlyweightCache::new(Arc::new(InMemoryAssets::permissive()), EventBus::new());
        cache.get_or_create(&record(1)).await.unwrap();

        assert!(cache.modify_by_name(TowerTypeId(1), "ManaCost", 7));
        assert!(cache.modify_by_name(TowerTypeId(1), "HorizontalCellsRange", 4));

        let descriptor = cache.get(TowerTypeId(1)).unwrap();
        assert_eq!(descriptor.mana_cost, 7);
        assert_eq!(descriptor.horizontal_range, 4);
    }
}
