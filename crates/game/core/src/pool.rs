//! Reusable-instance pools keyed by prefab identity.
//!
//! [`ObjectPool`] hands out generational handles into a slot arena. A slot is
//! either on the free queue (inactive) or handed out (active), never both;
//! stale handles are rejected by their generation.
//!
//! The pool never resets the values it stores. Re-initializing a reused
//! instance is the caller's job.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use crate::error::{ErrorSeverity, GameError};
use crate::types::PrefabId;

/// Generational reference to a pooled slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    slot: u32,
    generation: u32,
}

impl PoolHandle {
    #[inline]
    pub fn slot(self) -> u32 {
        self.slot
    }

    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for PoolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.slot, self.generation)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("handle {0} is not tracked by this pool")]
    NotTracked(PoolHandle),

    #[error("prefab '{0}' has no registered pool")]
    UnknownPrefab(PrefabId),
}

impl GameError for PoolError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotTracked(_) => "POOL_NOT_TRACKED",
            Self::UnknownPrefab(_) => "POOL_UNKNOWN_PREFAB",
        }
    }
}

struct Slot<T> {
    value: T,
    generation: u32,
    active: bool,
}

type Factory<T> = Box<dyn FnMut() -> T + Send>;

/// Pool of reusable instances of one prefab.
pub struct ObjectPool<T> {
    slots: Vec<Slot<T>>,
    free: VecDeque<u32>,
    factory: Factory<T>,
    constructed: usize,
}

impl<T> ObjectPool<T> {
    pub fn new(factory: impl FnMut() -> T + Send + 'static) -> Self {
        Self {
            slots: Vec::new(),
            free: VecDeque::new(),
            factory: Box::new(factory),
            constructed: 0,
        }
    }

    /// Pool with `count` instances constructed up front.
    pub fn with_prewarm(count: usize, factory: impl FnMut() -> T + Send + 'static) -> Self {
        let mut pool = Self::new(factory);
        pool.prewarm(count);
        pool
    }

    /// Constructs `count` inactive instances and queues them as free.
    pub fn prewarm(&mut self, count: usize) {
        self.slots.reserve(count);
        for _ in 0..count {
            let slot = self.construct();
            self.free.push_back(slot);
        }
    }

    /// Hands out a free instance, constructing one if the free queue is empty.
    pub fn acquire(&mut self) -> PoolHandle {
        self.acquire_mut().0
    }

    /// Like [`acquire`](Self::acquire), also borrowing the instance for
    /// re-initialization.
    pub fn acquire_mut(&mut self) -> (PoolHandle, &mut T) {
        let index = match self.free.pop_front() {
            Some(index) => index,
            None => self.construct(),
        };
        let slot = &mut self.slots[index as usize];
        slot.generation = slot.generation.wrapping_add(1);
        slot.active = true;
        let handle = PoolHandle {
            slot: index,
            generation: slot.generation,
        };
        (handle, &mut slot.value)
    }

    /// Returns an instance to the free queue.
    ///
    /// Fails without side effects if `handle` is stale, foreign, or already
    /// released.
    pub fn release(&mut self, handle: PoolHandle) -> Result<(), PoolError> {
        match self.slots.get_mut(handle.slot as usize) {
            Some(slot) if slot.active && slot.generation == handle.generation => {
                slot.active = false;
                self.free.push_back(handle.slot);
                Ok(())
            }
            _ => Err(PoolError::NotTracked(handle)),
        }
    }

    pub fn is_active(&self, handle: PoolHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.slots
            .get(handle.slot as usize)
            .filter(|slot| slot.active && slot.generation == handle.generation)
            .map(|slot| &slot.value)
    }

    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.slot as usize)
            .filter(|slot| slot.active && slot.generation == handle.generation)
            .map(|slot| &mut slot.value)
    }

    pub fn iter_active(&self) -> impl Iterator<Item = (PoolHandle, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .map(|(index, slot)| (Self::handle_of(index, slot), &slot.value))
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (PoolHandle, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .map(|(index, slot)| (Self::handle_of(index, slot), &mut slot.value))
    }

    /// Number of instances waiting on the free queue.
    #[inline]
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Number of instances currently handed out.
    #[inline]
    pub fn active_len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Total number of instances ever constructed by this pool.
    #[inline]
    pub fn constructed(&self) -> usize {
        self.constructed
    }

    fn construct(&mut self) -> u32 {
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            value: (self.factory)(),
            generation: 0,
            active: false,
        });
        self.constructed += 1;
        index
    }

    fn handle_of(index: usize, slot: &Slot<T>) -> PoolHandle {
        PoolHandle {
            slot: index as u32,
            generation: slot.generation,
        }
    }
}

/// Handle to an instance owned by a [`PoolRegistry`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pooled {
    pub prefab: PrefabId,
    pub handle: PoolHandle,
}

/// Pools of one value type, keyed by prefab.
pub struct PoolRegistry<T> {
    pools: BTreeMap<PrefabId, ObjectPool<T>>,
}

impl<T> Default for PoolRegistry<T> {
    fn default() -> Self {
        Self {
            pools: BTreeMap::new(),
        }
    }
}

impl<T> PoolRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates (or replaces) the pool for `prefab`, pre-warmed with `prewarm`
    /// instances.
    pub fn register(
        &mut self,
        prefab: PrefabId,
        prewarm: usize,
        factory: impl FnMut() -> T + Send + 'static,
    ) {
        tracing::debug!(%prefab, prewarm, "registered pool");
        self.pools
            .insert(prefab, ObjectPool::with_prewarm(prewarm, factory));
    }

    pub fn contains(&self, prefab: &PrefabId) -> bool {
        self.pools.contains_key(prefab)
    }

    pub fn pool(&self, prefab: &PrefabId) -> Option<&ObjectPool<T>> {
        self.pools.get(prefab)
    }

    /// Acquires an instance of `prefab` for re-initialization.
    ///
    /// Logs a warning and returns `None` for an unregistered prefab.
    pub fn spawn(&mut self, prefab: &PrefabId) -> Option<(Pooled, &mut T)> {
        let Some(pool) = self.pools.get_mut(prefab) else {
            tracing::warn!(%prefab, "no pool registered for prefab");
            return None;
        };
        let (handle, value) = pool.acquire_mut();
        let pooled = Pooled {
            prefab: prefab.clone(),
            handle,
        };
        Some((pooled, value))
    }

    /// Returns an instance to its pool. Logs a warning and returns false when
    /// the instance is not tracked.
    pub fn despawn(&mut self, pooled: &Pooled) -> bool {
        let result = match self.pools.get_mut(&pooled.prefab) {
            Some(pool) => pool.release(pooled.handle),
            None => Err(PoolError::UnknownPrefab(pooled.prefab.clone())),
        };
        match result {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(prefab = %pooled.prefab, error = %err, "despawn ignored");
                false
            }
        }
    }

    pub fn get(&self, pooled: &Pooled) -> Option<&T> {
        self.pools.get(&pooled.prefab)?.get(pooled.handle)
    }

    pub fn get_mut(&mut self, pooled: &Pooled) -> Option<&mut T> {
        self.pools.get_mut(&pooled.prefab)?.get_mut(pooled.handle)
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &T> {
        self.pools
            .values()
            .flat_map(|pool| pool.iter_active().map(|(_, value)| value))
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.pools
            .values_mut()
            .flat_map(|pool| pool.iter_active_mut().map(|(_, value)| value))
    }

    pub fn active_len(&self) -> usize {
        self.pools.values().map(ObjectPool::active_len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counted() -> (ObjectPool<usize>, Arc<AtomicUsize>) {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);
        let pool = ObjectPool::new(move || counter.fetch_add(1, Ordering::SeqCst));
        (pool, built)
    }

    #[test]
    fn first_acquire_constructs_exactly_one_instance() {
        let (mut pool, built) = counted();

        let handle = pool.acquire();

        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert_eq!(pool.constructed(), 1);
        assert!(pool.is_active(handle));
    }

    #[test]
    fn release_then_acquire_reuses_the_same_instance() {
        let (mut pool, built) = counted();
        let first = pool.acquire();
        *pool.get_mut(first).unwrap() = 42;
        let free_before = pool.free_len();

        pool.release(first).unwrap();
        let second = pool.acquire();

        assert_eq!(second.slot(), first.slot());
        assert_eq!(pool.get(second), Some(&42));
        assert!(pool.is_active(second));
        assert_eq!(pool.free_len(), free_before);
        assert_eq!(built.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stale_and_double_release_are_rejected() {
        let (mut pool, _) = counted();
        let first = pool.acquire();
        pool.release(first).unwrap();

        assert_eq!(pool.release(first), Err(PoolError::NotTracked(first)));

        let second = pool.acquire();
        assert!(pool.get(first).is_none());
        assert_eq!(pool.release(first), Err(PoolError::NotTracked(first)));
        assert!(pool.is_active(second));
        assert_eq!(pool.free_len(), 0);
    }

    #[test]
    fn prewarmed_instances_start_inactive() {
        let pool = ObjectPool::with_prewarm(3, || 0u8);

        assert_eq!(pool.constructed(), 3);
        assert_eq!(pool.free_len(), 3);
        assert_eq!(pool.active_len(), 0);
        assert_eq!(pool.iter_active().count(), 0);
    }

    #[test]
    fn registry_ignores_unknown_prefabs() {
        let mut registry: PoolRegistry<u8> = PoolRegistry::new();
        registry.register(PrefabId::new("tower"), 0, || 0);

        assert!(registry.spawn(&PrefabId::new("dragon")).is_none());

        let (tower, _) = registry.spawn(&PrefabId::new("tower")).unwrap();
        let foreign = Pooled {
            prefab: PrefabId::new("dragon"),
            handle: tower.handle,
        };
        assert!(!registry.despawn(&foreign));
        assert!(registry.despawn(&tower));
        assert!(!registry.despawn(&tower));
        assert_eq!(registry.active_len(), 0);
    }
}
