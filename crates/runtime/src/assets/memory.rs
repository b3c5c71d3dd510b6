use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use game_core::AssetHandle;

use super::{AssetError, AssetResolver};

/// In-process asset table.
///
/// Used by tests and the headless client. Every resolve can be delayed by a
/// fixed latency to exercise concurrent loads, and a permissive table
/// resolves any key it is asked for.
#[derive(Debug, Default)]
pub struct InMemoryAssets {
    assets: RwLock<HashMap<String, AssetHandle>>,
    latency: Duration,
    permissive: bool,
    next_id: AtomicU64,
    loads: AtomicUsize,
}

impl InMemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table resolving every key, registering it on first use.
    pub fn permissive() -> Self {
        Self {
            permissive: true,
            ..Self::default()
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Registers `key`, returning its handle. Re-inserting a key keeps the
    /// first handle.
    pub fn insert(&self, key: impl Into<String>) -> AssetHandle {
        let key = key.into();
        let mut assets = self.assets.write().unwrap_or_else(PoisonError::into_inner);
        assets
            .entry(key)
            .or_insert_with_key(|key| {
                AssetHandle::new(key, self.next_id.fetch_add(1, Ordering::Relaxed))
            })
            .clone()
    }

    pub fn with_assets<I, K>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        for key in keys {
            self.insert(key);
        }
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.assets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Number of resolve calls served so far.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetResolver for InMemoryAssets {
    async fn resolve(&self, key: &str) -> Result<AssetHandle, AssetError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let found = self
            .assets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned();
        match found {
            Some(handle) => Ok(handle),
            None if self.permissive => Ok(self.insert(key)),
            None => Err(AssetError::NotFound(key.to_string())),
        }
    }
}
