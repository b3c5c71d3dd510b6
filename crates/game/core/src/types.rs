//! Identifiers and small value types shared by every simulation module.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

pub use glam::Vec2;

/// Unique identifier for a spawned entity.
///
/// Ids are allocated per spawn and never reused, so an id held by another
/// entity acts as a weak reference: once its owner despawns the id simply
/// stops resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a tower family (one card, one flyweight descriptor).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TowerTypeId(pub u32);

impl fmt::Display for TowerTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TowerTypeId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Identity of a pooled prefab ("tower", "projectile", "grunt", ...).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrefabId(Arc<str>);

impl PrefabId {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PrefabId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for PrefabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entity families driven by the world tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Tower,
    Enemy,
    Projectile,
}

bitflags! {
    /// Collision layers used as spatial query filters.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Layers: u8 {
        const TOWER      = 1 << 0;
        const ENEMY      = 1 << 1;
        const PROJECTILE = 1 << 2;
        const MAIN_BASE  = 1 << 3;
    }
}

impl From<EntityKind> for Layers {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Tower => Layers::TOWER,
            EntityKind::Enemy => Layers::ENEMY,
            EntityKind::Projectile => Layers::PROJECTILE,
        }
    }
}

/// Simulation clock sample for one frame, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameTime {
    /// Time elapsed since the world started.
    pub now: f32,
    /// Duration of the frame being simulated.
    pub delta: f32,
}

impl FrameTime {
    pub const fn new(now: f32, delta: f32) -> Self {
        Self { now, delta }
    }
}
