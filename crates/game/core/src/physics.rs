//! Spatial queries against active colliders.
//!
//! Strategies only see the [`SpatialQuery`] trait. The world answers it with a
//! [`PhysicsSnapshot`] rebuilt from active entities before each phase of the
//! tick.

use std::collections::HashMap;

use crate::types::{EntityId, Layers, Vec2};

/// A collider matched by a query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub id: EntityId,
    pub position: Vec2,
    pub layer: Layers,
}

/// "What occupies this region" queries filtered by layer.
pub trait SpatialQuery {
    /// Every collider overlapping the axis-aligned box of `size` centred on
    /// `center`, in registration order.
    fn overlap_box(&self, center: Vec2, size: Vec2, mask: Layers) -> Vec<Hit>;

    /// First collider overlapping the circle.
    fn overlap_circle(&self, center: Vec2, radius: f32, mask: Layers) -> Option<Hit>;

    /// Current position of an entity, or `None` once it is gone.
    fn locate(&self, id: EntityId) -> Option<Hit>;
}

/// Circle collider registered in a snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collider {
    pub id: EntityId,
    pub position: Vec2,
    pub radius: f32,
    pub layer: Layers,
}

impl Collider {
    fn hit(&self) -> Hit {
        Hit {
            id: self.id,
            position: self.position,
            layer: self.layer,
        }
    }
}

/// Flat collider list answering [`SpatialQuery`] by linear scan.
#[derive(Clone, Debug, Default)]
pub struct PhysicsSnapshot {
    colliders: Vec<Collider>,
    index: HashMap<EntityId, usize>,
}

impl PhysicsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.colliders.clear();
        self.index.clear();
    }

    /// Registers a collider, replacing any previous one with the same id.
    pub fn insert(&mut self, collider: Collider) {
        match self.index.get(&collider.id) {
            Some(&slot) => self.colliders[slot] = collider,
            None => {
                self.index.insert(collider.id, self.colliders.len());
                self.colliders.push(collider);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    fn matching(&self, mask: Layers) -> impl Iterator<Item = &Collider> {
        self.colliders
            .iter()
            .filter(move |collider| mask.intersects(collider.layer))
    }
}

impl SpatialQuery for PhysicsSnapshot {
    fn overlap_box(&self, center: Vec2, size: Vec2, mask: Layers) -> Vec<Hit> {
        let half = size.abs() / 2.0;
        let min = center - half;
        let max = center + half;
        self.matching(mask)
            .filter(|collider| {
                let closest = collider.position.clamp(min, max);
                closest.distance_squared(collider.position) <= collider.radius * collider.radius
            })
            .map(Collider::hit)
            .collect()
    }

    fn overlap_circle(&self, center: Vec2, radius: f32, mask: Layers) -> Option<Hit> {
        self.matching(mask)
            .find(|collider| {
                let reach = radius + collider.radius;
                center.distance_squared(collider.position) <= reach * reach
            })
            .map(Collider::hit)
    }

    fn locate(&self, id: EntityId) -> Option<Hit> {
        self.index.get(&id).map(|&slot| self.colliders[slot].hit())
    }
}
