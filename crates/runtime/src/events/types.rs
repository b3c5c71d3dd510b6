//! Payloads carried by card and hand events.

use game_core::{TowerTypeId, Vec2};
use serde::{Deserialize, Serialize};

/// A card was picked up from the hand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardDragEvent {
    pub card_id: TowerTypeId,
    /// Hand-space position of the card when the drag started.
    pub position: Vec2,
}

/// A dragged card was released.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardDropEvent {
    pub card_id: TowerTypeId,
    /// Board position under the pointer at release.
    pub world_position: Vec2,
}

/// Laid-out position of one card in the hand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardSlot {
    pub card_id: TowerTypeId,
    pub position: Vec2,
}

/// Hand contents after a layout pass, left to right.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandSnapshot {
    pub cards: Vec<CardSlot>,
}
