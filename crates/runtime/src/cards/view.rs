use game_core::{CardRecord, TowerTypeId, Vec2};
use tokio::sync::mpsc::UnboundedSender;

use super::controller::{CardComponent, CardState};
use crate::events::Event;

/// A card was dropped on the board and wants a tower at `world_position`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRequest {
    pub card_id: TowerTypeId,
    /// The card's record at the time of the drop.
    pub record: CardRecord,
    pub world_position: Vec2,
}

/// Displays a card's record and forwards its drops to the placement queue.
pub struct CardView {
    placements: UnboundedSender<PlacementRequest>,
}

impl CardView {
    pub fn new(placements: UnboundedSender<PlacementRequest>) -> Self {
        Self { placements }
    }
}

impl CardComponent for CardView {
    fn name(&self) -> &'static str {
        "view"
    }

    fn on_event(&mut self, card: &mut CardState, event: &Event) {
        match event {
            Event::CardEndDrag(drop) => {
                let request = PlacementRequest {
                    card_id: card.card_id(),
                    record: card.record.clone(),
                    world_position: drop.world_position,
                };
                if self.placements.send(request).is_err() {
                    tracing::warn!(type_id = %card.card_id(), "placement queue closed, drop ignored");
                }
            }
            Event::CardUpdate(record) => {
                tracing::debug!(type_id = %record.card_id, "card display refreshed");
                card.record = record.clone();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardController;
    use crate::events::{CardDropEvent, EventBus};
    use tokio::sync::mpsc;

    fn record(id: u32, damage: i32) -> CardRecord {
        CardRecord {
            card_id: TowerTypeId(id),
            damage,
            ..CardRecord::default()
        }
    }

    #[test]
    fn drop_queues_a_placement_with_the_current_record() {
        let bus = EventBus::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut controller = CardController::new(record(1, 2), bus.clone()).with_component(CardView::new(tx));
        controller.start();

        bus.publish(Event::CardUpdate(record(1, 5)));
        bus.publish(Event::CardEndDrag(CardDropEvent {
            card_id: TowerTypeId(1),
            world_position: Vec2::new(1.5, 2.5),
        }));
        controller.update(0.0);

        let request = rx.try_recv().unwrap();
        assert_eq!(request.card_id, TowerTypeId(1));
        assert_eq!(request.record.damage, 5);
        assert_eq!(request.world_position, Vec2::new(1.5, 2.5));
        assert!(rx.try_recv().is_err());
        assert_eq!(controller.state().record.damage, 5);
    }

    #[test]
    fn updates_for_other_cards_are_ignored() {
        let bus = EventBus::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut controller = CardController::new(record(1, 2), bus.clone()).with_component(CardView::new(tx));
        controller.start();

        bus.publish(Event::CardUpdate(record(2, 9)));
        controller.update(0.0);

        assert_eq!(controller.state().record.damage, 2);
    }
}
