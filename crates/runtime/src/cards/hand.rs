use game_core::{CardRecord, TowerTypeId, Vec2};
use tokio::sync::mpsc::UnboundedSender;

use super::controller::{CardController, Pointer};
use super::drag::{CardDrag, DragSettings};
use super::view::{CardView, PlacementRequest};
use crate::events::{CardSlot, Event, EventBus, HandSnapshot};

/// Horizontal layout of the hand, in hand units centred on zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandLayout {
    /// Width of the hand area.
    pub width: f32,
    pub card_width: f32,
    /// Gap between cards when they fit.
    pub base_spacing: f32,
    /// Margin kept free at both edges of the hand area.
    pub border_padding: f32,
    /// Largest allowed overlap, as a fraction of the card width.
    pub max_overlap_factor: f32,
}

impl Default for HandLayout {
    fn default() -> Self {
        Self {
            width: 1080.0,
            card_width: 150.0,
            base_spacing: 20.0,
            border_padding: 30.0,
            max_overlap_factor: 1.0,
        }
    }
}

impl HandLayout {
    /// Positions of `count` cards, left to right.
    ///
    /// Cards keep `base_spacing` while they fit inside the padded width and
    /// start overlapping once they don't, never by more than
    /// `max_overlap_factor` card widths.
    pub fn positions(&self, count: usize) -> Vec<Vec2> {
        if count == 0 {
            return Vec::new();
        }

        let n = count as f32;
        let available = self.width - 2.0 * self.border_padding;
        let total = n * self.card_width + (n - 1.0) * self.base_spacing;

        let mut spacing = self.base_spacing;
        if total > available && count > 1 {
            let fitted = (available - n * self.card_width) / (n - 1.0);
            spacing = fitted.max(-self.card_width * self.max_overlap_factor);
        }

        let hand_width = n * self.card_width + (n - 1.0) * spacing;
        let start = -hand_width / 2.0 + self.card_width / 2.0;
        (0..count)
            .map(|i| Vec2::new(start + i as f32 * (self.card_width + spacing), 0.0))
            .collect()
    }
}

/// The player's hand: one started [`CardController`] per card.
///
/// Every change to the set of cards re-runs the layout and publishes
/// `HandUpdate`.
pub struct Hand {
    layout: HandLayout,
    drag: DragSettings,
    bus: EventBus,
    placements: UnboundedSender<PlacementRequest>,
    cards: Vec<CardController>,
}

impl Hand {
    pub fn new(
        layout: HandLayout,
        drag: DragSettings,
        bus: EventBus,
        placements: UnboundedSender<PlacementRequest>,
    ) -> Self {
        Self {
            layout,
            drag,
            bus,
            placements,
            cards: Vec::new(),
        }
    }

    /// Adds one card per record, then lays out once.
    pub fn populate(&mut self, records: &[CardRecord]) {
        for record in records {
            let card = self.build(record.clone());
            self.cards.push(card);
        }
        tracing::debug!(cards = self.cards.len(), "hand populated");
        self.relayout();
    }

    pub fn add(&mut self, record: CardRecord) {
        let card = self.build(record);
        self.cards.push(card);
        self.relayout();
    }

    /// Destroys the first card of `card_id`. Returns false if no such card.
    pub fn remove(&mut self, card_id: TowerTypeId) -> bool {
        let Some(index) = self.cards.iter().position(|c| c.card_id() == card_id) else {
            return false;
        };
        let mut card = self.cards.remove(index);
        card.destroy();
        self.relayout();
        true
    }

    pub fn update(&mut self, delta: f32) {
        for card in &mut self.cards {
            card.update(delta);
        }
    }

    /// Routes a pointer gesture to the card of `card_id`.
    pub fn pointer(&mut self, card_id: TowerTypeId, pointer: Pointer) -> bool {
        match self.cards.iter_mut().find(|c| c.card_id() == card_id) {
            Some(card) => {
                card.pointer(pointer);
                true
            }
            None => false,
        }
    }

    pub fn card(&self, card_id: TowerTypeId) -> Option<&CardController> {
        self.cards.iter().find(|c| c.card_id() == card_id)
    }

    pub fn contains(&self, card_id: TowerTypeId) -> bool {
        self.card(card_id).is_some()
    }

    pub fn cards(&self) -> &[CardController] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn layout(&self) -> &HandLayout {
        &self.layout
    }

    pub fn snapshot(&self) -> HandSnapshot {
        HandSnapshot {
            cards: self
                .cards
                .iter()
                .map(|card| CardSlot {
                    card_id: card.card_id(),
                    position: card.state().position,
                })
                .collect(),
        }
    }

    fn build(&self, record: CardRecord) -> CardController {
        let mut card = CardController::new(record, self.bus.clone())
            .with_component(CardView::new(self.placements.clone()))
            .with_component(CardDrag::new(self.drag));
        card.start();
        card
    }

    fn relayout(&mut self) {
        if self.cards.is_empty() {
            return;
        }
        let positions = self.layout.positions(self.cards.len());
        for (card, position) in self.cards.iter_mut().zip(positions) {
            card.set_position(position);
        }
        self.bus.publish(Event::HandUpdate(self.snapshot()));
    }
}

impl Drop for Hand {
    fn drop(&mut self) {
        for card in &mut self.cards {
            card.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::sync::mpsc;

    use super::*;
    use crate::events::Topic;

    fn layout(width: f32) -> HandLayout {
        HandLayout {
            width,
            card_width: 100.0,
            ..HandLayout::default()
        }
    }

    fn xs(positions: Vec<Vec2>) -> Vec<f32> {
        positions.into_iter().map(|p| p.x).collect()
    }

    #[test]
    fn cards_that_fit_keep_base_spacing() {
        assert_eq!(xs(layout(1000.0).positions(3)), [-120.0, 0.0, 120.0]);
        assert_eq!(xs(layout(1000.0).positions(1)), [0.0]);
        assert!(layout(1000.0).positions(0).is_empty());
    }

    #[test]
    fn overflowing_cards_overlap_to_fit() {
        assert_eq!(
            xs(layout(460.0).positions(5)),
            [-150.0, -75.0, 0.0, 75.0, 150.0]
        );
    }

    #[test]
    fn overlap_is_capped() {
        let capped = HandLayout {
            max_overlap_factor: 0.1,
            ..layout(460.0)
        };
        assert_eq!(xs(capped.positions(5)), [-180.0, -90.0, 0.0, 90.0, 180.0]);
    }

    fn hand_with_updates() -> (Hand, Arc<Mutex<Vec<HandSnapshot>>>) {
        let bus = EventBus::new();
        let updates = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&updates);
        bus.subscribe(Topic::HandUpdate, move |event| {
            if let Event::HandUpdate(snapshot) = event {
                sink.lock().unwrap().push(snapshot.clone());
            }
        });
        let (tx, _rx) = mpsc::unbounded_channel();
        let hand = Hand::new(layout(1000.0), DragSettings::default(), bus, tx);
        (hand, updates)
    }

    fn record(id: u32) -> CardRecord {
        CardRecord {
            card_id: TowerTypeId(id),
            ..CardRecord::default()
        }
    }

    #[test]
    fn populate_lays_out_once() {
        let (mut hand, updates) = hand_with_updates();

        hand.populate(&[record(1), record(2), record(3)]);

        let updates = updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(
            updates[0].cards.iter().map(|s| s.position.x).collect::<Vec<_>>(),
            [-120.0, 0.0, 120.0]
        );
        assert_eq!(updates[0].cards[2].card_id, TowerTypeId(3));
    }

    #[test]
    fn removing_a_card_relayouts_the_rest() {
        let (mut hand, updates) = hand_with_updates();
        hand.populate(&[record(1), record(2)]);

        assert!(hand.remove(TowerTypeId(1)));
        assert!(!hand.remove(TowerTypeId(1)));

        assert_eq!(hand.len(), 1);
        assert_eq!(hand.card(TowerTypeId(2)).unwrap().state().position, Vec2::ZERO);
        assert_eq!(updates.lock().unwrap().len(), 2);
    }
}
