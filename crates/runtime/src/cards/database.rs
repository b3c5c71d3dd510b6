use game_core::{CardRecord, TowerTypeId};

/// The loaded card list, in load order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardDatabase {
    cards: Vec<CardRecord>,
}

impl CardDatabase {
    pub fn new(cards: Vec<CardRecord>) -> Self {
        Self { cards }
    }

    pub fn replace(&mut self, cards: Vec<CardRecord>) {
        self.cards = cards;
    }

    pub fn records(&self) -> &[CardRecord] {
        &self.cards
    }

    pub fn get(&self, card_id: TowerTypeId) -> Option<&CardRecord> {
        self.cards.iter().find(|card| card.card_id == card_id)
    }

    pub fn contains(&self, card_id: TowerTypeId) -> bool {
        self.get(card_id).is_some()
    }

    /// Overwrites the stored record with the same id. Returns false if the
    /// card is not in the list.
    pub fn apply_update(&mut self, record: CardRecord) -> bool {
        match self.cards.iter_mut().find(|card| card.card_id == record.card_id) {
            Some(card) => {
                *card = record;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32, mana_cost: i32) -> CardRecord {
        CardRecord {
            card_id: TowerTypeId(id),
            mana_cost,
            ..CardRecord::default()
        }
    }

    #[test]
    fn update_replaces_matching_record_only() {
        let mut database = CardDatabase::new(vec![record(1, 3), record(2, 4)]);

        assert!(database.apply_update(record(2, 9)));
        assert!(!database.apply_update(record(7, 1)));

        assert_eq!(database.len(), 2);
        assert_eq!(database.get(TowerTypeId(2)).map(|r| r.mana_cost), Some(9));
        assert_eq!(database.get(TowerTypeId(1)).map(|r| r.mana_cost), Some(3));
        assert!(!database.contains(TowerTypeId(7)));
    }
}
