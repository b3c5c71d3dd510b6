//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use game_core::{CardRecord, TowerTypeId, WorldEvent};
use serde::{Deserialize, Serialize};

use super::types::{CardDragEvent, CardDropEvent, HandSnapshot};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// The card list finished loading and its descriptors are cached
    CardsLoaded,
    /// The hand layout changed
    HandUpdate,
    /// A card started being dragged
    CardDrag,
    /// A card was released over the board
    CardEndDrag,
    /// A card's stats changed
    CardUpdate,
    /// Entities spawned, damaged or despawned
    Simulation,
}

/// Event wrapper that carries the topic and typed payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    CardsLoaded(Vec<CardRecord>),
    HandUpdate(HandSnapshot),
    CardDrag(CardDragEvent),
    CardEndDrag(CardDropEvent),
    /// Rehydrated record of a descriptor that was just modified.
    CardUpdate(CardRecord),
    Simulation(WorldEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::CardsLoaded(_) => Topic::CardsLoaded,
            Event::HandUpdate(_) => Topic::HandUpdate,
            Event::CardDrag(_) => Topic::CardDrag,
            Event::CardEndDrag(_) => Topic::CardEndDrag,
            Event::CardUpdate(_) => Topic::CardUpdate,
            Event::Simulation(_) => Topic::Simulation,
        }
    }

    /// Card this event is about, for card-scoped topics.
    pub fn card_id(&self) -> Option<TowerTypeId> {
        match self {
            Event::CardDrag(drag) => Some(drag.card_id),
            Event::CardEndDrag(drop) => Some(drop.card_id),
            Event::CardUpdate(record) => Some(record.card_id),
            Event::CardsLoaded(_) | Event::HandUpdate(_) | Event::Simulation(_) => None,
        }
    }
}

/// Token returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    topics: HashMap<Topic, Vec<(SubscriptionId, Handler)>>,
}

/// Topic-based event bus
///
/// Handlers run synchronously on the publisher's stack, in subscription
/// order. The handler list of a topic is snapshotted before dispatch, so a
/// handler may subscribe, unsubscribe or publish without deadlocking; changes
/// take effect from the next publish.
///
/// Clones share the same subscriber table.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<RwLock<Subscribers>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `topic`.
    pub fn subscribe(
        &self,
        topic: Topic,
        handler: impl Fn(&Event) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let id = SubscriptionId(subscribers.next_id);
        subscribers.next_id += 1;
        subscribers
            .topics
            .entry(topic)
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Removes a subscription. Returns false when it was not subscribed to
    /// `topic`.
    pub fn unsubscribe(&self, topic: Topic, id: SubscriptionId) -> bool {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(handlers) = subscribers.topics.get_mut(&topic) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(subscription, _)| *subscription != id);
        before != handlers.len()
    }

    /// Publish an event to its corresponding topic
    ///
    /// Returns the number of handlers invoked.
    pub fn publish(&self, event: Event) -> usize {
        let topic = event.topic();
        let handlers: Vec<Handler> = {
            let subscribers = self
                .subscribers
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            match subscribers.topics.get(&topic) {
                Some(handlers) => handlers.iter().map(|(_, h)| Arc::clone(h)).collect(),
                None => Vec::new(),
            }
        };

        if handlers.is_empty() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
            return 0;
        }

        for handler in &handlers {
            handler(&event);
        }
        handlers.len()
    }

    /// Number of live subscriptions on `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .topics
            .get(&topic)
            .map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use game_core::{Vec2, TowerTypeId};

    use super::*;

    fn drop_event(card: u32) -> Event {
        Event::CardEndDrag(CardDropEvent {
            card_id: TowerTypeId(card),
            world_position: Vec2::ZERO,
        })
    }

    #[test]
    fn handlers_run_in_subscription_order() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for name in ["first", "second", "third"] {
            let log = Arc::clone(&log);
            bus.subscribe(Topic::CardEndDrag, move |_| log.lock().unwrap().push(name));
        }

        assert_eq!(bus.publish(drop_event(1)), 3);
        assert_eq!(*log.lock().unwrap(), ["first", "second", "third"]);
    }

    #[test]
    fn publishing_without_subscribers_is_a_no_op() {
        let bus = EventBus::new();
        bus.subscribe(Topic::CardUpdate, |_| panic!("wrong topic"));

        assert_eq!(bus.publish(drop_event(1)), 0);
    }

    #[test]
    fn unsubscribe_removes_only_that_handler() {
        let bus = EventBus::new();
        let hits = Arc::new(Mutex::new(Vec::new()));
        let kept = {
            let hits = Arc::clone(&hits);
            bus.subscribe(Topic::CardEndDrag, move |_| hits.lock().unwrap().push("kept"))
        };
        let removed = {
            let hits = Arc::clone(&hits);
            bus.subscribe(Topic::CardEndDrag, move |_| hits.lock().unwrap().push("removed"))
        };

        assert!(bus.unsubscribe(Topic::CardEndDrag, removed));
        assert!(!bus.unsubscribe(Topic::CardEndDrag, removed));
        assert!(!bus.unsubscribe(Topic::HandUpdate, kept));

        bus.publish(drop_event(1));
        assert_eq!(*hits.lock().unwrap(), ["kept"]);
        assert_eq!(bus.subscriber_count(Topic::CardEndDrag), 1);
    }

    #[test]
    fn handlers_may_publish_and_unsubscribe_reentrantly() {
        let bus = EventBus::new();
        let updates = Arc::new(Mutex::new(0));
        {
            let updates = Arc::clone(&updates);
            bus.subscribe(Topic::CardUpdate, move |_| *updates.lock().unwrap() += 1);
        }
        let slot = Arc::new(Mutex::new(None));
        let id = {
            let bus_handle = bus.clone();
            let slot = Arc::clone(&slot);
            bus.subscribe(Topic::CardEndDrag, move |event| {
                if let Some(id) = slot.lock().unwrap().take() {
                    bus_handle.unsubscribe(Topic::CardEndDrag, id);
                }
                let record = CardRecord {
                    card_id: event.card_id().unwrap(),
                    ..CardRecord::default()
                };
                bus_handle.publish(Event::CardUpdate(record));
            })
        };
        *slot.lock().unwrap() = Some(id);

        assert_eq!(bus.publish(drop_event(4)), 1);
        assert_eq!(bus.publish(drop_event(4)), 0);
        assert_eq!(*updates.lock().unwrap(), 1);
    }
}
