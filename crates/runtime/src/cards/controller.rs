use std::sync::{Arc, Mutex, PoisonError};

use game_core::{CardRecord, TowerTypeId, Vec2};

use crate::events::{Event, EventBus, SubscriptionId, Topic};

/// Hand-space state shared by every component of one card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardState {
    pub record: CardRecord,
    pub position: Vec2,
    pub scale: Vec2,
}

impl CardState {
    pub fn new(record: CardRecord) -> Self {
        Self {
            record,
            position: Vec2::ZERO,
            scale: Vec2::ONE,
        }
    }

    #[inline]
    pub fn card_id(&self) -> TowerTypeId {
        self.record.card_id
    }
}

/// Pointer gesture delivered to a card, in hand space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pointer {
    Begin { position: Vec2 },
    Drag { position: Vec2 },
    /// Release; `world` is the board position under the pointer.
    End { position: Vec2, world: Vec2 },
}

/// One behavior attached to a card.
///
/// Every hook defaults to a no-op.
pub trait CardComponent: Send {
    fn name(&self) -> &'static str;

    fn awake(&mut self, _card: &mut CardState) {}

    fn start(&mut self, _card: &mut CardState) {}

    fn update(&mut self, _card: &mut CardState, _delta: f32) {}

    fn destroy(&mut self, _card: &mut CardState) {}

    /// A card-scoped event addressed to this card.
    fn on_event(&mut self, _card: &mut CardState, _event: &Event) {}

    fn on_pointer(&mut self, _card: &mut CardState, _pointer: &Pointer, _bus: &EventBus) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Lifecycle {
    Created,
    Awake,
    Started,
    Destroyed,
}

const CARD_TOPICS: [Topic; 2] = [Topic::CardEndDrag, Topic::CardUpdate];

/// A card and its components.
///
/// While started, `CardEndDrag` and `CardUpdate` events for this card are
/// queued and handed to the components on the next `update` or `pointer`
/// call, on the caller's thread.
pub struct CardController {
    state: CardState,
    components: Vec<Box<dyn CardComponent>>,
    bus: EventBus,
    inbox: Arc<Mutex<Vec<Event>>>,
    subscriptions: Vec<(Topic, SubscriptionId)>,
    lifecycle: Lifecycle,
}

impl CardController {
    pub fn new(record: CardRecord, bus: EventBus) -> Self {
        Self {
            state: CardState::new(record),
            components: Vec::new(),
            bus,
            inbox: Arc::new(Mutex::new(Vec::new())),
            subscriptions: Vec::new(),
            lifecycle: Lifecycle::Created,
        }
    }

    pub fn with_component(mut self, component: impl CardComponent + 'static) -> Self {
        self.components.push(Box::new(component));
        self
    }

    pub fn state(&self) -> &CardState {
        &self.state
    }

    pub fn card_id(&self) -> TowerTypeId {
        self.state.card_id()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn component_names(&self) -> Vec<&'static str> {
        self.components.iter().map(|c| c.name()).collect()
    }

    pub(crate) fn set_position(&mut self, position: Vec2) {
        self.state.position = position;
    }

    pub fn awake(&mut self) {
        if self.lifecycle != Lifecycle::Created {
            return;
        }
        for component in &mut self.components {
            component.awake(&mut self.state);
        }
        self.lifecycle = Lifecycle::Awake;
    }

    /// Runs `awake` if needed, subscribes to this card's events, then runs
    /// `start`.
    pub fn start(&mut self) {
        self.awake();
        if self.lifecycle != Lifecycle::Awake {
            return;
        }

        let card_id = self.card_id();
        for topic in CARD_TOPICS {
            let inbox = Arc::clone(&self.inbox);
            let id = self.bus.subscribe(topic, move |event| {
                if event.card_id() == Some(card_id) {
                    inbox
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(event.clone());
                }
            });
            self.subscriptions.push((topic, id));
        }

        for component in &mut self.components {
            component.start(&mut self.state);
        }
        self.lifecycle = Lifecycle::Started;
    }

    pub fn update(&mut self, delta: f32) {
        if self.lifecycle != Lifecycle::Started {
            return;
        }
        self.dispatch_inbox();
        for component in &mut self.components {
            component.update(&mut self.state, delta);
        }
    }

    pub fn pointer(&mut self, pointer: Pointer) {
        if self.lifecycle != Lifecycle::Started {
            return;
        }
        for component in &mut self.components {
            component.on_pointer(&mut self.state, &pointer, &self.bus);
        }
        self.dispatch_inbox();
    }

    /// Unsubscribes and runs `destroy`. Idempotent.
    pub fn destroy(&mut self) {
        if self.lifecycle == Lifecycle::Destroyed {
            return;
        }
        self.unsubscribe();
        for component in &mut self.components {
            component.destroy(&mut self.state);
        }
        self.lifecycle = Lifecycle::Destroyed;
    }

    fn dispatch_inbox(&mut self) {
        let events = std::mem::take(&mut *self.inbox.lock().unwrap_or_else(PoisonError::into_inner));
        for event in &events {
            for component in &mut self.components {
                component.on_event(&mut self.state, event);
            }
        }
    }

    fn unsubscribe(&mut self) {
        for (topic, id) in self.subscriptions.drain(..) {
            self.bus.unsubscribe(topic, id);
        }
    }
}

impl Drop for CardController {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
