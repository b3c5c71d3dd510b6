//! Topic-based event bus for runtime events.
//!
//! This module provides a synchronous publish/subscribe system decoupling
//! producers (drag input, descriptor updates, the world tick) from consumers
//! (cards, the hand, the runtime itself).

mod bus;
mod types;

pub use bus::{Event, EventBus, SubscriptionId, Topic};
pub use types::{CardDragEvent, CardDropEvent, CardSlot, HandSnapshot};
