//! Cards in the player's hand.
//!
//! # Architecture
//!
//! - [`CardController`] owns a card's [`CardState`] and an ordered list of
//!   [`CardComponent`]s, calling each lifecycle hook on every component in
//!   registration order.
//! - [`CardView`] turns a drop of its own card into a [`PlacementRequest`]
//!   and keeps the displayed record in sync with `CardUpdate` events.
//! - [`CardDrag`] implements the drag gesture.
//! - [`Hand`] lays out one controller per card with [`HandLayout`].
//! - [`CardDatabase`] is the shared card list.

mod controller;
mod database;
mod drag;
mod hand;
mod view;

pub use controller::{CardComponent, CardController, CardState, Lifecycle, Pointer};
pub use database::CardDatabase;
pub use drag::{CardDrag, DragSettings};
pub use hand::{Hand, HandLayout};
pub use view::{CardView, PlacementRequest};
