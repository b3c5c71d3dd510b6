use game_core::{AbortToken, ScaleTween, TweenStep, Vec2};

use super::controller::{CardComponent, CardState, Pointer};
use crate::events::{CardDragEvent, CardDropEvent, Event, EventBus};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSettings {
    /// Upward drag distance, in hand units, past which the card shrinks away.
    pub threshold: f32,
    /// Seconds the shrink and restore animations take.
    pub scale_duration: f32,
}

impl Default for DragSettings {
    fn default() -> Self {
        Self {
            threshold: 150.0,
            scale_duration: 1.0,
        }
    }
}

/// Drag gesture of a card.
///
/// The card follows the pointer, keeping the grab offset. Once it has been
/// dragged `threshold` units above its start it shrinks to nothing; dragging
/// it back below restores its scale. Releasing snaps it back to where it
/// started and publishes the drop.
#[derive(Debug)]
pub struct CardDrag {
    settings: DragSettings,
    dragging: bool,
    shrinking: bool,
    start_position: Vec2,
    start_scale: Vec2,
    offset: Vec2,
    tween: Option<ScaleTween>,
}

impl CardDrag {
    pub fn new(settings: DragSettings) -> Self {
        Self {
            settings,
            dragging: false,
            shrinking: false,
            start_position: Vec2::ZERO,
            start_scale: Vec2::ONE,
            offset: Vec2::ZERO,
            tween: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    fn retarget(&mut self, from: Vec2, to: Vec2) {
        self.abort_tween();
        self.tween = Some(ScaleTween::new(
            from,
            to,
            self.settings.scale_duration,
            AbortToken::new(),
        ));
    }

    fn abort_tween(&mut self) {
        if let Some(tween) = self.tween.take() {
            tween.token().abort();
        }
    }
}

impl Default for CardDrag {
    fn default() -> Self {
        Self::new(DragSettings::default())
    }
}

impl CardComponent for CardDrag {
    fn name(&self) -> &'static str {
        "drag"
    }

    fn update(&mut self, card: &mut CardState, delta: f32) {
        let Some(tween) = self.tween.as_mut() else {
            return;
        };
        match tween.step(delta) {
            TweenStep::Running => card.scale = tween.current(),
            TweenStep::Finished => {
                card.scale = tween.current();
                self.tween = None;
            }
            TweenStep::Aborted => self.tween = None,
        }
    }

    fn destroy(&mut self, _card: &mut CardState) {
        self.abort_tween();
    }

    fn on_pointer(&mut self, card: &mut CardState, pointer: &Pointer, bus: &EventBus) {
        match *pointer {
            Pointer::Begin { position } => {
                self.dragging = true;
                self.shrinking = false;
                self.start_position = card.position;
                self.start_scale = card.scale;
                self.offset = card.position - position;
                bus.publish(Event::CardDrag(CardDragEvent {
                    card_id: card.card_id(),
                    position: card.position,
                }));
            }
            Pointer::Drag { position } if self.dragging => {
                card.position = position + self.offset;
                let distance = card.position.y - self.start_position.y;
                if !self.shrinking && distance >= self.settings.threshold {
                    self.shrinking = true;
                    self.retarget(card.scale, Vec2::ZERO);
                } else if self.shrinking && distance < self.settings.threshold {
                    self.shrinking = false;
                    self.retarget(card.scale, self.start_scale);
                }
            }
            Pointer::End { world, .. } if self.dragging => {
                self.dragging = false;
                self.shrinking = false;
                self.abort_tween();
                card.position = self.start_position;
                card.scale = self.start_scale;
                bus.publish(Event::CardEndDrag(CardDropEvent {
                    card_id: card.card_id(),
                    world_position: world,
                }));
            }
            Pointer::Drag { .. } | Pointer::End { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use game_core::{CardRecord, TowerTypeId};

    use super::*;
    use crate::cards::CardController;
    use crate::events::Topic;

    fn dragged_card(bus: &EventBus) -> CardController {
        let record = CardRecord {
            card_id: TowerTypeId(1),
            ..CardRecord::default()
        };
        let mut controller = CardController::new(record, bus.clone()).with_component(CardDrag::default());
        controller.set_position(Vec2::new(10.0, 0.0));
        controller.start();
        controller
    }

    fn collect(bus: &EventBus, topic: Topic) -> Arc<Mutex<Vec<Event>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.subscribe(topic, move |event| sink.lock().unwrap().push(event.clone()));
        seen
    }

    #[test]
    fn card_follows_pointer_with_grab_offset() {
        let bus = EventBus::new();
        let drags = collect(&bus, Topic::CardDrag);
        let mut card = dragged_card(&bus);

        card.pointer(Pointer::Begin {
            position: Vec2::new(15.0, 5.0),
        });
        card.pointer(Pointer::Drag {
            position: Vec2::new(45.0, 25.0),
        });

        assert_eq!(card.state().position, Vec2::new(40.0, 20.0));
        assert_eq!(drags.lock().unwrap().len(), 1);
    }

    #[test]
    fn shrinks_past_threshold_over_the_scale_duration() {
        let bus = EventBus::new();
        let mut card = dragged_card(&bus);
        card.pointer(Pointer::Begin {
            position: Vec2::new(10.0, 0.0),
        });

        card.pointer(Pointer::Drag {
            position: Vec2::new(10.0, 149.0),
        });
        card.update(0.5);
        assert_eq!(card.state().scale, Vec2::ONE);

        card.pointer(Pointer::Drag {
            position: Vec2::new(10.0, 150.0),
        });
        card.update(0.5);
        assert_eq!(card.state().scale, Vec2::splat(0.5));
        card.update(0.5);
        assert_eq!(card.state().scale, Vec2::ZERO);
    }

    #[test]
    fn horizontal_distance_does_not_count() {
        let bus = EventBus::new();
        let mut card = dragged_card(&bus);
        card.pointer(Pointer::Begin {
            position: Vec2::new(10.0, 0.0),
        });

        card.pointer(Pointer::Drag {
            position: Vec2::new(1000.0, 10.0),
        });
        card.update(1.0);

        assert_eq!(card.state().scale, Vec2::ONE);
    }

    #[test]
    fn dragging_back_restores_the_start_scale() {
        let bus = EventBus::new();
        let mut card = dragged_card(&bus);
        card.pointer(Pointer::Begin {
            position: Vec2::new(10.0, 0.0),
        });
        card.pointer(Pointer::Drag {
            position: Vec2::new(10.0, 200.0),
        });
        card.update(1.0);
        assert_eq!(card.state().scale, Vec2::ZERO);

        card.pointer(Pointer::Drag {
            position: Vec2::new(10.0, 100.0),
        });
        card.update(1.0);

        assert_eq!(card.state().scale, Vec2::ONE);
    }

    #[test]
    fn release_snaps_back_and_publishes_the_drop() {
        let bus = EventBus::new();
        let drops = collect(&bus, Topic::CardEndDrag);
        let mut card = dragged_card(&bus);
        card.pointer(Pointer::Begin {
            position: Vec2::new(10.0, 0.0),
        });
        card.pointer(Pointer::Drag {
            position: Vec2::new(10.0, 300.0),
        });
        card.update(0.5);

        card.pointer(Pointer::End {
            position: Vec2::new(10.0, 300.0),
            world: Vec2::new(2.5, 3.5),
        });
        card.update(0.5);

        assert_eq!(card.state().position, Vec2::new(10.0, 0.0));
        assert_eq!(card.state().scale, Vec2::ONE);
        let drops = drops.lock().unwrap();
        assert_eq!(drops.len(), 1);
        assert!(matches!(
            &drops[0],
            Event::CardEndDrag(drop) if drop.card_id == TowerTypeId(1)
                && drop.world_position == Vec2::new(2.5, 3.5)
        ));
    }

    #[test]
    fn release_without_begin_is_ignored() {
        let bus = EventBus::new();
        let drops = collect(&bus, Topic::CardEndDrag);
        let mut card = dragged_card(&bus);

        card.pointer(Pointer::End {
            position: Vec2::ZERO,
            world: Vec2::ZERO,
        });

        assert!(drops.lock().unwrap().is_empty());
    }
}
