use crate::descriptor::DescriptorField;
use crate::entity::{BehaviorInput, Command, TickContext, TowerAgent};
use crate::strategy::{Strategy, StrategyResult, non_negative};
use crate::types::{Layers, Vec2};

/// Idle arrow tower: scans its range box for enemies.
///
/// The box spans `range * 2 + 1` cells on each axis around the tower, so a
/// range of zero still covers the tower's own cell.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArrowIdle;

impl<E: TowerAgent> Strategy<E> for ArrowIdle {
    fn name(&self) -> &'static str {
        "arrow_idle"
    }

    fn on_update(&self, tower: &mut E, cx: &mut TickContext<'_>) -> StrategyResult {
        let descriptor = tower.descriptor();
        let horizontal = non_negative(DescriptorField::HorizontalRange, descriptor.horizontal_range)?;
        let vertical = non_negative(DescriptorField::VerticalRange, descriptor.vertical_range)?;

        let size = Vec2::new(
            (horizontal * 2 + 1) as f32 * cx.cell_size,
            (vertical * 2 + 1) as f32 * cx.cell_size,
        );
        let hits = cx.physics.overlap_box(tower.position(), size, Layers::ENEMY);
        if let Some(first) = hits.first() {
            tower.set_target(Some(first.id));
            tower.request_transition(<E::Input as BehaviorInput>::ACTIVE);
        }
        Ok(())
    }
}

/// Attacking arrow tower: fires at its target while it stays in range.
///
/// The reach is elliptical in spirit: squared horizontal plus squared vertical
/// range, compared against the squared distance. Only a strictly greater
/// distance is out of range.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArrowAttack;

impl<E: TowerAgent> Strategy<E> for ArrowAttack {
    fn name(&self) -> &'static str {
        "arrow_attack"
    }

    fn on_update(&self, tower: &mut E, cx: &mut TickContext<'_>) -> StrategyResult {
        let Some(target) = tower.target().and_then(|id| cx.physics.locate(id)) else {
            tower.request_transition(<E::Input as BehaviorInput>::IDLE);
            return Ok(());
        };

        let descriptor = tower.descriptor();
        let horizontal = descriptor.horizontal_range as f32 * cx.cell_size;
        let vertical = descriptor.vertical_range as f32 * cx.cell_size;
        let range_squared = horizontal * horizontal + vertical * vertical;
        let distance_squared = tower.position().distance_squared(target.position);

        if distance_squared > range_squared {
            tower.request_transition(<E::Input as BehaviorInput>::IDLE);
        } else if cx.time.now >= tower.last_fire() + descriptor.fire_cooldown {
            let command = Command::SpawnProjectile {
                source: tower.id(),
                target: target.id,
                origin: tower.position(),
                damage: descriptor.damage,
                visual: descriptor.projectile_sprite.clone(),
            };
            cx.emit(command);
            tower.set_last_fire(cx.time.now);
        }
        Ok(())
    }

    fn on_exit(&self, tower: &mut E, _cx: &mut TickContext<'_>) -> StrategyResult {
        tower.set_target(None);
        Ok(())
    }
}
