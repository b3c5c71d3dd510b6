use crate::entity::{BehaviorInput, Command, EnemyAgent, TickContext};
use crate::strategy::{Strategy, StrategyResult};
use crate::types::Vec2;

/// Walks straight down the board until a tower comes within attack range.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnemyWalking;

impl<E: EnemyAgent> Strategy<E> for EnemyWalking {
    fn name(&self) -> &'static str {
        "enemy_walking"
    }

    fn on_update(&self, enemy: &mut E, cx: &mut TickContext<'_>) -> StrategyResult {
        let step = Vec2::NEG_Y * enemy.profile().speed * cx.time.delta;
        enemy.set_position(enemy.position() + step);

        if enemy.scan_for_tower(cx.physics) {
            enemy.request_transition(<E::Input as BehaviorInput>::ACTIVE);
        }
        Ok(())
    }
}

/// Closes in on the detected tower and strikes it on a cooldown.
///
/// The first strike is delayed: entering the state pushes the last attack
/// time one cooldown into the future.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnemyAttack;

impl<E: EnemyAgent> Strategy<E> for EnemyAttack {
    fn name(&self) -> &'static str {
        "enemy_attack"
    }

    fn on_enter(&self, enemy: &mut E, cx: &mut TickContext<'_>) -> StrategyResult {
        let cooldown = enemy.profile().attack_cooldown;
        enemy.set_last_attack(cx.time.now + cooldown);
        Ok(())
    }

    fn on_update(&self, enemy: &mut E, cx: &mut TickContext<'_>) -> StrategyResult {
        let profile = *enemy.profile();
        let position = enemy.position();
        let goal = enemy.target_position();

        if position.distance(goal) > profile.stopping_distance {
            let direction = (goal - position).normalize_or_zero();
            enemy.set_position(position + direction * profile.speed * cx.time.delta);
        } else if cx.time.now >= enemy.last_attack() + profile.attack_cooldown
            && enemy.target().is_some()
            && enemy.scan_for_tower(cx.physics)
            && let Some(target) = enemy.target()
        {
            cx.emit(Command::Damage {
                source: enemy.id(),
                target,
                amount: profile.damage,
            });
            enemy.set_last_attack(cx.time.now);
        }

        if !enemy.scan_for_tower(cx.physics) {
            enemy.request_transition(<E::Input as BehaviorInput>::IDLE);
        }
        Ok(())
    }

    fn on_exit(&self, enemy: &mut E, _cx: &mut TickContext<'_>) -> StrategyResult {
        enemy.set_target_position(Vec2::ZERO);
        enemy.set_last_attack(0.0);
        Ok(())
    }
}
