//! Per-frame scale animation with explicit cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::types::Vec2;

/// Shared cancellation flag checked by a running animation each step.
#[derive(Clone, Debug, Default)]
pub struct AbortToken(Arc<AtomicBool>);

impl AbortToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TweenStep {
    Running,
    Finished,
    Aborted,
}

/// Linear interpolation of a scale over a fixed duration, advanced by the
/// caller's frame loop.
#[derive(Clone, Debug)]
pub struct ScaleTween {
    from: Vec2,
    to: Vec2,
    duration: f32,
    elapsed: f32,
    current: Vec2,
    token: AbortToken,
}

impl ScaleTween {
    pub fn new(from: Vec2, to: Vec2, duration: f32, token: AbortToken) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
            current: from,
            token,
        }
    }

    /// Advances by `delta` seconds.
    ///
    /// An aborted tween keeps its last value. A finished tween lands exactly
    /// on the target scale.
    pub fn step(&mut self, delta: f32) -> TweenStep {
        if self.token.is_aborted() {
            return TweenStep::Aborted;
        }
        self.elapsed += delta.max(0.0);
        if self.duration <= 0.0 || self.elapsed >= self.duration {
            self.current = self.to;
            return TweenStep::Finished;
        }
        self.current = self.from.lerp(self.to, self.elapsed / self.duration);
        TweenStep::Running
    }

    #[inline]
    pub fn current(&self) -> Vec2 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> Vec2 {
        self.to
    }

    pub fn token(&self) -> &AbortToken {
        &self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_and_lands_on_target() {
        let mut tween = ScaleTween::new(Vec2::ONE, Vec2::ZERO, 1.0, AbortToken::new());

        assert_eq!(tween.step(0.25), TweenStep::Running);
        assert_eq!(tween.current(), Vec2::splat(0.75));
        assert_eq!(tween.step(0.5), TweenStep::Running);
        assert_eq!(tween.step(0.5), TweenStep::Finished);
        assert_eq!(tween.current(), Vec2::ZERO);
    }

    #[test]
    fn abort_freezes_the_current_value() {
        let token = AbortToken::new();
        let mut tween = ScaleTween::new(Vec2::ONE, Vec2::ZERO, 1.0, token.clone());
        tween.step(0.5);

        token.abort();

        assert_eq!(tween.step(0.25), TweenStep::Aborted);
        assert_eq!(tween.current(), Vec2::splat(0.5));
    }

    #[test]
    fn zero_duration_finishes_immediately() {
        let mut tween = ScaleTween::new(Vec2::ONE, Vec2::splat(2.0), 0.0, AbortToken::new());
        assert_eq!(tween.step(0.0), TweenStep::Finished);
        assert_eq!(tween.current(), Vec2::splat(2.0));
    }
}
