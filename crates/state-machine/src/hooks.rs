//! State and transition hook traits.
//!
//! Hooks are generic over a context type `C` chosen by the caller of each
//! machine operation, mirroring how behavior nodes receive a blackboard.

/// Lifecycle callbacks attached to a single state.
///
/// Every method has a no-op default so implementors only override what they
/// need.
pub trait StateHooks<I, C: ?Sized> {
    /// Fired when the machine switches into this state.
    ///
    /// `input` is the symbol that caused the transition, or `I::default()`
    /// for the initial state.
    fn enter(&self, _ctx: &mut C, _input: &I) {}

    /// Fired by [`EventFsm::tick`](crate::EventFsm::tick) while this state is current.
    fn update(&self, _ctx: &mut C) {}

    /// Fired by [`EventFsm::late_tick`](crate::EventFsm::late_tick) while this state is current.
    fn late_update(&self, _ctx: &mut C) {}

    /// Fired by [`EventFsm::fixed_tick`](crate::EventFsm::fixed_tick) while this state is current.
    fn fixed_update(&self, _ctx: &mut C) {}

    /// Fired when the machine leaves this state, before the new state is entered.
    fn exit(&self, _ctx: &mut C, _input: &I) {}
}

/// Blanket implementation for boxed hook sets.
///
/// Allows heterogeneous states in one machine via `Box<dyn StateHooks<I, C>>`.
impl<I, C: ?Sized> StateHooks<I, C> for Box<dyn StateHooks<I, C> + Send + Sync> {
    #[inline]
    fn enter(&self, ctx: &mut C, input: &I) {
        (**self).enter(ctx, input)
    }

    #[inline]
    fn update(&self, ctx: &mut C) {
        (**self).update(ctx)
    }

    #[inline]
    fn late_update(&self, ctx: &mut C) {
        (**self).late_update(ctx)
    }

    #[inline]
    fn fixed_update(&self, ctx: &mut C) {
        (**self).fixed_update(ctx)
    }

    #[inline]
    fn exit(&self, ctx: &mut C, input: &I) {
        (**self).exit(ctx, input)
    }
}

/// Side effect fired exactly once per traversal of a transition.
pub trait TransitionHook<I, C: ?Sized> {
    fn fire(&self, ctx: &mut C, input: &I);
}

/// Transition effect that does nothing. Default effect type of a machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoEffect;

impl<I, C: ?Sized> TransitionHook<I, C> for NoEffect {
    #[inline]
    fn fire(&self, _ctx: &mut C, _input: &I) {}
}

type EnterExitFn<I, C> = Box<dyn Fn(&mut C, &I) + Send + Sync>;
type UpdateFn<C> = Box<dyn Fn(&mut C) + Send + Sync>;

/// Transition effect backed by a closure.
pub struct FnEffect<I, C>(EnterExitFn<I, C>);

impl<I, C> FnEffect<I, C> {
    pub fn new(f: impl Fn(&mut C, &I) + Send + Sync + 'static) -> Self {
        Self(Box::new(f))
    }
}

impl<I, C> TransitionHook<I, C> for FnEffect<I, C> {
    #[inline]
    fn fire(&self, ctx: &mut C, input: &I) {
        (self.0)(ctx, input)
    }
}

/// Hook set assembled from closures.
///
/// Useful for small machines and tests where a dedicated type per state would
/// be noise.
///
/// ```
/// use state_machine::FnHooks;
///
/// let hooks = FnHooks::<u8, Vec<&'static str>>::new()
///     .on_enter(|log, _| log.push("enter"))
///     .on_exit(|log, _| log.push("exit"));
/// # let _ = hooks;
/// ```
pub struct FnHooks<I, C> {
    enter: Option<EnterExitFn<I, C>>,
    update: Option<UpdateFn<C>>,
    late_update: Option<UpdateFn<C>>,
    fixed_update: Option<UpdateFn<C>>,
    exit: Option<EnterExitFn<I, C>>,
}

impl<I, C> Default for FnHooks<I, C> {
    fn default() -> Self {
        Self {
            enter: None,
            update: None,
            late_update: None,
            fixed_update: None,
            exit: None,
        }
    }
}

impl<I, C> FnHooks<I, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_enter(mut self, f: impl Fn(&mut C, &I) + Send + Sync + 'static) -> Self {
        self.enter = Some(Box::new(f));
        self
    }

    pub fn on_update(mut self, f: impl Fn(&mut C) + Send + Sync + 'static) -> Self {
        self.update = Some(Box::new(f));
        self
    }

    pub fn on_late_update(mut self, f: impl Fn(&mut C) + Send + Sync + 'static) -> Self {
        self.late_update = Some(Box::new(f));
        self
    }

    pub fn on_fixed_update(mut self, f: impl Fn(&mut C) + Send + Sync + 'static) -> Self {
        self.fixed_update = Some(Box::new(f));
        self
    }

    pub fn on_exit(mut self, f: impl Fn(&mut C, &I) + Send + Sync + 'static) -> Self {
        self.exit = Some(Box::new(f));
        self
    }
}

impl<I, C> StateHooks<I, C> for FnHooks<I, C> {
    fn enter(&self, ctx: &mut C, input: &I) {
        if let Some(f) = &self.enter {
            f(ctx, input);
        }
    }

    fn update(&self, ctx: &mut C) {
        if let Some(f) = &self.update {
            f(ctx);
        }
    }

    fn late_update(&self, ctx: &mut C) {
        if let Some(f) = &self.late_update {
            f(ctx);
        }
    }

    fn fixed_update(&self, ctx: &mut C) {
        if let Some(f) = &self.fixed_update {
            f(ctx);
        }
    }

    fn exit(&self, ctx: &mut C, input: &I) {
        if let Some(f) = &self.exit {
            f(ctx, input);
        }
    }
}
