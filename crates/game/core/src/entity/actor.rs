//! Behavior-driven entities: a body, its strategy pair and its machine.
//!
//! Every actor runs the same two-state machine (idle / active). The states
//! carry no logic themselves; each forwards its hooks to the strategy in the
//! matching slot of the actor's [`StrategyPair`].
//!
//! Transition requests raised by strategies are queued on the body and
//! applied after the hook returns, so transitions of one entity never
//! interleave.

use state_machine::{EventFsm, FsmBuilder, FsmError, StateHooks};

use crate::entity::agent::{Agent, BehaviorInput};
use crate::entity::context::TickContext;
use crate::strategy::{StrategyPair, StrategyResult};

/// Upper bound on transitions applied back to back within one tick.
const MAX_CHAINED_TRANSITIONS: usize = 4;

/// Which strategy of the pair a state forwards to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategySlot {
    Idle,
    Active,
}

#[derive(Clone, Copy, Debug)]
enum Hook {
    Enter,
    Update,
    Exit,
}

impl Hook {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Update => "update",
            Self::Exit => "exit",
        }
    }
}

/// Machine context for one actor during one hook invocation.
pub struct AgentTick<'a, 'w, B: Agent> {
    pub agent: &'a mut B,
    pub strategies: &'a StrategyPair<B>,
    pub cx: &'a mut TickContext<'w>,
}

impl StrategySlot {
    fn run<B: Agent>(self, tick: &mut AgentTick<'_, '_, B>, hook: Hook) {
        let strategies = tick.strategies;
        let strategy = match self {
            Self::Idle => &strategies.idle,
            Self::Active => &strategies.active,
        };
        let result: StrategyResult = match hook {
            Hook::Enter => strategy.on_enter(tick.agent, tick.cx),
            Hook::Update => strategy.on_update(tick.agent, tick.cx),
            Hook::Exit => strategy.on_exit(tick.agent, tick.cx),
        };
        if let Err(error) = result {
            tracing::warn!(
                entity = %tick.agent.id(),
                strategy = strategy.name(),
                hook = hook.as_str(),
                %error,
                "strategy hook failed"
            );
        }
    }
}

impl<'a, 'w, B: Agent> StateHooks<B::Input, AgentTick<'a, 'w, B>> for StrategySlot {
    fn enter(&self, tick: &mut AgentTick<'a, 'w, B>, _input: &B::Input) {
        self.run(tick, Hook::Enter);
    }

    fn update(&self, tick: &mut AgentTick<'a, 'w, B>) {
        self.run(tick, Hook::Update);
    }

    fn exit(&self, tick: &mut AgentTick<'a, 'w, B>, _input: &B::Input) {
        self.run(tick, Hook::Exit);
    }
}

/// The idle/active machine shared by all actors.
pub type Brain<I> = EventFsm<I, StrategySlot>;

fn build_brain<B: Agent>(tick: &mut AgentTick<'_, '_, B>) -> Result<Brain<B::Input>, FsmError> {
    let idle_input = <B::Input as BehaviorInput>::IDLE;
    let active_input = <B::Input as BehaviorInput>::ACTIVE;

    let mut builder = FsmBuilder::new();
    let idle = builder.state(idle_input.state_name(), StrategySlot::Idle);
    let active = builder.state(active_input.state_name(), StrategySlot::Active);
    builder.configure(idle).transition(active_input, active).done()?;
    builder.configure(active).transition(idle_input, idle).done()?;
    builder.build(idle, tick)
}

/// Applies queued transition requests until none remain.
fn settle<B: Agent>(brain: &mut Brain<B::Input>, tick: &mut AgentTick<'_, '_, B>) {
    for _ in 0..MAX_CHAINED_TRANSITIONS {
        let Some(input) = tick.agent.take_transition() else {
            return;
        };
        brain.send_input(input, tick);
    }
    if let Some(input) = tick.agent.take_transition() {
        tracing::warn!(
            entity = %tick.agent.id(),
            ?input,
            "transition chain too long, dropping request"
        );
    }
}

/// A pooled, behavior-driven entity.
///
/// A vacant actor (fresh from the pool factory or despawned) has no strategies
/// and no machine, and ignores ticks.
pub struct Actor<B: Agent> {
    body: B,
    strategies: Option<StrategyPair<B>>,
    brain: Option<Brain<B::Input>>,
}

impl<B: Agent + Default> Default for Actor<B> {
    fn default() -> Self {
        Self::vacant(B::default())
    }
}

impl<B: Agent> Actor<B> {
    pub fn vacant(body: B) -> Self {
        Self {
            body,
            strategies: None,
            brain: None,
        }
    }

    /// (Re)initializes the actor: installs `body` and `strategies` and starts
    /// a fresh machine in the idle state.
    pub fn activate(
        &mut self,
        body: B,
        strategies: StrategyPair<B>,
        cx: &mut TickContext<'_>,
    ) -> Result<(), FsmError> {
        self.body = body;
        self.brain = None;
        let strategies = &*self.strategies.insert(strategies);
        let mut tick = AgentTick {
            agent: &mut self.body,
            strategies,
            cx,
        };
        let brain = self.brain.insert(build_brain(&mut tick)?);
        settle(brain, &mut tick);
        Ok(())
    }

    /// Drops the machine and strategies. The body is kept for reuse.
    pub fn deactivate(&mut self) {
        self.brain = None;
        self.strategies = None;
    }

    pub fn is_active(&self) -> bool {
        self.brain.is_some()
    }

    /// Runs the current state's update hook, then any requested transitions.
    pub fn tick(&mut self, cx: &mut TickContext<'_>) {
        let (Some(strategies), Some(brain)) = (self.strategies.as_ref(), self.brain.as_mut()) else {
            return;
        };
        let mut tick = AgentTick {
            agent: &mut self.body,
            strategies,
            cx,
        };
        brain.tick(&mut tick);
        settle(brain, &mut tick);
    }

    /// Feeds an input directly into the machine, as a strategy request would.
    pub fn send_input(&mut self, input: B::Input, cx: &mut TickContext<'_>) -> bool {
        let (Some(strategies), Some(brain)) = (self.strategies.as_ref(), self.brain.as_mut()) else {
            return false;
        };
        let mut tick = AgentTick {
            agent: &mut self.body,
            strategies,
            cx,
        };
        let switched = brain.send_input(input, &mut tick);
        settle(brain, &mut tick);
        switched
    }

    /// Name of the current state, `None` while vacant.
    pub fn state_name(&self) -> Option<&str> {
        self.brain.as_ref().map(|brain| brain.current_name())
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }

    pub fn strategies(&self) -> Option<&StrategyPair<B>> {
        self.strategies.as_ref()
    }
}
