//! Simulation entities and the contracts strategies drive them through.

mod actor;
mod agent;
mod command;
mod context;
mod enemy;
mod projectile;
mod tower;

pub use actor::{Actor, AgentTick, Brain, StrategySlot};
pub use agent::{Agent, BehaviorInput, EnemyAgent, EnemyInput, TowerAgent, TowerInput};
pub use command::{Command, CommandBuffer};
pub use context::TickContext;
pub use enemy::{Enemy, EnemyBody};
pub use projectile::Projectile;
pub use tower::{Tower, TowerBody};
