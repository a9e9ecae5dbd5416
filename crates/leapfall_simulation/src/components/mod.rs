//! ECS Components агента
//!
//! Организация по доменам:
//! - states: MovementState, ConditionState, Facing, SpawnFacing
//! - actor: Health, Persistence, AgentKind
//! - controller: PlatformerController contract + Controller2D
//! - animator: AnimatorBinding contract + AnimatorParameters
//! - input: AgentInput (intent snapshot)
//! - player: Player marker

pub mod actor;
pub mod animator;
pub mod controller;
pub mod input;
pub mod player;
pub mod states;

// Re-exports для удобного импорта
pub use actor::*;
pub use animator::{AnimatorBinding, AnimatorParameters, AnimatorValue};
pub use controller::*;
pub use input::*;
pub use player::*;
pub use states::*;
