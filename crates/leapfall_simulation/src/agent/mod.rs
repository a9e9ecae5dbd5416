//! Agent module - управляемый персонаж и его ECS glue

use bevy::prelude::*;

pub mod blueprint;
pub mod camera;
pub mod character;
pub mod condition_override;
pub mod config;
pub mod events;
pub mod systems;


pub use blueprint::{default_abilities, AgentBlueprint};
pub use camera::CameraTarget;
pub use character::{wrap_degrees, Agent, AgentFrame, ModelPose};
pub use condition_override::{OverrideClock, TemporaryCondition, TimedConditionOverride};
pub use config::{AgentConfig, DeathBehaviour, FlipMode, VisualKind};
pub use events::{AgentDied, AgentStateChange, AgentStateChanged, DamageAmount, DamageRequest};
pub use systems::{apply_damage, update_agents};

use crate::SimulationSet;

/// Agent Plugin
///
/// Порядок внутри кадра:
/// 1. update_agents (SimulationSet::Agents) - HandleStatus, фазы abilities, animator
/// 2. apply_damage (SimulationSet::Damage) - Health, смерть → AgentDied
pub struct AgentPlugin;

impl Plugin for AgentPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AgentStateChanged>()
            .add_event::<DamageRequest>()
            .add_event::<AgentDied>()
            .add_systems(
                Update,
                (
                    update_agents.in_set(SimulationSet::Agents),
                    apply_damage.in_set(SimulationSet::Damage),
                ),
            );
    }
}
