//! AgentBlueprint - "префаб" агента
//!
//! Abilities не клонируются (Box<dyn>), поэтому blueprint хранит фабрику.

use std::fmt;
use std::sync::Arc;

use bevy::prelude::*;
use rand::Rng;

use crate::abilities::{AbilitySet, HorizontalMovement, Jump, PauseAbility};
use crate::components::{
    AgentInput, AgentKind, AnimatorParameters, Controller2D, Health, Player,
};

use super::character::Agent;
use super::config::AgentConfig;

pub type AbilityFactory = Arc<dyn Fn() -> AbilitySet + Send + Sync>;

/// Стандартный набор: ходьба, прыжок, пауза
pub fn default_abilities() -> AbilitySet {
    AbilitySet::new()
        .with(HorizontalMovement::default())
        .with(Jump::default())
        .with(PauseAbility::default())
}

#[derive(Clone)]
pub struct AgentBlueprint {
    pub name: String,
    pub kind: AgentKind,
    pub config: AgentConfig,
    /// None = агент без Health (урон его не убивает, только lethal)
    pub max_health: Option<u32>,
    abilities: AbilityFactory,
}

impl fmt::Debug for AgentBlueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentBlueprint")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("max_health", &self.max_health)
            .finish_non_exhaustive()
    }
}

impl AgentBlueprint {
    pub fn new(name: impl Into<String>, kind: AgentKind) -> Self {
        Self {
            name: name.into(),
            kind,
            config: AgentConfig::default(),
            max_health: Some(1), // платформер: один удар = смерть
            abilities: Arc::new(default_abilities),
        }
    }

    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_health(mut self, max_health: Option<u32>) -> Self {
        self.max_health = max_health;
        self
    }

    pub fn with_abilities(mut self, factory: impl Fn() -> AbilitySet + Send + Sync + 'static) -> Self {
        self.abilities = Arc::new(factory);
        self
    }

    pub fn instantiate(&self, id: u32) -> Agent {
        Agent::new(id, self.kind, self.config.clone(), (self.abilities)())
    }

    /// Спавнит полный набор компонентов агента
    ///
    /// RandomConstant берётся из `rng` (детерминизм при фиксированном seed).
    pub fn spawn(&self, commands: &mut Commands, id: u32, position: Vec3, rng: &mut impl Rng) -> Entity {
        let mut agent = self.instantiate(id);
        agent.random_constant = rng.gen_range(0..1000);

        let mut entity = commands.spawn((
            agent,
            Controller2D::default(),
            AgentInput::default(),
            AnimatorParameters::standard(),
            Transform::from_translation(position),
        ));

        if self.kind == AgentKind::Player {
            entity.insert(Player);
        }
        if let Some(max) = self.max_health {
            entity.insert(Health::new(max));
        }

        entity.id()
    }
}
