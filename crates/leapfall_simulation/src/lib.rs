//! Leapfall Simulation Core
//!
//! Ядро 2D платформера на Bevy 0.16:
//! - agent - персонаж: state machines, pipeline abilities, flip/freeze/respawn
//! - level - чекпоинты, GameSession, spawn/respawn координатор
//! - physics - collaborator: headless интегратор или Rapier bridge
//!
//! Поведение живёт в plain Rust типах (тестируются без App),
//! Bevy системы только кормят их временем и исполняют результат.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod abilities;
pub mod agent;
pub mod components;
pub mod level;
pub mod logger;
pub mod physics;
pub mod state_machine;

// Re-export базовых типов для удобства
pub use abilities::{AbilityError, AbilityModule, AbilityPhase, AbilitySet};
pub use agent::{Agent, AgentBlueprint, AgentConfig, AgentPlugin};
pub use components::*;
pub use level::{GameSession, LevelConfig, LevelEvent, LevelEventKind, LevelPlugin, SpawnCoordinator};
pub use logger::{
    init_logger, log, log_error, log_info, log_level, log_warning, log_with_level, set_log_level, set_logger,
    set_logger_if_needed, ConsoleLogger, LogLevel, LogPrinter,
};
pub use physics::{LevelGeometry, PlatformerPhysicsPlugin, RapierBridgePlugin};
pub use state_machine::{StateMachine, StateNotification};

/// Порядок симуляции внутри Update
///
/// Agents → Damage → Level → Physics: смерть, случившаяся в кадре,
/// обрабатывается координатором в том же кадре.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Agents,
    Damage,
    Level,
    Physics,
}

/// Ядро без solver'а (хосты с Rapier добавляют RapierBridgePlugin сами)
pub struct SimulationCorePlugin;

impl Plugin for SimulationCorePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                SimulationSet::Agents,
                SimulationSet::Damage,
                SimulationSet::Level,
                SimulationSet::Physics,
            )
                .chain(),
        );

        if !app.world().contains_resource::<DeterministicRng>() {
            // Детерминистичный RNG (seed по умолчанию)
            app.insert_resource(DeterministicRng::new(42));
        }

        app.add_plugins((AgentPlugin, LevelPlugin));
    }
}

/// Главный plugin симуляции (ядро + headless физика)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((SimulationCorePlugin, PlatformerPhysicsPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
