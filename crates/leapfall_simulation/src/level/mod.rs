//! Level module - чекпоинты, сессия, spawn/respawn координатор
//!
//! Архитектура:
//! - `SpawnCoordinator` (Resource) - чистый state machine уровня, копит actions
//! - `GameSession` (Resource) - жизни, очки, пауза, persistence между уровнями
//! - systems - читают события, кормят координатор временем, исполняют actions

use bevy::prelude::*;

pub mod bounds;
pub mod character_switch;
pub mod checkpoint;
pub mod config;
pub mod coordinator;
pub mod events;
pub mod session;
pub mod systems;

pub use bounds::LevelBounds;
pub use character_switch::{switch_character, CharacterRoster, NextCharacterChoice};
pub use checkpoint::{
    Checkpoint, CheckpointAxis, CheckpointDirection, CheckpointEntry, CheckpointSet, Respawnable, RespawnableEntry,
};
pub use config::{AgentPrefabs, LevelConfig, MultiplayerRules, PointOfEntry};
pub use coordinator::{
    plan_spawns, resolve_agent_source, resume_point, AgentSource, CoordinatorAction, EndGameStage, LevelPhase,
    SpawnCoordinator, SpawnPoint,
};
pub use events::{
    CameraEvent, CheckpointReached, LevelChangeRequest, LevelEvent, LevelEventKind, LevelLoadRequested,
    MultiplayerWinner, PointsEvent, PointsMethod, RespawnableReset, SwitchCharacterRequest,
};
pub use session::{GameSession, PointOfEntryRecord};
pub use systems::*;

use crate::SimulationSet;

/// Level Plugin
///
/// Порядок внутри SimulationSet::Level (chain):
/// 1. instantiate_level / spawn_level - старт уровня
/// 2. forward_player_deaths - AgentDied → PlayerDeath
/// 3. handlers - level events, points, checkpoints, level change, character switch
/// 4. tick_coordinator - таймеры респавна / end game / outro
/// 5. apply_coordinator_actions - исполнение outbox
pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<LevelEvent>()
            .add_event::<PointsEvent>()
            .add_event::<CameraEvent>()
            .add_event::<CheckpointReached>()
            .add_event::<RespawnableReset>()
            .add_event::<LevelChangeRequest>()
            .add_event::<LevelLoadRequested>()
            .add_event::<MultiplayerWinner>()
            .add_event::<SwitchCharacterRequest>()
            .init_resource::<GameSession>()
            .init_resource::<AgentPrefabs>()
            .init_resource::<SpawnCoordinator>()
            .init_resource::<CharacterRoster>()
            .add_systems(
                Update,
                (
                    instantiate_level,
                    spawn_level,
                    forward_player_deaths,
                    handle_level_events,
                    handle_points_events,
                    handle_checkpoint_reached,
                    handle_level_change_requests,
                    switch_character,
                    tick_coordinator,
                    apply_coordinator_actions,
                )
                    .chain()
                    .in_set(SimulationSet::Level),
            );
    }
}
