//! Level ECS systems - glue между SpawnCoordinator и миром
//!
//! Все системы в одной цепочке SimulationSet::Level, поэтому смерть,
//! опубликованная в Damage, обрабатывается координатором в том же кадре.

use bevy::prelude::*;

use crate::agent::{Agent, AgentDied};
use crate::components::{AgentKind, Controller2D, Health, Persistence, Player};
use crate::DeterministicRng;

use super::checkpoint::{Checkpoint, CheckpointEntry, Respawnable, RespawnableEntry};
use super::config::AgentPrefabs;
use super::coordinator::{resolve_agent_source, resume_point, AgentSource, CoordinatorAction, LevelPhase, SpawnCoordinator};
use super::events::{
    CameraEvent, CheckpointReached, LevelChangeRequest, LevelEvent, LevelEventKind, LevelLoadRequested,
    MultiplayerWinner, PointsEvent, PointsMethod, RespawnableReset,
};
use super::session::GameSession;

/// Instantiating: выбирает источник агентов и собирает чекпоинты
pub fn instantiate_level(
    mut commands: Commands,
    mut coordinator: ResMut<SpawnCoordinator>,
    session: Res<GameSession>,
    prefabs: Res<AgentPrefabs>,
    mut rng: ResMut<DeterministicRng>,
    scene_agents: Query<Entity, (With<Agent>, With<Player>)>,
    checkpoints: Query<(Entity, &Checkpoint, &Transform)>,
) {
    if coordinator.phase() != LevelPhase::Instantiating {
        return;
    }

    let mut scene: Vec<Entity> = scene_agents.iter().collect();
    scene.sort_by_key(|entity| entity.index());

    let source = resolve_agent_source(session.persistent_agent(), session.stored_agent(), &scene, &prefabs.0);
    let players = match source {
        AgentSource::Persisted(agent) => vec![agent],
        AgentSource::Scene(agents) => agents,
        AgentSource::Stored(blueprint) => vec![blueprint.spawn(&mut commands, 0, Vec3::ZERO, &mut rng.rng)],
        AgentSource::Prefabs(blueprints) => blueprints
            .iter()
            .enumerate()
            .map(|(index, blueprint)| {
                if blueprint.kind != AgentKind::Player {
                    crate::log_warning(&format!("⚠️ Prefab '{}' is not a player agent", blueprint.name));
                }
                blueprint.spawn(&mut commands, index as u32, Vec3::ZERO, &mut rng.rng)
            })
            .collect(),
        AgentSource::Empty => Vec::new(),
    };

    let entries = checkpoints
        .iter()
        .map(|(entity, checkpoint, transform)| CheckpointEntry::new(entity, checkpoint, transform.translation))
        .collect();

    coordinator.instantiate(players, entries);
}

/// Spawning: ждёт пока заспавненные агенты появятся в мире, потом расставляет
pub fn spawn_level(
    mut coordinator: ResMut<SpawnCoordinator>,
    session: Res<GameSession>,
    agents: Query<(), With<Agent>>,
    respawnables: Query<(Entity, &Respawnable, &Transform)>,
) {
    if coordinator.phase() != LevelPhase::Spawning {
        return;
    }
    if !coordinator.players().iter().all(|player| agents.contains(*player)) {
        return;
    }

    let resume = resume_point(&session, coordinator.config());
    let objects: Vec<RespawnableEntry> = respawnables
        .iter()
        .map(|(entity, respawnable, transform)| RespawnableEntry::new(entity, respawnable, transform.translation))
        .collect();

    coordinator.spawn_players(resume, &objects);
}

/// AgentDied (player) → LevelEvent::PlayerDeath
pub fn forward_player_deaths(mut deaths: EventReader<AgentDied>, mut level_events: EventWriter<LevelEvent>) {
    for death in deaths.read() {
        if death.kind == AgentKind::Player {
            level_events.write(LevelEvent::from_agent(LevelEventKind::PlayerDeath, death.agent));
        }
    }
}

pub fn handle_level_events(
    mut events: EventReader<LevelEvent>,
    mut coordinator: ResMut<SpawnCoordinator>,
    mut session: ResMut<GameSession>,
) {
    for event in events.read() {
        coordinator.handle_level_event(event, &mut session);
    }
}

pub fn handle_points_events(mut events: EventReader<PointsEvent>, mut session: ResMut<GameSession>) {
    for event in events.read() {
        match event.method {
            PointsMethod::Set => session.set_points(event.points),
            PointsMethod::Add => session.add_points(event.points),
        }
    }
}

pub fn handle_checkpoint_reached(
    mut events: EventReader<CheckpointReached>,
    mut coordinator: ResMut<SpawnCoordinator>,
) {
    for event in events.read() {
        coordinator.set_current_checkpoint(event.checkpoint);
    }
}

pub fn handle_level_change_requests(
    mut requests: EventReader<LevelChangeRequest>,
    mut coordinator: ResMut<SpawnCoordinator>,
    mut session: ResMut<GameSession>,
) {
    for request in requests.read() {
        coordinator.request_level_change(request.destination.clone(), request.entry, &mut session);
    }
}

pub fn tick_coordinator(
    virtual_time: Res<Time<Virtual>>,
    real_time: Res<Time<Real>>,
    mut coordinator: ResMut<SpawnCoordinator>,
) {
    coordinator.advance(virtual_time.delta_secs(), real_time.delta_secs());
}

/// Исполняет outbox координатора
#[allow(clippy::too_many_arguments)]
pub fn apply_coordinator_actions(
    mut commands: Commands,
    mut coordinator: ResMut<SpawnCoordinator>,
    mut session: ResMut<GameSession>,
    mut virtual_time: ResMut<Time<Virtual>>,
    mut agents: Query<(&mut Agent, &mut Controller2D, &mut Transform, Option<&mut Health>, Option<&Persistence>)>,
    mut level_events: EventWriter<LevelEvent>,
    mut camera_events: EventWriter<CameraEvent>,
    mut points_events: EventWriter<PointsEvent>,
    mut resets: EventWriter<RespawnableReset>,
    mut winners: EventWriter<MultiplayerWinner>,
    mut loads: EventWriter<LevelLoadRequested>,
) {
    for action in coordinator.take_actions() {
        match action {
            CoordinatorAction::Publish(event) => {
                level_events.write(event);
            }
            CoordinatorAction::Camera(event) => {
                camera_events.write(event);
            }
            CoordinatorAction::SetPoints(points) => {
                session.set_points(points);
                points_events.write(PointsEvent {
                    method: PointsMethod::Set,
                    points,
                });
            }
            CoordinatorAction::AssignPlayerId { agent, player_id, index } => {
                if let Ok((mut agent, ..)) = agents.get_mut(agent) {
                    agent.set_player_id(player_id, index);
                }
            }
            CoordinatorAction::Respawn {
                agent: entity,
                at,
                reset_respawnables,
            } => {
                if let Ok((mut agent, mut controller, mut transform, health, persistence)) = agents.get_mut(entity) {
                    agent.respawn_at(&mut *controller, at.facing, health.map(Mut::into_inner), persistence);
                    transform.translation = at.position;
                    controller.velocity = Vec2::ZERO;
                }

                if reset_respawnables {
                    if let Some(checkpoint) = at.checkpoint {
                        for object in coordinator.checkpoints().assigned_to(checkpoint) {
                            resets.write(RespawnableReset {
                                object: *object,
                                checkpoint,
                            });
                        }
                    }
                }
            }
            CoordinatorAction::FreezeAgents => {
                for player in coordinator.players() {
                    if let Ok((mut agent, mut controller, ..)) = agents.get_mut(*player) {
                        agent.freeze(&mut *controller);
                    }
                }
            }
            CoordinatorAction::DisableAgents => {
                for player in coordinator.players() {
                    if let Ok((mut agent, mut controller, ..)) = agents.get_mut(*player) {
                        agent.disable(&mut *controller);
                    }
                }
            }
            CoordinatorAction::SetPaused(paused) => {
                if paused {
                    virtual_time.pause();
                } else {
                    virtual_time.unpause();
                }
                // Агенты без Pause ability пропускаются
                for player in coordinator.players() {
                    if let Ok((mut agent, ..)) = agents.get_mut(*player) {
                        if paused {
                            agent.pause_character();
                        } else {
                            agent.unpause_character();
                        }
                    }
                }
            }
            CoordinatorAction::Despawn(entity) => {
                if let Ok(mut entity_commands) = commands.get_entity(entity) {
                    entity_commands.despawn();
                }
            }
            CoordinatorAction::AnnounceWinner(entity) => {
                let Ok((winner, ..)) = agents.get(entity) else {
                    crate::log_warning(&format!("⚠️ Winner {:?} no longer exists", entity));
                    continue;
                };
                let player_id = winner.player_id.clone();
                crate::log(&format!("🏆 {} wins", player_id));
                winners.write(MultiplayerWinner {
                    agent: entity,
                    player_id,
                });
            }
            CoordinatorAction::LoadLevel(level) => {
                crate::log(&format!("📦 Load level '{}'", level));
                loads.write(LevelLoadRequested { level });
            }
        }
    }
}
