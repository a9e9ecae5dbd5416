//! SpawnCoordinator - жизненный цикл уровня
//!
//! Instantiating → Spawning → Playing → (death → Respawning) → LevelEnd
//!
//! Чистая логика без ECS: принимает факты (игроки, чекпоинты, смерти, время)
//! и копит `CoordinatorAction` в outbox. `apply_coordinator_actions` исполняет их.

use bevy::prelude::*;

use crate::agent::AgentBlueprint;
use crate::components::Facing;

use super::bounds::LevelBounds;
use super::checkpoint::{CheckpointEntry, CheckpointSet, RespawnableEntry};
use super::config::LevelConfig;
use super::events::{CameraEvent, LevelEvent, LevelEventKind};
use super::session::GameSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelPhase {
    #[default]
    Instantiating,
    Spawning,
    Playing,
    Respawning,
    LevelEnd,
}

// ============================================================================
// Agent sources / spawn planning
// ============================================================================

/// Откуда берутся агенты уровня
#[derive(Debug, Clone)]
pub enum AgentSource {
    /// Агент, переживший прошлый уровень
    Persisted(Entity),
    /// Явно выбранный blueprint (GameSession)
    Stored(AgentBlueprint),
    /// Игроки, уже стоящие в сцене
    Scene(Vec<Entity>),
    Prefabs(Vec<AgentBlueprint>),
    Empty,
}

/// Первый непустой источник выигрывает, остальные игнорируются
pub fn resolve_agent_source(
    persisted: Option<Entity>,
    stored: Option<&AgentBlueprint>,
    scene: &[Entity],
    prefabs: &[AgentBlueprint],
) -> AgentSource {
    if let Some(agent) = persisted {
        return AgentSource::Persisted(agent);
    }
    if let Some(blueprint) = stored {
        return AgentSource::Stored(blueprint.clone());
    }
    if !scene.is_empty() {
        return AgentSource::Scene(scene.to_vec());
    }
    if !prefabs.is_empty() {
        return AgentSource::Prefabs(prefabs.to_vec());
    }
    AgentSource::Empty
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPoint {
    pub position: Vec3,
    pub facing: Facing,
    /// None = point of entry (объекты чекпоинтов не сбрасываются)
    pub checkpoint: Option<Entity>,
}

impl SpawnPoint {
    pub fn at_checkpoint(checkpoint: &CheckpointEntry) -> Self {
        Self {
            position: checkpoint.position,
            facing: checkpoint.spawn_facing,
            checkpoint: Some(checkpoint.id),
        }
    }
}

/// Сохранённая точка входа для текущего уровня (если индекс валиден)
pub fn resume_point(session: &GameSession, config: &LevelConfig) -> Option<SpawnPoint> {
    let record = session.point_of_entry(&config.level_name)?;
    let entry = config.points_of_entry.get(record.entry_index)?;
    Some(SpawnPoint {
        position: entry.position,
        facing: record.facing,
        checkpoint: None,
    })
}

/// Точка спавна для каждого агента
///
/// Один агент: point of entry, иначе текущий чекпоинт.
/// Несколько: i-й агент → i-й чекпоинт, лишние на последний.
pub fn plan_spawns(agent_count: usize, checkpoints: &CheckpointSet, resume: Option<SpawnPoint>) -> Vec<Option<SpawnPoint>> {
    match agent_count {
        0 => Vec::new(),
        1 => vec![resume.or_else(|| checkpoints.current().map(SpawnPoint::at_checkpoint))],
        _ => (0..agent_count)
            .map(|index| checkpoints.spawn_slot(index).map(SpawnPoint::at_checkpoint))
            .collect(),
    }
}

// ============================================================================
// Actions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorAction {
    Publish(LevelEvent),
    Camera(CameraEvent),
    SetPoints(i32),
    AssignPlayerId {
        agent: Entity,
        player_id: String,
        index: u32,
    },
    Respawn {
        agent: Entity,
        at: SpawnPoint,
        reset_respawnables: bool,
    },
    FreezeAgents,
    DisableAgents,
    SetPaused(bool),
    Despawn(Entity),
    AnnounceWinner(Entity),
    LoadLevel(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndGameStage {
    Freeze,
    Announce,
    Reload,
}

#[derive(Debug, Clone, Copy)]
struct PendingRespawn {
    agent: Entity,
    remaining: f32,
    solo: bool,
}

#[derive(Debug, Clone, Copy)]
struct EndGameSequence {
    winner: Entity,
    stage: EndGameStage,
    remaining: f32,
}

#[derive(Debug, Clone)]
struct PendingTransition {
    destination: String,
    remaining: f32,
}

// ============================================================================
// SpawnCoordinator
// ============================================================================

#[derive(Resource, Debug)]
pub struct SpawnCoordinator {
    config: LevelConfig,
    phase: LevelPhase,
    players: Vec<Entity>,
    eliminated: Vec<Entity>,
    checkpoints: CheckpointSet,
    bounds: LevelBounds,
    respawns: Vec<PendingRespawn>,
    end_game: Option<EndGameSequence>,
    transition: Option<PendingTransition>,
    time_in_level: f32,
    actions: Vec<CoordinatorAction>,
}

impl Default for SpawnCoordinator {
    fn default() -> Self {
        Self::new(LevelConfig::default())
    }
}

impl SpawnCoordinator {
    pub fn new(config: LevelConfig) -> Self {
        Self {
            bounds: config.bounds,
            config,
            phase: LevelPhase::Instantiating,
            players: Vec::new(),
            eliminated: Vec::new(),
            checkpoints: CheckpointSet::default(),
            respawns: Vec::new(),
            end_game: None,
            transition: None,
            time_in_level: 0.0,
            actions: Vec::new(),
        }
    }

    /// Новый уровень: всё заново с Instantiating
    pub fn load_level(&mut self, config: LevelConfig) {
        *self = Self::new(config);
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn phase(&self) -> LevelPhase {
        self.phase
    }

    pub fn players(&self) -> &[Entity] {
        &self.players
    }

    pub fn alive_players(&self) -> impl Iterator<Item = Entity> + '_ {
        self.players
            .iter()
            .copied()
            .filter(|player| !self.eliminated.contains(player))
    }

    pub fn is_eliminated(&self, agent: Entity) -> bool {
        self.eliminated.contains(&agent)
    }

    pub fn checkpoints(&self) -> &CheckpointSet {
        &self.checkpoints
    }

    pub fn time_in_level(&self) -> f32 {
        self.time_in_level
    }

    /// Оставшееся время до респавна агента (None = не ждёт)
    pub fn pending_respawn(&self, agent: Entity) -> Option<f32> {
        self.respawns
            .iter()
            .find(|respawn| respawn.agent == agent)
            .map(|respawn| respawn.remaining)
    }

    pub fn end_game_stage(&self) -> Option<EndGameStage> {
        self.end_game.map(|sequence| sequence.stage)
    }

    pub fn take_actions(&mut self) -> Vec<CoordinatorAction> {
        std::mem::take(&mut self.actions)
    }

    fn push(&mut self, action: CoordinatorAction) {
        self.actions.push(action);
    }

    // ========================================================================
    // Bounds
    // ========================================================================

    pub fn bounds(&self) -> LevelBounds {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: LevelBounds) {
        self.bounds = bounds;
        self.push(CoordinatorAction::Camera(CameraEvent::SetConfiner(bounds)));
    }

    pub fn set_bounds_min(&mut self, min: Vec3) {
        self.set_bounds(LevelBounds::new(min, self.bounds.max));
    }

    pub fn set_bounds_max(&mut self, max: Vec3) {
        self.set_bounds(LevelBounds::new(self.bounds.min, max));
    }

    pub fn reset_bounds(&mut self) {
        self.set_bounds(self.config.bounds);
    }

    // ========================================================================
    // Level start
    // ========================================================================

    /// Instantiating → Spawning
    ///
    /// Без игроков уровень сразу Playing (спавнить некого).
    pub fn instantiate(&mut self, players: Vec<Entity>, checkpoints: Vec<CheckpointEntry>) -> bool {
        if self.phase != LevelPhase::Instantiating {
            return false;
        }

        self.checkpoints = CheckpointSet::new(
            checkpoints,
            self.config.checkpoint_axis,
            self.config.checkpoint_direction,
        );
        self.players = players;
        self.eliminated.clear();

        if self.players.is_empty() {
            crate::log_warning(&format!("⚠️ Level '{}': no agents to spawn", self.config.level_name));
            self.phase = LevelPhase::Playing;
            return false;
        }

        self.phase = LevelPhase::Spawning;
        true
    }

    /// Spawning → Playing: расставляет игроков, привязывает respawnables
    pub fn spawn_players(&mut self, resume: Option<SpawnPoint>, respawnables: &[RespawnableEntry]) -> bool {
        if self.phase != LevelPhase::Spawning {
            return false;
        }

        self.push(CoordinatorAction::Publish(LevelEvent::new(LevelEventKind::SpawnCharacterStarts)));

        let plan = plan_spawns(self.players.len(), &self.checkpoints, resume);
        let assign_ids = self.players.len() > 1 && self.config.auto_attribute_player_ids;

        for (index, at) in plan.into_iter().enumerate() {
            let agent = self.players[index];
            if assign_ids {
                self.push(CoordinatorAction::AssignPlayerId {
                    agent,
                    player_id: format!("Player{}", index + 1),
                    index: index as u32,
                });
            }
            match at {
                Some(at) => self.push(CoordinatorAction::Respawn {
                    agent,
                    at,
                    reset_respawnables: false,
                }),
                None => crate::log_warning(&format!("⚠️ No spawn point for {:?}", agent)),
            }
        }

        self.checkpoints.assign_respawnables(respawnables);

        let first = self.players[0];
        self.push(CoordinatorAction::Publish(LevelEvent::from_agent(LevelEventKind::LevelStart, first)));
        self.push(CoordinatorAction::Camera(CameraEvent::SetConfiner(self.bounds)));
        self.push(CoordinatorAction::Camera(CameraEvent::SetTarget(first)));
        self.push(CoordinatorAction::Camera(CameraEvent::StartFollowing));

        self.phase = LevelPhase::Playing;
        self.time_in_level = 0.0;
        crate::log(&format!(
            "🏁 Level '{}' started: {} player(s), {} checkpoint(s)",
            self.config.level_name,
            self.players.len(),
            self.checkpoints.len()
        ));
        true
    }

    // ========================================================================
    // Checkpoints / players
    // ========================================================================

    pub fn set_current_checkpoint(&mut self, checkpoint: Entity) -> bool {
        let previous = self.checkpoints.current_index();
        let accepted = self.checkpoints.set_current(checkpoint);
        if accepted && self.checkpoints.current_index() != previous {
            crate::log(&format!("🚩 Checkpoint {:?} is now current", checkpoint));
        }
        accepted
    }

    /// Character switch: слот игрока переходит к другому агенту
    pub fn replace_player(&mut self, old: Entity, new: Entity) -> bool {
        let Some(slot) = self.players.iter_mut().find(|player| **player == old) else {
            return false;
        };
        *slot = new;
        for respawn in &mut self.respawns {
            if respawn.agent == old {
                respawn.agent = new;
            }
        }
        true
    }

    // ========================================================================
    // Events
    // ========================================================================

    pub fn handle_level_event(&mut self, event: &LevelEvent, session: &mut GameSession) {
        match event.kind {
            LevelEventKind::PlayerDeath => {
                if let Some(agent) = event.origin {
                    self.on_agent_death(agent, session);
                }
            }
            LevelEventKind::Pause => self.set_paused(true, session),
            LevelEventKind::UnPause => self.set_paused(false, session),
            LevelEventKind::TogglePause => {
                let paused = !session.is_paused();
                self.set_paused(paused, session);
            }
            _ => {}
        }
    }

    /// Pause/UnPause идемпотентны
    pub fn set_paused(&mut self, paused: bool, session: &mut GameSession) {
        if session.is_paused() == paused {
            return;
        }
        session.set_paused(paused);
        self.push(CoordinatorAction::SetPaused(paused));
        crate::log(if paused { "⏸️ Game paused" } else { "▶️ Game resumed" });
    }

    /// Смерть игрока: жизни → game over, либо респавн / выбывание
    pub fn on_agent_death(&mut self, agent: Entity, session: &mut GameSession) {
        if !matches!(self.phase, LevelPhase::Playing | LevelPhase::Respawning) {
            return;
        }
        if !self.players.contains(&agent) || self.is_eliminated(agent) {
            return;
        }
        // Победитель уже определён, end game доигрывается до конца
        if self.end_game.is_some() {
            return;
        }

        match self.config.multiplayer.as_ref().map(|rules| rules.allow_respawn) {
            Some(true) => {
                self.schedule_respawn(agent, false);
                return;
            }
            Some(false) => {
                self.eliminate(agent);
                return;
            }
            None => {}
        }

        if session.lives_tracked() {
            session.lose_life();
            if session.current_lives == 0 {
                self.game_over(session);
                return;
            }
        }

        // Без мультиплеерных правил респавн только в solo
        if self.players.len() < 2 {
            self.schedule_respawn(agent, true);
        }
    }

    /// Один отложенный респавн на агента: новый отменяет старый
    fn schedule_respawn(&mut self, agent: Entity, solo: bool) {
        self.respawns.retain(|respawn| respawn.agent != agent);
        self.respawns.push(PendingRespawn {
            agent,
            remaining: self.config.respawn_delay,
            solo,
        });

        if solo {
            self.push(CoordinatorAction::Camera(CameraEvent::StopFollowing));
            self.phase = LevelPhase::Respawning;
        }
        crate::log(&format!(
            "⏳ {:?} respawns in {:.1}s",
            agent, self.config.respawn_delay
        ));
    }

    fn eliminate(&mut self, agent: Entity) {
        self.eliminated.push(agent);
        self.push(CoordinatorAction::Despawn(agent));
        crate::log(&format!("❌ {:?} eliminated", agent));

        let alive: Vec<Entity> = self.alive_players().collect();
        if alive.len() == 1 && self.end_game.is_none() {
            let freeze_delay = self
                .config
                .multiplayer
                .as_ref()
                .map(|rules| rules.freeze_delay)
                .unwrap_or_default();
            self.end_game = Some(EndGameSequence {
                winner: alive[0],
                stage: EndGameStage::Freeze,
                remaining: freeze_delay,
            });
        }
    }

    fn game_over(&mut self, session: &mut GameSession) {
        self.phase = LevelPhase::LevelEnd;
        self.respawns.clear();

        if session.reset_lives_on_game_over {
            session.reset_lives();
        }
        if session.reset_persistent_on_game_over {
            if let Some(persistent) = session.take_persistent_agent() {
                self.push(CoordinatorAction::Despawn(persistent));
            }
        }
        if session.reset_stored_on_game_over {
            session.clear_stored_agent();
        }

        self.push(CoordinatorAction::Publish(LevelEvent::new(LevelEventKind::GameOver)));
        if let Some(level) = session.game_over_level.clone() {
            self.push(CoordinatorAction::LoadLevel(level));
        }
        crate::log_warning(&format!("☠️ Game over in '{}'", self.config.level_name));
    }

    // ========================================================================
    // Level change
    // ========================================================================

    /// LevelEnd + disable агентов; загрузка после outro fade
    ///
    /// `entry` сохраняется в сессии как point of entry целевого уровня.
    pub fn request_level_change(
        &mut self,
        destination: Option<String>,
        entry: Option<(usize, Facing)>,
        session: &mut GameSession,
    ) -> bool {
        if self.transition.is_some() {
            return false;
        }
        let Some(destination) = destination.or_else(|| self.config.next_level.clone()) else {
            crate::log_warning(&format!("⚠️ Level '{}' has no next level", self.config.level_name));
            return false;
        };

        if let Some((entry_index, facing)) = entry {
            session.store_point_of_entry(destination.clone(), entry_index, facing);
        }

        self.push(CoordinatorAction::Publish(LevelEvent::new(LevelEventKind::LevelEnd)));
        self.push(CoordinatorAction::DisableAgents);
        self.respawns.clear();
        self.phase = LevelPhase::LevelEnd;
        crate::log(&format!("🚪 '{}' → '{}'", self.config.level_name, destination));

        self.transition = Some(PendingTransition {
            destination,
            remaining: self.config.outro_fade_duration,
        });
        true
    }

    // ========================================================================
    // Timers
    // ========================================================================

    /// Тик таймеров: респавн и end game по scaled time.
    /// Outro fade тоже по scaled, но при замороженном времени (scaled delta 0) идёт по real.
    pub fn advance(&mut self, scaled_delta: f32, real_delta: f32) {
        if matches!(self.phase, LevelPhase::Playing | LevelPhase::Respawning) {
            self.time_in_level += scaled_delta;
        }
        self.advance_respawns(scaled_delta);
        self.advance_end_game(scaled_delta);

        let fade_delta = if scaled_delta > 0.0 { scaled_delta } else { real_delta };
        self.advance_transition(fade_delta);
    }

    fn advance_respawns(&mut self, delta: f32) {
        if self.respawns.is_empty() {
            return;
        }

        for respawn in &mut self.respawns {
            respawn.remaining -= delta;
        }
        let (due, waiting): (Vec<PendingRespawn>, Vec<PendingRespawn>) = std::mem::take(&mut self.respawns)
            .into_iter()
            .partition(|respawn| respawn.remaining <= 0.0);
        self.respawns = waiting;

        for respawn in due {
            self.complete_respawn(respawn);
        }

        if self.phase == LevelPhase::Respawning && !self.respawns.iter().any(|respawn| respawn.solo) {
            self.phase = LevelPhase::Playing;
        }
    }

    fn complete_respawn(&mut self, respawn: PendingRespawn) {
        let checkpoint = if respawn.solo {
            self.checkpoints.current()
        } else {
            self.players
                .iter()
                .position(|player| *player == respawn.agent)
                .and_then(|index| self.checkpoints.spawn_slot(index))
        };
        let at = checkpoint.map(SpawnPoint::at_checkpoint);

        if respawn.solo {
            self.push(CoordinatorAction::Camera(CameraEvent::StartFollowing));
        }
        match at {
            Some(at) => self.push(CoordinatorAction::Respawn {
                agent: respawn.agent,
                at,
                reset_respawnables: true,
            }),
            None => crate::log_warning(&format!("⚠️ No checkpoint to respawn {:?}", respawn.agent)),
        }
        if respawn.solo {
            if self.config.reset_points_on_restart {
                self.push(CoordinatorAction::SetPoints(0));
            }
            self.reset_bounds();
            self.time_in_level = 0.0;
        }

        self.push(CoordinatorAction::Publish(LevelEvent::from_agent(
            LevelEventKind::Respawn,
            respawn.agent,
        )));
        crate::log(&format!("🔁 {:?} respawned", respawn.agent));
    }

    fn advance_end_game(&mut self, delta: f32) {
        let Some(mut sequence) = self.end_game.take() else {
            return;
        };
        sequence.remaining -= delta;
        if sequence.remaining > 0.0 {
            self.end_game = Some(sequence);
            return;
        }

        let rules = self.config.multiplayer.clone().unwrap_or_default();
        match sequence.stage {
            EndGameStage::Freeze => {
                self.push(CoordinatorAction::FreezeAgents);
                self.end_game = Some(EndGameSequence {
                    stage: EndGameStage::Announce,
                    remaining: rules.announce_delay,
                    ..sequence
                });
            }
            EndGameStage::Announce => {
                self.push(CoordinatorAction::AnnounceWinner(sequence.winner));
                self.end_game = Some(EndGameSequence {
                    stage: EndGameStage::Reload,
                    remaining: rules.reload_delay,
                    ..sequence
                });
            }
            EndGameStage::Reload => {
                self.push(CoordinatorAction::LoadLevel(self.config.level_name.clone()));
                self.phase = LevelPhase::LevelEnd;
            }
        }
    }

    fn advance_transition(&mut self, delta: f32) {
        let Some(mut transition) = self.transition.take() else {
            return;
        };
        transition.remaining -= delta;
        if transition.remaining > 0.0 {
            self.transition = Some(transition);
            return;
        }

        self.push(CoordinatorAction::Publish(LevelEvent::new(LevelEventKind::UnPause)));
        self.push(CoordinatorAction::Publish(LevelEvent::new(LevelEventKind::LoadNextScene)));
        self.push(CoordinatorAction::LoadLevel(transition.destination));
    }
}
