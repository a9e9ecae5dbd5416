//! Level events - по одному typed channel на вид события
//!
//! Доставка в том же кадре: publisher и handler системы стоят в одной
//! цепочке SimulationSet::Level (см. LevelPlugin).

use bevy::prelude::*;

use crate::components::Facing;

use super::bounds::LevelBounds;

// ============================================================================
// Lifecycle vocabulary
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelEventKind {
    SpawnCharacterStarts,
    LevelStart,
    LevelComplete,
    LevelEnd,
    Pause,
    UnPause,
    TogglePause,
    PlayerDeath,
    Respawn,
    GameOver,
    CharacterSwitch,
    LoadNextScene,
}

/// Сигнал жизненного цикла уровня (origin = агент-виновник, если есть)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelEvent {
    pub kind: LevelEventKind,
    pub origin: Option<Entity>,
}

impl LevelEvent {
    pub fn new(kind: LevelEventKind) -> Self {
        Self { kind, origin: None }
    }

    pub fn from_agent(kind: LevelEventKind, agent: Entity) -> Self {
        Self {
            kind,
            origin: Some(agent),
        }
    }
}

// ============================================================================
// Points / camera
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointsMethod {
    Set,
    Add,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointsEvent {
    pub method: PointsMethod,
    pub points: i32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum CameraEvent {
    StartFollowing,
    StopFollowing,
    SetTarget(Entity),
    SetConfiner(LevelBounds),
}

// ============================================================================
// Checkpoints / respawnables
// ============================================================================

/// Агент дошёл до чекпоинта (хост детектит триггер)
#[derive(Event, Debug, Clone, Copy)]
pub struct CheckpointReached {
    pub checkpoint: Entity,
    pub agent: Entity,
}

/// Объект, привязанный к чекпоинту, должен вернуться в исходное состояние
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RespawnableReset {
    pub object: Entity,
    pub checkpoint: Entity,
}

// ============================================================================
// Level flow
// ============================================================================

/// Переход на другой уровень (None = следующий из конфига)
///
/// `entry` = индекс point of entry в целевом уровне + facing на входе.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct LevelChangeRequest {
    pub destination: Option<String>,
    pub entry: Option<(usize, Facing)>,
}

/// Хост должен загрузить сцену (загрузка вне ядра)
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct LevelLoadRequested {
    pub level: String,
}

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct MultiplayerWinner {
    pub agent: Entity,
    pub player_id: String,
}

/// Переключить персонажа в слоте игрока (None = следующий по правилу roster)
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct SwitchCharacterRequest {
    pub target: Option<usize>,
}
