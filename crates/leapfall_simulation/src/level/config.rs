//! Level configuration

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::agent::AgentBlueprint;

use super::bounds::LevelBounds;
use super::checkpoint::{CheckpointAxis, CheckpointDirection};

/// Именованная точка входа в уровень (индекс = позиция в `LevelConfig::points_of_entry`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfEntry {
    pub name: String,
    pub position: Vec3,
}

/// Правила мультиплеера
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiplayerRules {
    /// false = умерший игрок выбывает
    pub allow_respawn: bool,
    /// Пауза перед заморозкой всех агентов (секунды)
    pub freeze_delay: f32,
    /// Пауза перед объявлением победителя
    pub announce_delay: f32,
    /// Пауза перед перезагрузкой уровня
    pub reload_delay: f32,
}

impl Default for MultiplayerRules {
    fn default() -> Self {
        Self {
            allow_respawn: false,
            freeze_delay: 1.0,
            announce_delay: 1.0,
            reload_delay: 2.0,
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub level_name: String,
    pub next_level: Option<String>,
    pub checkpoint_axis: CheckpointAxis,
    pub checkpoint_direction: CheckpointDirection,
    pub points_of_entry: Vec<PointOfEntry>,
    /// Задержка solo респавна (scaled time)
    pub respawn_delay: f32,
    pub reset_points_on_restart: bool,
    /// Присваивать Player1..N при нескольких агентах
    pub auto_attribute_player_ids: bool,
    pub bounds: LevelBounds,
    /// Длительность outro fade перед загрузкой следующей сцены (scaled time, при заморозке real)
    pub outro_fade_duration: f32,
    pub multiplayer: Option<MultiplayerRules>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            level_name: "level".to_string(),
            next_level: None,
            checkpoint_axis: CheckpointAxis::X,
            checkpoint_direction: CheckpointDirection::Ascending,
            points_of_entry: Vec::new(),
            respawn_delay: 2.0,
            reset_points_on_restart: true,
            auto_attribute_player_ids: true,
            bounds: LevelBounds::default(),
            outro_fade_duration: 1.0,
            multiplayer: None,
        }
    }
}

/// Префабы агентов для уровня без сценовых игроков
#[derive(Resource, Debug, Clone, Default)]
pub struct AgentPrefabs(pub Vec<AgentBlueprint>);
