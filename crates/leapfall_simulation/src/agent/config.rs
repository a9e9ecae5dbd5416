//! Статическая конфигурация агента

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{Facing, SpawnFacing};

/// Как агент визуально разворачивается (выбор статический, per-agent)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlipMode {
    /// Flip подавлен (кроме форсированного, например при спавне)
    Disabled,
    /// Зеркалим scale модели или flip_x спрайта (по VisualKind)
    #[default]
    Mirror,
    /// Накапливаем target rotation, модель доворачивается в rotate_model
    Rotate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VisualKind {
    #[default]
    Sprite,
    Model,
}

/// Поведение при смерти (раньше угадывалось по текущей force, теперь явно)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeathBehaviour {
    pub gravity_off_on_death: bool,
    /// One-shot импульс, применяется один раз за смерть
    pub apply_death_force: bool,
    pub death_force: Vec2,
}

impl Default for DeathBehaviour {
    fn default() -> Self {
        Self {
            gravity_off_on_death: false,
            apply_death_force: true,
            death_force: Vec2::new(0.0, 10.0), // подброс вверх
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub initial_facing: Facing,
    pub spawn_facing: SpawnFacing,
    pub flip_mode: FlipMode,
    pub visual: VisualKind,
    /// Множитель scale при mirror flip модели
    pub model_flip_value: Vec3,
    /// Дельта target rotation на каждый flip (градусы)
    pub model_rotation_value: Vec3,
    /// 0 = мгновенный snap к target rotation
    pub model_rotation_speed: f32,
    pub camera_target_speed: f32,
    /// Выше этой дистанции до земли агент считается airborne
    pub airborne_distance: f32,
    pub send_state_change_events: bool,
    pub send_state_update_events: bool,
    pub use_default_animator: bool,
    pub death: DeathBehaviour,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            initial_facing: Facing::Right,
            spawn_facing: SpawnFacing::Default,
            flip_mode: FlipMode::Mirror,
            visual: VisualKind::Sprite,
            model_flip_value: Vec3::new(-1.0, 1.0, 1.0),
            model_rotation_value: Vec3::new(0.0, 180.0, 0.0),
            model_rotation_speed: 0.0,
            camera_target_speed: 5.0,
            airborne_distance: 0.5,
            send_state_change_events: true,
            send_state_update_events: false,
            use_default_animator: true,
            death: DeathBehaviour::default(),
        }
    }
}
