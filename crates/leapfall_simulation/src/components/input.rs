//! Intent snapshot агента
//!
//! Для headless тестов - mock input через этот компонент.
//! Для игры - заполняется хостом из input device (polling снаружи ядра).

use bevy::prelude::*;

#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AgentInput {
    /// -1.0 (влево) .. 1.0 (вправо)
    pub horizontal: f32,
    pub vertical: f32,
    /// Нажат в этом кадре
    pub jump_pressed: bool,
    pub jump_held: bool,
}
