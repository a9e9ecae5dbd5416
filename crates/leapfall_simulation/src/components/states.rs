//! Дискретные состояния агента: movement, condition, facing

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Locomotion mode агента
///
/// Пишут только abilities и сам агент, читают все (animation binding тоже).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum MovementState {
    Null,
    #[default]
    Idle,
    Walking,
    Running,
    Falling,
    Jumping,
    DoubleJumping,
    Crouching,
    Crawling,
    Dashing,
    LookingUp,
    WallClinging,
    WallJumping,
    LedgeHanging,
    Gliding,
    Pushing,
}

/// High-level статус агента
///
/// Инвариант: ровно одно активное значение в любой момент.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum ConditionState {
    #[default]
    Normal,
    ControlledMovement,
    Frozen,
    Paused,
    Dead,
    Stunned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn opposite(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    pub fn is_right(self) -> bool {
        self == Facing::Right
    }

    /// Знак по оси X (+1 вправо)
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// Направление, в которое агент принудительно разворачивается при спавне
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum SpawnFacing {
    /// Не трогать текущий facing
    #[default]
    Default,
    Left,
    Right,
}

impl SpawnFacing {
    pub fn as_facing(self) -> Option<Facing> {
        match self {
            SpawnFacing::Default => None,
            SpawnFacing::Left => Some(Facing::Left),
            SpawnFacing::Right => Some(Facing::Right),
        }
    }
}
