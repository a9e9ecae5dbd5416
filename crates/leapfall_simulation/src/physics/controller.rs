//! Headless интегратор Controller2D
//!
//! Заменяет solver когда Rapier не подключен:
//! - gravity (если активна и агент не стоит на земле)
//! - velocity → Transform (plane XY)
//! - статическая геометрия уровня: пол, потолок, стены → CollisionState

use bevy::prelude::*;

use crate::components::{CollisionState, Controller2D, PlatformerController};

/// Статическая геометрия для headless режима (None = плоскости нет)
#[derive(Resource, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct LevelGeometry {
    pub floor: Option<f32>,
    pub ceiling: Option<f32>,
    pub left_wall: Option<f32>,
    pub right_wall: Option<f32>,
}

impl Default for LevelGeometry {
    fn default() -> Self {
        Self {
            floor: Some(0.0),
            ceiling: None,
            left_wall: None,
            right_wall: None,
        }
    }
}

/// Один шаг интеграции для одного контроллера
pub fn step_controller(controller: &mut Controller2D, translation: &mut Vec3, geometry: &LevelGeometry, delta: f32) {
    if delta <= 0.0 {
        return;
    }

    let resting = controller.state.grounded && controller.velocity.y <= 0.0;
    if controller.gravity_active() && !resting {
        controller.velocity.y += controller.gravity * delta;
    }

    let motion = controller.world_speed() * delta;
    translation.x += motion.x;
    translation.y += motion.y;

    let mut state = CollisionState::default();

    if controller.collisions_enabled() {
        if let Some(floor) = geometry.floor {
            if translation.y <= floor && controller.velocity.y <= 0.0 {
                translation.y = floor;
                controller.velocity.y = 0.0;
                state.grounded = true;
                state.colliding_below = true;
            }
        }
        if let Some(ceiling) = geometry.ceiling {
            if translation.y >= ceiling && controller.velocity.y > 0.0 {
                translation.y = ceiling;
                controller.velocity.y = 0.0;
                state.colliding_above = true;
            }
        }
        if let Some(left) = geometry.left_wall {
            if translation.x <= left {
                translation.x = left;
                controller.velocity.x = controller.velocity.x.max(0.0);
                state.colliding_left = true;
            }
        }
        if let Some(right) = geometry.right_wall {
            if translation.x >= right {
                translation.x = right;
                controller.velocity.x = controller.velocity.x.min(0.0);
                state.colliding_right = true;
            }
        }
    }

    controller.state = state;
    controller.distance_to_ground = match geometry.floor {
        Some(floor) if controller.collisions_enabled() => Some((translation.y - floor).max(0.0)),
        _ => None,
    };
}

/// Система интеграции (scaled time: пауза останавливает физику)
pub fn integrate_controllers(
    time: Res<Time<Virtual>>,
    geometry: Res<LevelGeometry>,
    mut query: Query<(&mut Controller2D, &mut Transform)>,
) {
    let delta = time.delta_secs();

    for (mut controller, mut transform) in query.iter_mut() {
        step_controller(&mut controller, &mut transform.translation, &geometry, delta);
    }
}
