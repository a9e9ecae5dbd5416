//! Physics collaborator
//!
//! Агент видит только `PlatformerController` (Controller2D).
//! Solver подключается одним из плагинов:
//! - `PlatformerPhysicsPlugin` - headless интегратор (тесты, сервер)
//! - `RapierBridgePlugin` - хосты с bevy_rapier3d

pub mod controller;
pub mod rapier_bridge;

pub use controller::{integrate_controllers, step_controller, LevelGeometry};
pub use rapier_bridge::{insert_rapier_body, sync_controllers_to_rapier, RapierBridgePlugin};

use bevy::prelude::*;

use crate::SimulationSet;

/// Headless физика: интеграция после логики агентов и уровня
pub struct PlatformerPhysicsPlugin;

impl Plugin for PlatformerPhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<LevelGeometry>()
            .init_resource::<LevelGeometry>()
            .add_systems(Update, integrate_controllers.in_set(SimulationSet::Physics));
    }
}
