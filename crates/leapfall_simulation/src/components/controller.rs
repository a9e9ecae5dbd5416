//! Physics/collision collaborator interface
//!
//! Ядро только читает результаты коллизий и отдаёт команды force/gravity.
//! Сам solver снаружи: headless интегратор (physics::controller) или Rapier.

use bevy::prelude::*;

/// Результаты последнего шага коллизий
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct CollisionState {
    pub grounded: bool,
    pub colliding_left: bool,
    pub colliding_right: bool,
    pub colliding_above: bool,
    pub colliding_below: bool,
}

/// Контракт контроллера, которым пользуется агент
///
/// Read-only: коллизии, скорость, расстояние до земли.
/// Write-only: force и gravity.
pub trait PlatformerController {
    fn collisions(&self) -> CollisionState;

    /// Текущая скорость (локальная, без платформы)
    fn speed(&self) -> Vec2;

    /// Скорость в мире (с учётом движущейся платформы)
    fn world_speed(&self) -> Vec2;

    /// None = земли под агентом не видно
    fn distance_to_ground(&self) -> Option<f32>;

    fn set_force(&mut self, force: Vec2);
    fn set_horizontal_force(&mut self, x: f32);
    fn set_vertical_force(&mut self, y: f32);
    fn add_force(&mut self, force: Vec2);

    fn set_gravity_active(&mut self, active: bool);
    fn gravity_active(&self) -> bool;

    fn collisions_on(&mut self);
    fn collisions_off(&mut self);
}

/// 2D kinematic controller (plane XY)
///
/// Velocity интегрируем сами (physics::controller), Rapier получает копию.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Controller2D {
    pub velocity: Vec2,
    /// Скорость платформы под ногами (world_speed = velocity + platform)
    pub platform_velocity: Vec2,
    /// Ускорение гравитации (units/s²)
    pub gravity: f32,
    pub state: CollisionState,
    pub distance_to_ground: Option<f32>,
    gravity_active: bool,
    collisions_enabled: bool,
}

impl Default for Controller2D {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            platform_velocity: Vec2::ZERO,
            gravity: -30.0, // platformer gravity, сильнее земной
            state: CollisionState::default(),
            distance_to_ground: None,
            gravity_active: true,
            collisions_enabled: true,
        }
    }
}

impl Controller2D {
    pub fn collisions_enabled(&self) -> bool {
        self.collisions_enabled
    }
}

impl PlatformerController for Controller2D {
    fn collisions(&self) -> CollisionState {
        self.state
    }

    fn speed(&self) -> Vec2 {
        self.velocity
    }

    fn world_speed(&self) -> Vec2 {
        self.velocity + self.platform_velocity
    }

    fn distance_to_ground(&self) -> Option<f32> {
        self.distance_to_ground
    }

    fn set_force(&mut self, force: Vec2) {
        self.velocity = force;
    }

    fn set_horizontal_force(&mut self, x: f32) {
        self.velocity.x = x;
    }

    fn set_vertical_force(&mut self, y: f32) {
        self.velocity.y = y;
    }

    fn add_force(&mut self, force: Vec2) {
        self.velocity += force;
    }

    fn set_gravity_active(&mut self, active: bool) {
        self.gravity_active = active;
    }

    fn gravity_active(&self) -> bool {
        self.gravity_active
    }

    fn collisions_on(&mut self) {
        self.collisions_enabled = true;
    }

    fn collisions_off(&mut self) {
        self.collisions_enabled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_speed_includes_platform() {
        let mut controller = Controller2D::default();
        controller.set_force(Vec2::new(2.0, 1.0));
        controller.platform_velocity = Vec2::new(1.0, 0.0);

        assert_eq!(controller.speed(), Vec2::new(2.0, 1.0));
        assert_eq!(controller.world_speed(), Vec2::new(3.0, 1.0));
    }

    #[test]
    fn test_axis_forces() {
        let mut controller = Controller2D::default();
        controller.set_force(Vec2::new(4.0, -2.0));
        controller.set_horizontal_force(0.0);
        assert_eq!(controller.velocity, Vec2::new(0.0, -2.0));

        controller.add_force(Vec2::new(1.0, 1.0));
        controller.set_vertical_force(5.0);
        assert_eq!(controller.velocity, Vec2::new(1.0, 5.0));
    }
}
