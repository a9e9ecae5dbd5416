//! Rapier bridge - для хостов, где solver = bevy_rapier3d
//!
//! Velocity агента интегрирует Rapier (KinematicVelocityBased), мы только
//! копируем Controller2D.world_speed → Velocity.linvel и gravity → GravityScale.

use bevy::prelude::*;
use bevy_rapier3d::plugin::PhysicsSet;
use bevy_rapier3d::prelude::*;

use crate::components::{Controller2D, PlatformerController};

/// Rapier компоненты для агента (capsule 1.8m, plane XY)
pub fn insert_rapier_body(commands: &mut Commands, agent: Entity) {
    commands.entity(agent).insert((
        RigidBody::KinematicVelocityBased,
        Collider::capsule_y(0.5, 0.4),
        Velocity::default(),
        GravityScale(1.0),
        LockedAxes::ROTATION_LOCKED | LockedAxes::TRANSLATION_LOCKED_Z,
    ));
}

pub fn sync_controllers_to_rapier(mut query: Query<(&Controller2D, &mut Velocity, Option<&mut GravityScale>)>) {
    for (controller, mut velocity, gravity_scale) in query.iter_mut() {
        let speed = controller.world_speed();
        velocity.linvel = Vec3::new(speed.x, speed.y, 0.0);

        if let Some(mut gravity_scale) = gravity_scale {
            gravity_scale.0 = if controller.gravity_active() { 1.0 } else { 0.0 };
        }
    }
}

/// Plugin для Rapier хоста (вместо headless PlatformerPhysicsPlugin)
pub struct RapierBridgePlugin;

impl Plugin for RapierBridgePlugin {
    fn build(&self, app: &mut App) {
        // До rapier physics step
        app.add_systems(PostUpdate, sync_controllers_to_rapier.before(PhysicsSet::SyncBackend));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn test_sync_copies_velocity_and_gravity() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins).add_plugins(RapierBridgePlugin);

        let mut controller = Controller2D::default();
        controller.set_force(Vec2::new(3.0, -1.0));
        controller.platform_velocity = Vec2::new(1.0, 0.0);
        controller.set_gravity_active(false);

        let agent = app.world_mut().spawn(controller).id();
        app.world_mut()
            .run_system_once(move |mut commands: Commands| insert_rapier_body(&mut commands, agent))
            .expect("insert rapier body");

        app.update();

        let velocity = app.world().get::<Velocity>(agent).expect("Velocity");
        assert_eq!(velocity.linvel, Vec3::new(4.0, -1.0, 0.0));
        let gravity_scale = app.world().get::<GravityScale>(agent).expect("GravityScale");
        assert_eq!(gravity_scale.0, 0.0);
    }
}
