//! Headless симуляция Leapfall
//!
//! Один уровень: 3 чекпоинта, игрок из префаба, смерть и респавн.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use leapfall_simulation::agent::{AgentBlueprint, DamageAmount, DamageRequest};
use leapfall_simulation::level::{AgentPrefabs, Checkpoint, CheckpointReached, LevelEvent};
use leapfall_simulation::{create_headless_app, log_info, Agent, AgentInput, AgentKind, GameSession, SimulationPlugin};

fn main() {
    let seed = 42;
    log_info(&format!("Starting Leapfall headless simulation (seed: {})", seed));

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)))
        .insert_resource(GameSession::with_lives(3, 3))
        .insert_resource(AgentPrefabs(vec![AgentBlueprint::new("hero", AgentKind::Player)]));

    let checkpoints: Vec<Entity> = [0.0, 20.0, 40.0]
        .into_iter()
        .map(|x| {
            app.world_mut()
                .spawn((Checkpoint::default(), Transform::from_xyz(x, 0.0, 0.0)))
                .id()
        })
        .collect();

    let mut level_events = app.world().resource::<Events<LevelEvent>>().get_cursor();

    for tick in 0..600 {
        let player = app
            .world_mut()
            .query_filtered::<Entity, With<Agent>>()
            .iter(app.world())
            .next();

        if let Some(player) = player {
            // Идём вправо, на 200 тике берём второй чекпоинт, на 300 умираем
            if let Some(mut input) = app.world_mut().get_mut::<AgentInput>(player) {
                input.horizontal = 1.0;
            }
            if tick == 200 {
                app.world_mut().send_event(CheckpointReached {
                    checkpoint: checkpoints[1],
                    agent: player,
                });
            }
            if tick == 300 {
                app.world_mut().send_event(DamageRequest {
                    target: player,
                    amount: DamageAmount::Lethal,
                });
            }
        }

        app.update();

        let events = app.world().resource::<Events<LevelEvent>>();
        for event in level_events.read(events) {
            log_info(&format!("Tick {}: {:?}", tick, event.kind));
        }
    }

    let session = app.world().resource::<GameSession>();
    log_info(&format!(
        "Simulation complete! lives {}/{}, points {}",
        session.current_lives,
        session.maximum_lives,
        session.points()
    ));
}
