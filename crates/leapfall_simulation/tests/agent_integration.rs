//! Agent integration tests
//!
//! Агент в полном headless App: abilities + headless физика + уровень.
//!
//! Проверяем:
//! - ходьба, auto-face, остановка
//! - прыжок: Idle → Jumping → Falling → Idle через физику
//! - урон очками, смерть, death impulse, респавн
//! - character switch

use std::time::Duration;

use bevy::ecs::event::EventCursor;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use leapfall_simulation::agent::{AgentBlueprint, AgentDied, AgentStateChange, AgentStateChanged, DamageAmount, DamageRequest};
use leapfall_simulation::level::{AgentPrefabs, CharacterRoster, Checkpoint, NextCharacterChoice, SwitchCharacterRequest};
use leapfall_simulation::*;

/// Helper: App с одним игроком на чекпоинте x=0
fn create_agent_app(hero: AgentBlueprint) -> (App, Entity) {
    let mut app = create_headless_app(7);
    app.add_plugins(SimulationPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_micros(16_667)))
        .insert_resource(AgentPrefabs(vec![hero]));
    app.world_mut()
        .spawn((Checkpoint::default(), Transform::from_xyz(0.0, 0.0, 0.0)));

    // Старт уровня + пара кадров чтобы встать на пол
    for _ in 0..5 {
        app.update();
    }

    let player = app.world().resource::<SpawnCoordinator>().players()[0];
    (app, player)
}

fn hero() -> AgentBlueprint {
    AgentBlueprint::new("hero", AgentKind::Player)
}

fn set_input(app: &mut App, agent: Entity, input: AgentInput) {
    if let Some(mut current) = app.world_mut().get_mut::<AgentInput>(agent) {
        *current = input;
    }
}

fn walk(horizontal: f32) -> AgentInput {
    AgentInput {
        horizontal,
        ..Default::default()
    }
}

fn run(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

fn agent(app: &App, entity: Entity) -> &Agent {
    app.world().get::<Agent>(entity).expect("Agent component")
}

fn translation(app: &App, entity: Entity) -> Vec3 {
    app.world().get::<Transform>(entity).expect("Transform").translation
}

fn movement_changes(
    app: &App,
    cursor: &mut EventCursor<AgentStateChanged>,
    agent: Entity,
) -> Vec<(MovementState, MovementState)> {
    cursor
        .read(app.world().resource::<Events<AgentStateChanged>>())
        .filter(|event| event.agent == agent)
        .filter_map(|event| match event.change {
            AgentStateChange::Movement(StateNotification::Changed { from, to }) => Some((from, to)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_walk_turn_and_stop() {
    let (mut app, player) = create_agent_app(hero());
    let start = translation(&app, player);

    set_input(&mut app, player, walk(1.0));
    run(&mut app, 30);

    assert!(translation(&app, player).x > start.x + 2.0, "0.5s при 6 u/s");
    assert_eq!(agent(&app, player).movement.current(), MovementState::Walking);
    assert_eq!(agent(&app, player).facing(), Facing::Right);
    assert!(!agent(&app, player).model.sprite_flip_x);

    set_input(&mut app, player, walk(-1.0));
    run(&mut app, 5);

    assert_eq!(agent(&app, player).facing(), Facing::Left);
    assert!(agent(&app, player).model.sprite_flip_x, "Mirror: спрайт отражён");

    set_input(&mut app, player, walk(0.0));
    run(&mut app, 3);

    assert_eq!(agent(&app, player).movement.current(), MovementState::Idle);
    let controller = app.world().get::<Controller2D>(player).expect("Controller2D");
    assert_eq!(controller.velocity.x, 0.0);
}

#[test]
fn test_jump_arc_through_physics() {
    let (mut app, player) = create_agent_app(hero());
    let mut state_events = app.world().resource::<Events<AgentStateChanged>>().get_cursor();

    set_input(
        &mut app,
        player,
        AgentInput {
            jump_pressed: true,
            jump_held: true,
            ..Default::default()
        },
    );
    app.update();
    set_input(&mut app, player, AgentInput::default());

    let mut changes = movement_changes(&app, &mut state_events, player);
    assert_eq!(agent(&app, player).movement.current(), MovementState::Jumping);

    let mut peak: f32 = 0.0;
    for _ in 0..90 {
        app.update();
        peak = peak.max(translation(&app, player).y);
        changes.extend(movement_changes(&app, &mut state_events, player));
    }

    assert!(peak > 1.5, "высота прыжка {}", peak);
    assert_eq!(translation(&app, player).y, 0.0);
    assert_eq!(agent(&app, player).movement.current(), MovementState::Idle);
    assert_eq!(
        changes,
        vec![
            (MovementState::Idle, MovementState::Jumping),
            (MovementState::Jumping, MovementState::Falling),
            (MovementState::Falling, MovementState::Idle),
        ]
    );
}

#[test]
fn test_point_damage_kills_then_respawns() {
    let (mut app, player) = create_agent_app(hero().with_health(Some(3)));
    let mut deaths = app.world().resource::<Events<AgentDied>>().get_cursor();

    for _ in 0..2 {
        app.world_mut().send_event(DamageRequest {
            target: player,
            amount: DamageAmount::Points(1),
        });
        app.update();
    }
    assert_eq!(app.world().get::<Health>(player).map(|health| health.current), Some(1));
    assert!(agent(&app, player).is_alive());

    app.world_mut().send_event(DamageRequest {
        target: player,
        amount: DamageAmount::Points(5),
    });
    app.update();

    let died: Vec<Entity> = deaths
        .read(app.world().resource::<Events<AgentDied>>())
        .map(|death| death.agent)
        .collect();
    assert_eq!(died, vec![player]);
    assert_eq!(agent(&app, player).condition.current(), ConditionState::Dead);

    run(&mut app, 5);
    assert!(translation(&app, player).y > 0.0, "death impulse подбрасывает агента");
    assert!(agent(&app, player).death_impulse_applied());

    // Респавн через 2s (жизни не учитываются)
    run(&mut app, 130);
    assert!(agent(&app, player).is_alive());
    assert_eq!(app.world().get::<Health>(player).map(|health| health.current), Some(3));
    assert!(!agent(&app, player).death_impulse_applied());
}

#[test]
fn test_character_switch_hands_over_state() {
    let (mut app, first) = create_agent_app(hero().with_health(Some(4)));

    let mut candidate = hero().instantiate(1);
    candidate.enabled = false;
    let second = app
        .world_mut()
        .spawn((
            candidate,
            Controller2D::default(),
            AgentInput::default(),
            Transform::from_xyz(100.0, 0.0, 0.0),
            Health::new(10),
        ))
        .id();

    app.world_mut().send_event(DamageRequest {
        target: first,
        amount: DamageAmount::Points(2),
    });
    app.update();

    let mut roster = CharacterRoster::new(vec![first, second], NextCharacterChoice::Sequential);
    roster.common_health = true;
    app.insert_resource(roster);
    let mut level_events = app.world().resource::<Events<LevelEvent>>().get_cursor();
    let first_position = translation(&app, first);

    app.world_mut().send_event(SwitchCharacterRequest::default());
    app.update();

    assert_eq!(app.world().resource::<SpawnCoordinator>().players(), &[second]);
    assert!(app.world().get::<Player>(second).is_some());
    assert!(app.world().get::<Player>(first).is_none());
    assert!(agent(&app, second).enabled);
    assert!(!agent(&app, first).enabled);
    assert_eq!(translation(&app, second).x, first_position.x);
    assert_eq!(app.world().get::<Health>(second).map(|health| health.current), Some(2));
    assert_eq!(app.world().resource::<CharacterRoster>().current(), 1);

    let switched: Vec<LevelEventKind> = level_events
        .read(app.world().resource::<Events<LevelEvent>>())
        .map(|event| event.kind)
        .collect();
    assert!(switched.contains(&LevelEventKind::CharacterSwitch));
}
