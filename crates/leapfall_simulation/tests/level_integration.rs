//! Level integration tests
//!
//! Полный headless App (SimulationPlugin), время двигаем вручную (100ms/кадр).
//!
//! Проверяем:
//! - старт уровня: источник агентов, чекпоинты, LevelStart
//! - смерть → жизни → респавн на текущем чекпоинте → game over
//! - паузу, respawnables, мультиплеер, смену уровня

use std::time::Duration;

use bevy::ecs::event::EventCursor;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use leapfall_simulation::agent::{AgentBlueprint, DamageAmount, DamageRequest};
use leapfall_simulation::level::{
    AgentPrefabs, Checkpoint, CheckpointReached, LevelChangeRequest, LevelLoadRequested, LevelPhase,
    MultiplayerRules, MultiplayerWinner, PointOfEntry, Respawnable, RespawnableReset,
};
use leapfall_simulation::*;

const FRAME: Duration = Duration::from_millis(100);

/// Helper: App уровня с префабом игрока
fn create_level_app(config: LevelConfig, session: GameSession) -> App {
    let mut app = create_headless_app(42);
    app.add_plugins(SimulationPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME))
        .insert_resource(SpawnCoordinator::new(config))
        .insert_resource(session)
        .insert_resource(AgentPrefabs(vec![AgentBlueprint::new("hero", AgentKind::Player)]));
    app
}

fn spawn_checkpoints(app: &mut App, xs: &[f32]) -> Vec<Entity> {
    xs.iter()
        .map(|x| {
            app.world_mut()
                .spawn((Checkpoint::default(), Transform::from_xyz(*x, 0.0, 0.0)))
                .id()
        })
        .collect()
}

fn cursor<E: Event>(app: &App) -> EventCursor<E> {
    app.world().resource::<Events<E>>().get_cursor()
}

fn drain<E: Event + Clone>(app: &App, cursor: &mut EventCursor<E>) -> Vec<E> {
    cursor.read(app.world().resource::<Events<E>>()).cloned().collect()
}

/// Прогоняет `frames` кадров, собирая события каждый кадр (Events живут 2 update)
fn run_collecting<E: Event + Clone>(app: &mut App, frames: usize, cursor: &mut EventCursor<E>) -> Vec<E> {
    let mut collected = Vec::new();
    for _ in 0..frames {
        app.update();
        collected.extend(drain(app, cursor));
    }
    collected
}

fn kinds(events: &[LevelEvent]) -> Vec<LevelEventKind> {
    events.iter().map(|event| event.kind).collect()
}

fn players(app: &App) -> Vec<Entity> {
    app.world().resource::<SpawnCoordinator>().players().to_vec()
}

fn kill(app: &mut App, agent: Entity) {
    app.world_mut().send_event(DamageRequest {
        target: agent,
        amount: DamageAmount::Lethal,
    });
}

fn agent(app: &App, entity: Entity) -> &Agent {
    app.world().get::<Agent>(entity).expect("Agent component")
}

fn position(app: &App, entity: Entity) -> Vec3 {
    app.world().get::<Transform>(entity).expect("Transform").translation
}

/// Test: смерть → респавн на текущем чекпоинте → game over на последней жизни
#[test]
fn test_solo_death_respawn_and_game_over() {
    let mut app = create_level_app(LevelConfig::default(), GameSession::with_lives(3, 2));
    let checkpoints = spawn_checkpoints(&mut app, &[40.0, 0.0, 20.0]);
    let mut level_events = cursor::<LevelEvent>(&app);

    app.update();

    let player = players(&app)[0];
    assert_eq!(app.world().resource::<SpawnCoordinator>().phase(), LevelPhase::Playing);
    assert_eq!(
        kinds(&drain(&app, &mut level_events)),
        vec![LevelEventKind::SpawnCharacterStarts, LevelEventKind::LevelStart]
    );
    assert_eq!(position(&app, player).x, 0.0, "спавн на первом чекпоинте по оси X");

    // Вперёд на x=20, назад на x=0 не откатывается
    app.world_mut().send_event(CheckpointReached {
        checkpoint: checkpoints[2],
        agent: player,
    });
    app.update();
    app.world_mut().send_event(CheckpointReached {
        checkpoint: checkpoints[1],
        agent: player,
    });
    app.update();
    let current = app
        .world()
        .resource::<SpawnCoordinator>()
        .checkpoints()
        .current()
        .map(|checkpoint| checkpoint.id);
    assert_eq!(current, Some(checkpoints[2]));

    app.world_mut().resource_mut::<GameSession>().set_points(50);
    kill(&mut app, player);
    app.update();

    assert!(kinds(&drain(&app, &mut level_events)).contains(&LevelEventKind::PlayerDeath));
    assert_eq!(app.world().resource::<GameSession>().current_lives, 1);
    assert_eq!(app.world().resource::<SpawnCoordinator>().phase(), LevelPhase::Respawning);
    assert!(!agent(&app, player).is_alive());

    // 1.6s после смерти - ещё ждём (задержка 2s)
    let waiting = run_collecting(&mut app, 15, &mut level_events);
    assert!(!kinds(&waiting).contains(&LevelEventKind::Respawn));

    let respawned = run_collecting(&mut app, 10, &mut level_events);
    assert!(kinds(&respawned).contains(&LevelEventKind::Respawn));
    assert_eq!(app.world().resource::<GameSession>().points(), 0, "очки сброшены на рестарте");
    assert!(agent(&app, player).is_alive());
    assert_eq!(agent(&app, player).condition.current(), ConditionState::Normal);
    assert_eq!(position(&app, player).x, 20.0);
    let health = app.world().get::<Health>(player).expect("Health");
    assert_eq!(health.current, health.max);

    kill(&mut app, player);
    app.update();

    assert!(kinds(&drain(&app, &mut level_events)).contains(&LevelEventKind::GameOver));
    let session = app.world().resource::<GameSession>();
    assert_eq!((session.maximum_lives, session.current_lives), (3, 2), "жизни сброшены после game over");
    assert_eq!(app.world().resource::<SpawnCoordinator>().phase(), LevelPhase::LevelEnd);

    let after_game_over = run_collecting(&mut app, 30, &mut level_events);
    assert!(
        !kinds(&after_game_over).contains(&LevelEventKind::Respawn),
        "после game over респавна нет"
    );
}

/// Test: Pause/UnPause идемпотентны, TogglePause переключает
#[test]
fn test_pause_freezes_time_and_agents() {
    let mut app = create_level_app(LevelConfig::default(), GameSession::default());
    spawn_checkpoints(&mut app, &[0.0]);
    app.update();
    let player = players(&app)[0];

    app.world_mut().send_event(LevelEvent::new(LevelEventKind::Pause));
    app.update();

    assert!(app.world().resource::<Time<Virtual>>().is_paused());
    assert!(app.world().resource::<GameSession>().is_paused());
    assert_eq!(agent(&app, player).condition.current(), ConditionState::Paused);

    app.world_mut().send_event(LevelEvent::new(LevelEventKind::Pause));
    app.update();
    assert!(app.world().resource::<GameSession>().is_paused());

    app.world_mut().send_event(LevelEvent::new(LevelEventKind::TogglePause));
    app.update();

    assert!(!app.world().resource::<Time<Virtual>>().is_paused());
    assert!(!app.world().resource::<GameSession>().is_paused());
    assert_eq!(agent(&app, player).condition.current(), ConditionState::Normal);
}

/// Test: объект за чекпоинтом сбрасывается при респавне на нём
#[test]
fn test_respawnables_reset_on_checkpoint_respawn() {
    let mut app = create_level_app(LevelConfig::default(), GameSession::default());
    let checkpoints = spawn_checkpoints(&mut app, &[0.0, 20.0]);
    let crate_entity = app
        .world_mut()
        .spawn((Respawnable::default(), Transform::from_xyz(25.0, 0.0, 0.0)))
        .id();
    let mut resets = cursor::<RespawnableReset>(&app);

    app.update();
    let player = players(&app)[0];
    assert!(drain(&app, &mut resets).is_empty(), "на старте уровня ничего не сбрасывается");

    app.world_mut().send_event(CheckpointReached {
        checkpoint: checkpoints[1],
        agent: player,
    });
    kill(&mut app, player);

    assert_eq!(
        run_collecting(&mut app, 25, &mut resets),
        vec![RespawnableReset {
            object: crate_entity,
            checkpoint: checkpoints[1],
        }]
    );
}

/// Test: мультиплеер без респавна - последний выживший побеждает
#[test]
fn test_multiplayer_last_agent_standing() {
    let config = LevelConfig {
        multiplayer: Some(MultiplayerRules::default()),
        ..Default::default()
    };
    let mut app = create_level_app(config, GameSession::default());
    app.insert_resource(AgentPrefabs(vec![
        AgentBlueprint::new("red", AgentKind::Player),
        AgentBlueprint::new("blue", AgentKind::Player),
    ]));
    spawn_checkpoints(&mut app, &[0.0, 10.0]);
    let mut winners = cursor::<MultiplayerWinner>(&app);
    let mut loads = cursor::<LevelLoadRequested>(&app);

    app.update();

    let agents = players(&app);
    assert_eq!(agents.len(), 2);
    assert_eq!(agent(&app, agents[0]).player_id, "Player1");
    assert_eq!(agent(&app, agents[1]).player_id, "Player2");
    assert_eq!(position(&app, agents[1]).x, 10.0);

    kill(&mut app, agents[1]);
    app.update();
    assert!(app.world().get_entity(agents[1]).is_err(), "выбывший агент удалён");

    // freeze 1s → announce 1s → reload 2s
    let mut announced = Vec::new();
    let mut requested = Vec::new();
    for _ in 0..45 {
        app.update();
        announced.extend(drain(&app, &mut winners));
        requested.extend(drain(&app, &mut loads));
    }

    let winners = announced;
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].agent, agents[0]);
    assert_eq!(winners[0].player_id, "Player1");
    assert_eq!(agent(&app, agents[0]).condition.current(), ConditionState::Frozen);
    assert_eq!(
        requested,
        vec![LevelLoadRequested {
            level: "level".to_string()
        }]
    );
}

/// Test: переход на уровень с point of entry и повторный старт в нём
#[test]
fn test_level_change_resumes_at_point_of_entry() {
    let config = LevelConfig {
        level_name: "forest".to_string(),
        ..Default::default()
    };
    let mut app = create_level_app(config, GameSession::default());
    let checkpoints = spawn_checkpoints(&mut app, &[0.0]);
    let mut level_events = cursor::<LevelEvent>(&app);
    let mut loads = cursor::<LevelLoadRequested>(&app);

    app.update();
    let player = players(&app)[0];

    app.world_mut().send_event(LevelChangeRequest {
        destination: Some("cave".to_string()),
        entry: Some((1, Facing::Left)),
    });
    app.update();

    assert!(kinds(&drain(&app, &mut level_events)).contains(&LevelEventKind::LevelEnd));
    assert!(!agent(&app, player).enabled, "агенты выключены на время outro");

    // outro fade 1s (scaled time)
    let mut events = Vec::new();
    let mut requested = Vec::new();
    for _ in 0..12 {
        app.update();
        events.extend(kinds(&drain(&app, &mut level_events)));
        requested.extend(drain(&app, &mut loads));
    }
    assert!(events.contains(&LevelEventKind::LoadNextScene));
    assert_eq!(
        requested,
        vec![LevelLoadRequested {
            level: "cave".to_string()
        }]
    );

    // Хост "загрузил" сцену: старый чекпоинт убран, уровень cave
    app.world_mut().despawn(checkpoints[0]);
    let cave = LevelConfig {
        level_name: "cave".to_string(),
        points_of_entry: vec![
            PointOfEntry {
                name: "left door".to_string(),
                position: Vec3::new(-3.0, 0.0, 0.0),
            },
            PointOfEntry {
                name: "right door".to_string(),
                position: Vec3::new(7.0, 0.0, 0.0),
            },
        ],
        ..Default::default()
    };
    spawn_checkpoints(&mut app, &[50.0]);
    app.world_mut().resource_mut::<SpawnCoordinator>().load_level(cave);
    app.update();

    assert_eq!(players(&app), vec![player], "сценовый агент переиспользуется");
    assert!(agent(&app, player).enabled);
    assert_eq!(position(&app, player).x, 7.0);
    assert_eq!(agent(&app, player).facing(), Facing::Left);
}

/// Test: stored blueprint приоритетнее префабов
#[test]
fn test_stored_agent_wins_over_prefabs() {
    let mut session = GameSession::default();
    session.store_agent(AgentBlueprint::new("chosen", AgentKind::Player).with_health(Some(7)));
    let mut app = create_level_app(LevelConfig::default(), session);
    spawn_checkpoints(&mut app, &[0.0]);

    app.update();

    let agents = players(&app);
    assert_eq!(agents.len(), 1);
    assert_eq!(app.world().get::<Health>(agents[0]).map(|health| health.max), Some(7));

    let mut query = app.world_mut().query::<&Agent>();
    assert_eq!(query.iter(app.world()).count(), 1, "префабы не спавнились");
}
