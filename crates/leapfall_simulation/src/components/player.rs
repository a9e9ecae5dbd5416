//! Player marker component

use bevy::prelude::Component;

/// Marker: агент уже стоит в сцене и участвует в уровне как игрок
///
/// Scene-агенты для SpawnCoordinator = `With<Agent>, With<Player>`.
/// Префабы и stored-агенты получают маркер при спавне.
/// Неактивные кандидаты character switch маркер не носят.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;
