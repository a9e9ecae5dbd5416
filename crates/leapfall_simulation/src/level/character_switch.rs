//! Character switch - слот игрока переключается между заранее заспавненными агентами
//!
//! Кандидаты живут в мире выключенными (`Agent::enabled = false`, без `Player`).
//! Новый агент наследует позицию и оба state machine, опционально health и facing.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::components::{ConditionState, Controller2D, Facing, Health, MovementState, PlatformerController, Player};
use crate::DeterministicRng;

use super::coordinator::SpawnCoordinator;
use super::events::{CameraEvent, LevelEvent, LevelEventKind, SwitchCharacterRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NextCharacterChoice {
    #[default]
    Sequential,
    Random,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct CharacterRoster {
    /// Индекс слота в `SpawnCoordinator::players`
    pub player_slot: usize,
    pub candidates: Vec<Entity>,
    pub choice: NextCharacterChoice,
    pub common_health: bool,
    pub keep_facing: bool,
    current: usize,
}

impl CharacterRoster {
    pub fn new(candidates: Vec<Entity>, choice: NextCharacterChoice) -> Self {
        Self {
            candidates,
            choice,
            ..Default::default()
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Следующий кандидат (Random может выпасть текущий - тогда switch пропускается)
    pub fn next_index(&self, rng: &mut impl Rng) -> Option<usize> {
        if self.candidates.len() < 2 {
            return None;
        }
        Some(match self.choice {
            NextCharacterChoice::Sequential => (self.current + 1) % self.candidates.len(),
            NextCharacterChoice::Random => rng.gen_range(0..self.candidates.len()),
        })
    }
}

/// Что переносится со старого агента на нового
#[derive(Debug, Clone, Copy)]
struct Handover {
    position: Vec3,
    movement: MovementState,
    condition: ConditionState,
    facing: Facing,
    health: Option<u32>,
}

#[allow(clippy::too_many_arguments)]
pub fn switch_character(
    mut commands: Commands,
    mut requests: EventReader<SwitchCharacterRequest>,
    mut roster: ResMut<CharacterRoster>,
    mut coordinator: ResMut<SpawnCoordinator>,
    mut rng: ResMut<DeterministicRng>,
    mut agents: Query<(&mut Agent, &mut Controller2D, &mut Transform, Option<&mut Health>)>,
    mut level_events: EventWriter<LevelEvent>,
    mut camera_events: EventWriter<CameraEvent>,
) {
    for request in requests.read() {
        let next = match request.target {
            Some(target) if target < roster.candidates.len() => Some(target),
            _ => roster.next_index(&mut rng.rng),
        };
        let Some(next) = next else {
            continue;
        };
        let Some(&current_entity) = coordinator.players().get(roster.player_slot) else {
            continue;
        };
        let next_entity = roster.candidates[next];
        if next_entity == current_entity {
            continue;
        }

        let Ok((old_agent, _, old_transform, old_health)) = agents.get(current_entity) else {
            continue;
        };
        let handover = Handover {
            position: old_transform.translation,
            movement: old_agent.movement.current(),
            condition: old_agent.condition.current(),
            facing: old_agent.facing(),
            health: old_health.map(|health| health.current),
        };

        let Ok((mut agent, mut controller, mut transform, health)) = agents.get_mut(next_entity) else {
            crate::log_warning(&format!("⚠️ Switch candidate {:?} is not an agent", next_entity));
            continue;
        };
        agent.enabled = true;
        transform.translation = handover.position;
        agent.movement.change_state(handover.movement);
        agent.condition.change_state(handover.condition);
        if roster.keep_facing {
            agent.face(handover.facing);
        }
        if roster.common_health {
            if let (Some(mut health), Some(current)) = (health, handover.health) {
                health.current = current.min(health.max);
            }
        }
        controller.collisions_on();

        if let Ok((mut old_agent, mut old_controller, ..)) = agents.get_mut(current_entity) {
            old_agent.disable(&mut *old_controller);
        }
        commands.entity(current_entity).remove::<Player>();
        commands.entity(next_entity).insert(Player);

        coordinator.replace_player(current_entity, next_entity);
        roster.current = next;

        level_events.write(LevelEvent::from_agent(LevelEventKind::CharacterSwitch, next_entity));
        camera_events.write(CameraEvent::SetTarget(next_entity));
        crate::log(&format!("🔀 Switched {:?} → {:?}", current_entity, next_entity));
    }
}
