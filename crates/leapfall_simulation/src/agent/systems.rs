//! Agent ECS systems: per-frame update, урон

use bevy::prelude::*;
use rand::Rng;

use crate::components::{AgentInput, AnimatorBinding, AnimatorParameters, Controller2D, Health};
use crate::DeterministicRng;

use super::character::{Agent, AgentFrame};
use super::events::{AgentDied, AgentStateChange, AgentStateChanged, DamageAmount, DamageRequest};

/// Per-frame update всех агентов
///
/// Заморозка времени = Time<Virtual> на паузе или relative speed 0.
/// Real-time override'ы продолжают тикать по Time<Real>.
pub fn update_agents(
    virtual_time: Res<Time<Virtual>>,
    real_time: Res<Time<Real>>,
    mut rng: ResMut<DeterministicRng>,
    mut agents: Query<(
        Entity,
        &mut Agent,
        &mut Controller2D,
        Option<&AgentInput>,
        Option<&mut AnimatorParameters>,
    )>,
    mut state_events: EventWriter<AgentStateChanged>,
) {
    let time_frozen = virtual_time.is_paused() || virtual_time.relative_speed() == 0.0;

    for (entity, mut agent, mut controller, input, animator) in agents.iter_mut() {
        let frame = AgentFrame {
            delta: virtual_time.delta_secs(),
            real_delta: real_time.delta_secs(),
            time_frozen,
            random: rng.rng.gen::<f32>(),
        };
        let input = input.copied().unwrap_or_default();
        let animator = animator.map(|animator| animator.into_inner() as &mut dyn AnimatorBinding);

        agent.update(&mut *controller, animator, &input, &frame);

        for notification in agent.movement.drain_notifications() {
            state_events.write(AgentStateChanged {
                agent: entity,
                change: AgentStateChange::Movement(notification),
            });
        }
        for notification in agent.condition.drain_notifications() {
            state_events.write(AgentStateChanged {
                agent: entity,
                change: AgentStateChange::Condition(notification),
            });
        }
    }
}

/// Применяет DamageRequest; смерть → Agent::kill + AgentDied
pub fn apply_damage(
    mut requests: EventReader<DamageRequest>,
    mut agents: Query<(&mut Agent, Option<&mut Health>)>,
    mut deaths: EventWriter<AgentDied>,
) {
    for request in requests.read() {
        let Ok((mut agent, health)) = agents.get_mut(request.target) else {
            continue;
        };
        if !agent.is_alive() {
            continue;
        }

        let died = match (request.amount, health) {
            // Health уже на нуле: смерть не повторяется
            (DamageAmount::Lethal, Some(mut health)) => health.kill(),
            (DamageAmount::Lethal, None) => true,
            (DamageAmount::Points(amount), Some(mut health)) => health.take_damage(amount),
            // Без Health урон очками выключен
            (DamageAmount::Points(_), None) => false,
        };

        if died {
            agent.kill();
            crate::log(&format!("💀 {:?} ({}) died", request.target, agent.player_id));
            deaths.write(AgentDied {
                agent: request.target,
                kind: agent.kind,
            });
        }
    }
}
