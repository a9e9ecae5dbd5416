//! Agent events

use bevy::prelude::*;

use crate::components::{AgentKind, ConditionState, MovementState};
use crate::state_machine::StateNotification;

// ============================================================================
// State notifications
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AgentStateChange {
    Movement(StateNotification<MovementState>),
    Condition(StateNotification<ConditionState>),
}

/// Переходы (и per-frame "state is") state machines агента
#[derive(Event, Debug, Clone, Copy)]
pub struct AgentStateChanged {
    pub agent: Entity,
    pub change: AgentStateChange,
}

// ============================================================================
// Damage
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageAmount {
    Points(u32),
    /// Kill zone / падение в пропасть: смерть независимо от Health
    Lethal,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct DamageRequest {
    pub target: Entity,
    pub amount: DamageAmount,
}

/// Агент умер (Health → 0 или lethal)
#[derive(Event, Debug, Clone, Copy)]
pub struct AgentDied {
    pub agent: Entity,
    pub kind: AgentKind,
}
