//! Временная смена condition с отложенным возвратом
//!
//! Single-slot: новый override отменяет текущий (его pending reversion теряется),
//! но точка возврата берётся из отменённого - возвращаемся к состоянию до первого.

use serde::{Deserialize, Serialize};

use crate::components::ConditionState;

/// Чем меряем длительность
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverrideClock {
    /// Virtual time (останавливается на паузе)
    #[default]
    Scaled,
    /// Real time (идёт и на паузе)
    Real,
}

/// Запрос на временную смену condition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporaryCondition {
    pub condition: ConditionState,
    pub duration: f32,
    pub reset_forces: bool,
    pub disable_gravity: bool,
    pub clock: OverrideClock,
}

impl TemporaryCondition {
    pub fn new(condition: ConditionState, duration: f32) -> Self {
        Self {
            condition,
            duration,
            reset_forces: false,
            disable_gravity: false,
            clock: OverrideClock::Scaled,
        }
    }

    pub fn resetting_forces(mut self) -> Self {
        self.reset_forces = true;
        self
    }

    pub fn disabling_gravity(mut self) -> Self {
        self.disable_gravity = true;
        self
    }

    pub fn in_real_time(mut self) -> Self {
        self.clock = OverrideClock::Real;
        self
    }
}

/// In-flight override (максимум один на агента)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedConditionOverride {
    pub target: ConditionState,
    /// Куда вернуться по истечении
    pub restore_to: ConditionState,
    pub duration: f32,
    pub clock: OverrideClock,
    /// Вернуть gravity при возврате
    pub restore_gravity: bool,
    elapsed: f32,
}

impl TimedConditionOverride {
    pub fn new(request: &TemporaryCondition, restore_to: ConditionState, restore_gravity: bool) -> Self {
        Self {
            target: request.condition,
            restore_to,
            duration: request.duration.max(0.0),
            clock: request.clock,
            restore_gravity,
            elapsed: 0.0,
        }
    }

    /// Продвигает часы, true = дедлайн достигнут
    pub fn advance(&mut self, scaled_delta: f32, real_delta: f32) -> bool {
        self.elapsed += match self.clock {
            OverrideClock::Scaled => scaled_delta,
            OverrideClock::Real => real_delta,
        };
        self.is_expired()
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn remaining(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0)
    }
}
