//! Пауза персонажа (condition Paused, обратно - previous condition)

use crate::components::animator::{params, update_bool};
use crate::components::{AnimatorBinding, ConditionState};
use crate::state_machine::StateMachine;

use super::{AbilityContext, AbilityError, AbilityModule};

#[derive(Debug, Clone, Default)]
pub struct PauseAbility {
    paused: bool,
}

impl PauseAbility {
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Мёртвого не паузим: unpause не должен его "оживить"
    pub fn pause_character(&mut self, condition: &mut StateMachine<ConditionState>) -> bool {
        if self.paused || condition.current() == ConditionState::Dead {
            return false;
        }
        condition.change_state(ConditionState::Paused);
        self.paused = true;
        true
    }

    pub fn unpause_character(&mut self, condition: &mut StateMachine<ConditionState>) -> bool {
        if !self.paused {
            return false;
        }
        self.paused = false;
        if condition.current() == ConditionState::Paused {
            condition.restore_previous_state();
        }
        true
    }
}

impl AbilityModule for PauseAbility {
    fn name(&self) -> &'static str {
        "pause"
    }

    fn process(&mut self, ctx: &mut AbilityContext<'_>) -> Result<(), AbilityError> {
        if self.paused {
            ctx.controller.set_horizontal_force(0.0);
        }
        Ok(())
    }

    fn reset_ability(&mut self) {
        self.paused = false;
    }

    fn update_animator(&self, animator: &mut dyn AnimatorBinding) {
        update_bool(animator, params::PAUSED, self.paused);
    }
}
