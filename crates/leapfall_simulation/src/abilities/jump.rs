//! Прыжок: multi-jump + минимальный интервал между прыжками

use crate::components::animator::{params, update_bool};
use crate::components::{AnimatorBinding, ConditionState, MovementState};

use super::{AbilityContext, AbilityError, AbilityModule};

#[derive(Debug, Clone)]
pub struct Jump {
    /// Начальная вертикальная скорость (units/s)
    pub jump_speed: f32,
    /// 1 = обычный прыжок, 2 = double jump
    pub number_of_jumps: u32,
    /// Минимум секунд между двумя прыжками
    pub minimum_interval: f32,
    jumps_left: u32,
    cooldown: f32,
    requested: bool,
    jumping: bool,
}

impl Default for Jump {
    fn default() -> Self {
        Self {
            jump_speed: 12.0,
            number_of_jumps: 2,
            minimum_interval: 0.15,
            jumps_left: 2,
            cooldown: 0.0,
            requested: false,
            jumping: false,
        }
    }
}

impl Jump {
    pub fn jumps_left(&self) -> u32 {
        self.jumps_left
    }
}

impl AbilityModule for Jump {
    fn name(&self) -> &'static str {
        "jump"
    }

    fn initialize(&mut self) -> Result<(), AbilityError> {
        if self.number_of_jumps == 0 {
            return Err(AbilityError::InvalidState {
                ability: "jump",
                reason: "number_of_jumps must be at least 1".into(),
            });
        }
        self.jumps_left = self.number_of_jumps;
        Ok(())
    }

    fn early_process(&mut self, ctx: &mut AbilityContext<'_>) -> Result<(), AbilityError> {
        if ctx.input.jump_pressed {
            self.requested = true;
        }
        Ok(())
    }

    fn process(&mut self, ctx: &mut AbilityContext<'_>) -> Result<(), AbilityError> {
        self.cooldown = (self.cooldown - ctx.delta).max(0.0);

        let grounded = ctx.controller.collisions().grounded;
        let airborne_jump = matches!(
            ctx.movement.current(),
            MovementState::Jumping | MovementState::DoubleJumping
        );

        if grounded && ctx.controller.speed().y <= 0.0 {
            self.jumps_left = self.number_of_jumps;
            if airborne_jump {
                ctx.movement.change_state(MovementState::Idle);
            }
        }

        let requested = std::mem::take(&mut self.requested);
        if !requested
            || ctx.condition.current() != ConditionState::Normal
            || self.jumps_left == 0
            || self.cooldown > 0.0
        {
            return Ok(());
        }

        let first_jump = self.jumps_left == self.number_of_jumps;
        ctx.controller.set_vertical_force(self.jump_speed);
        ctx.movement.change_state(if first_jump {
            MovementState::Jumping
        } else {
            MovementState::DoubleJumping
        });
        self.jumps_left -= 1;
        self.cooldown = self.minimum_interval;
        Ok(())
    }

    fn late_process(&mut self, ctx: &mut AbilityContext<'_>) -> Result<(), AbilityError> {
        let state = ctx.movement.current();
        let rising = matches!(state, MovementState::Jumping | MovementState::DoubleJumping);

        if rising && !ctx.controller.collisions().grounded && ctx.controller.speed().y < 0.0 {
            ctx.movement.change_state(MovementState::Falling);
        }

        self.jumping = matches!(
            ctx.movement.current(),
            MovementState::Jumping | MovementState::DoubleJumping
        );
        Ok(())
    }

    fn reset_ability(&mut self) {
        self.jumps_left = self.number_of_jumps;
        self.cooldown = 0.0;
        self.requested = false;
        self.jumping = false;
    }

    fn update_animator(&self, animator: &mut dyn AnimatorBinding) {
        update_bool(animator, params::JUMPING, self.jumping);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::{AbilityPhase, AbilitySet};
    use crate::components::{AgentInput, Controller2D, Facing, PlatformerController};
    use crate::state_machine::StateMachine;

    fn run_frame(
        set: &mut AbilitySet,
        movement: &mut StateMachine<MovementState>,
        controller: &mut Controller2D,
        jump_pressed: bool,
        delta: f32,
    ) {
        let mut condition = StateMachine::new(ConditionState::Normal, false);
        let input = AgentInput {
            jump_pressed,
            ..Default::default()
        };
        let mut ctx = AbilityContext::new(movement, &mut condition, controller, &input, Facing::Right, delta);
        for phase in [AbilityPhase::Early, AbilityPhase::Main, AbilityPhase::Late] {
            set.run_phase(phase, &mut ctx);
        }
    }

    #[test]
    fn test_double_jump_respects_count_and_interval() {
        let mut set = AbilitySet::new().with(Jump::default());
        set.cache_abilities();
        let mut movement = StateMachine::new(MovementState::Idle, false);
        let mut controller = Controller2D::default();
        controller.state.grounded = true;

        run_frame(&mut set, &mut movement, &mut controller, true, 0.016);
        assert_eq!(movement.current(), MovementState::Jumping);
        assert_eq!(controller.speed().y, 12.0);

        // В воздухе, слишком рано для второго прыжка
        controller.state.grounded = false;
        run_frame(&mut set, &mut movement, &mut controller, true, 0.016);
        assert_eq!(set.find::<Jump>().map(Jump::jumps_left), Some(1));

        run_frame(&mut set, &mut movement, &mut controller, true, 0.2);
        assert_eq!(movement.current(), MovementState::DoubleJumping);
        assert_eq!(set.find::<Jump>().map(Jump::jumps_left), Some(0));

        // Прыжков больше нет
        controller.set_vertical_force(1.0);
        run_frame(&mut set, &mut movement, &mut controller, true, 0.5);
        assert_eq!(controller.speed().y, 1.0);
    }

    #[test]
    fn test_jumping_turns_into_falling() {
        let mut set = AbilitySet::new().with(Jump::default());
        set.cache_abilities();
        let mut movement = StateMachine::new(MovementState::Jumping, false);
        let mut controller = Controller2D::default();
        controller.set_vertical_force(-0.5);

        run_frame(&mut set, &mut movement, &mut controller, false, 0.016);
        assert_eq!(movement.current(), MovementState::Falling);
    }

    #[test]
    fn test_zero_jumps_fails_initialization() {
        let mut set = AbilitySet::new().with(Jump {
            number_of_jumps: 0,
            ..Default::default()
        });

        assert_eq!(set.cache_abilities(), 0);
        assert_eq!(set.is_initialized("jump"), Some(false));
    }
}
