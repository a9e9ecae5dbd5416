//! Горизонтальное движение: walk / idle / falling + auto-face

use crate::components::animator::{params, update_bool};
use crate::components::{AnimatorBinding, ConditionState, Facing, MovementState};

use super::{AbilityContext, AbilityError, AbilityModule};

#[derive(Debug, Clone)]
pub struct HorizontalMovement {
    /// Скорость ходьбы (units/s)
    pub walk_speed: f32,
    /// Dead zone для оси input
    pub input_threshold: f32,
    /// Разворачивать агента по направлению input
    pub flip_on_direction_change: bool,
    horizontal_input: f32,
    walking: bool,
}

impl Default for HorizontalMovement {
    fn default() -> Self {
        Self {
            walk_speed: 6.0,
            input_threshold: 0.1,
            flip_on_direction_change: true,
            horizontal_input: 0.0,
            walking: false,
        }
    }
}

impl HorizontalMovement {
    pub fn horizontal_input(&self) -> f32 {
        self.horizontal_input
    }
}

impl AbilityModule for HorizontalMovement {
    fn name(&self) -> &'static str {
        "horizontal_movement"
    }

    fn early_process(&mut self, ctx: &mut AbilityContext<'_>) -> Result<(), AbilityError> {
        self.horizontal_input = ctx.input.horizontal.clamp(-1.0, 1.0);
        Ok(())
    }

    fn process(&mut self, ctx: &mut AbilityContext<'_>) -> Result<(), AbilityError> {
        if ctx.condition.current() != ConditionState::Normal {
            self.walking = false;
            return Ok(());
        }

        let moving = self.horizontal_input.abs() > self.input_threshold;

        if moving && self.flip_on_direction_change {
            let wanted = if self.horizontal_input > 0.0 {
                Facing::Right
            } else {
                Facing::Left
            };
            if wanted != ctx.facing {
                ctx.request_face(wanted);
            }
        }

        let force = if moving {
            self.horizontal_input * self.walk_speed
        } else {
            0.0
        };
        ctx.controller.set_horizontal_force(force);

        let grounded = ctx.controller.collisions().grounded;
        match ctx.movement.current() {
            MovementState::Idle if grounded && moving => {
                ctx.movement.change_state(MovementState::Walking);
            }
            MovementState::Walking if grounded && !moving => {
                ctx.movement.change_state(MovementState::Idle);
            }
            MovementState::Falling if grounded => {
                let landed = if moving {
                    MovementState::Walking
                } else {
                    MovementState::Idle
                };
                ctx.movement.change_state(landed);
            }
            MovementState::Idle | MovementState::Walking
                if !grounded && ctx.controller.speed().y < 0.0 =>
            {
                ctx.movement.change_state(MovementState::Falling);
            }
            _ => {}
        }

        self.walking = ctx.movement.current() == MovementState::Walking;
        Ok(())
    }

    fn reset_ability(&mut self) {
        self.horizontal_input = 0.0;
        self.walking = false;
    }

    fn update_animator(&self, animator: &mut dyn AnimatorBinding) {
        update_bool(animator, params::WALKING, self.walking);
    }
}
