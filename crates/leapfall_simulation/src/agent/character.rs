//! Agent - управляемый персонаж (игрок или AI)
//!
//! Владеет двумя state machines (movement, condition), упорядоченным набором
//! abilities, facing/flip логикой и camera target.
//!
//! Per-frame update (порядок фиксирован):
//! 0. begin_frame обеих state machines
//! 1. Timed condition override (дедлайн)
//! 2. HandleStatus (Dead / Frozen)
//! 3. Early фаза abilities
//! 4. Если время не заморожено: Main, Late, camera target
//! 5. Animator push + rotate model

use bevy::prelude::*;

use crate::abilities::{AbilityContext, AbilityModule, AbilityPhase, AbilitySet, PauseAbility};
use crate::components::animator::{params, update_bool, update_float, update_int, update_trigger};
use crate::components::{
    AgentInput, AgentKind, AnimatorBinding, ConditionState, Facing, Health, MovementState,
    Persistence, PlatformerController,
};
use crate::state_machine::StateMachine;

use super::camera::CameraTarget;
use super::condition_override::{TemporaryCondition, TimedConditionOverride};
use super::config::{AgentConfig, FlipMode, VisualKind};

/// Время кадра глазами агента
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentFrame {
    /// Scaled (virtual) delta
    pub delta: f32,
    pub real_delta: f32,
    /// Глобальная заморозка времени (пауза / time scale 0)
    pub time_frozen: bool,
    /// Значение для animator канала Random
    pub random: f32,
}

impl AgentFrame {
    pub fn scaled(delta: f32) -> Self {
        Self {
            delta,
            real_delta: delta,
            time_frozen: false,
            random: 0.0,
        }
    }

    pub fn frozen(real_delta: f32) -> Self {
        Self {
            delta: 0.0,
            real_delta,
            time_frozen: true,
            random: 0.0,
        }
    }
}

/// Визуальная поза модели (scale / sprite flip / rotation)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPose {
    pub scale: Vec3,
    pub sprite_flip_x: bool,
    pub rotation: Vec3,
    pub target_rotation: Vec3,
}

impl Default for ModelPose {
    fn default() -> Self {
        Self {
            scale: Vec3::ONE,
            sprite_flip_x: false,
            rotation: Vec3::ZERO,
            target_rotation: Vec3::ZERO,
        }
    }
}

/// Euler углы в [0, 360) по каждой оси
pub fn wrap_degrees(angles: Vec3) -> Vec3 {
    Vec3::new(
        angles.x.rem_euclid(360.0),
        angles.y.rem_euclid(360.0),
        angles.z.rem_euclid(360.0),
    )
}

#[derive(Component, Debug)]
pub struct Agent {
    pub id: u32,
    pub player_id: String,
    pub kind: AgentKind,
    pub config: AgentConfig,
    pub movement: StateMachine<MovementState>,
    pub condition: StateMachine<ConditionState>,
    pub abilities: AbilitySet,
    pub camera_target: CameraTarget,
    pub model: ModelPose,
    /// Разрешён ли сейчас flip (например, запрещён во время dash)
    pub can_flip: bool,
    /// Выключенный агент пропускает update целиком
    pub enabled: bool,
    pub random_constant: i32,
    facing: Facing,
    /// Валиден только пока condition == Frozen
    condition_before_freeze: ConditionState,
    pending_override: Option<TimedConditionOverride>,
    death_impulse_applied: bool,
    spawn_direction_forced: bool,
    flip_trigger_pending: bool,
    random_constant_pushed: bool,
}

impl Agent {
    pub fn new(id: u32, kind: AgentKind, config: AgentConfig, abilities: AbilitySet) -> Self {
        let movement = StateMachine::new(MovementState::Idle, config.send_state_change_events)
            .with_update_events(config.send_state_update_events);
        let condition = StateMachine::new(ConditionState::Normal, config.send_state_change_events)
            .with_update_events(config.send_state_update_events);

        let mut agent = Self {
            id,
            player_id: format!("Player{}", id + 1),
            kind,
            facing: config.initial_facing,
            camera_target: CameraTarget::new(Vec3::ZERO, config.camera_target_speed),
            config,
            movement,
            condition,
            abilities,
            model: ModelPose::default(),
            can_flip: true,
            enabled: true,
            random_constant: 0,
            condition_before_freeze: ConditionState::Normal,
            pending_override: None,
            death_impulse_applied: false,
            spawn_direction_forced: false,
            flip_trigger_pending: false,
            random_constant_pushed: false,
        };

        agent.abilities.cache_abilities();
        agent.force_spawn_direction();
        agent
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn is_facing_right(&self) -> bool {
        self.facing.is_right()
    }

    pub fn is_alive(&self) -> bool {
        self.condition.current() != ConditionState::Dead
    }

    pub fn condition_before_freeze(&self) -> ConditionState {
        self.condition_before_freeze
    }

    pub fn pending_override(&self) -> Option<&TimedConditionOverride> {
        self.pending_override.as_ref()
    }

    pub fn death_impulse_applied(&self) -> bool {
        self.death_impulse_applied
    }

    pub fn set_player_id(&mut self, player_id: impl Into<String>, id: u32) {
        self.player_id = player_id.into();
        self.id = id;
    }

    pub fn set_camera_target_offset(&mut self, offset: Vec3) {
        self.camera_target.offset = offset;
    }

    // ========================================================================
    // Abilities
    // ========================================================================

    pub fn find_ability<T: AbilityModule>(&self) -> Option<&T> {
        self.abilities.find::<T>()
    }

    pub fn find_ability_mut<T: AbilityModule>(&mut self) -> Option<&mut T> {
        self.abilities.find_mut::<T>()
    }

    pub fn find_abilities<T: AbilityModule>(&self) -> Vec<&T> {
        self.abilities.find_all::<T>()
    }

    pub fn set_ability_enabled(&mut self, name: &str, enabled: bool) -> bool {
        self.abilities.set_enabled(name, enabled)
    }

    /// Подхватывает модули, зарегистрированные после конструирования
    pub fn rescan_abilities(&mut self) -> usize {
        self.abilities.cache_abilities()
    }

    // ========================================================================
    // Per-frame update
    // ========================================================================

    pub fn update(
        &mut self,
        controller: &mut dyn PlatformerController,
        animator: Option<&mut dyn AnimatorBinding>,
        input: &AgentInput,
        frame: &AgentFrame,
    ) {
        if !self.enabled {
            return;
        }

        self.movement.begin_frame();
        self.condition.begin_frame();
        self.tick_condition_override(controller, frame);
        self.handle_status(controller);

        self.run_phase(AbilityPhase::Early, controller, input, frame.delta);

        if !frame.time_frozen {
            self.run_phase(AbilityPhase::Main, controller, input, frame.delta);
            self.run_phase(AbilityPhase::Late, controller, input, frame.delta);
            self.camera_target.update(frame.delta);
        }

        if let Some(animator) = animator {
            self.update_animators(animator, controller, frame.random);
        }
        self.flip_trigger_pending = false;

        self.rotate_model(frame.delta);

        self.movement.end_frame();
        self.condition.end_frame();
    }

    fn run_phase(
        &mut self,
        phase: AbilityPhase,
        controller: &mut dyn PlatformerController,
        input: &AgentInput,
        delta: f32,
    ) -> usize {
        let (failures, face_request) = {
            let mut ctx = AbilityContext::new(
                &mut self.movement,
                &mut self.condition,
                controller,
                input,
                self.facing,
                delta,
            );
            let failures = self.abilities.run_phase(phase, &mut ctx);
            (failures, ctx.take_face_request())
        };

        if let Some(wanted) = face_request {
            if wanted != self.facing {
                self.flip(false);
            }
        }

        failures
    }

    /// Dead: гасим горизонталь (+ gravity off / one-shot импульс по флагам).
    /// Frozen: gravity off и нулевая сила каждый кадр (удержание, не one-shot).
    fn handle_status(&mut self, controller: &mut dyn PlatformerController) {
        match self.condition.current() {
            ConditionState::Dead => {
                let death = self.config.death;
                let impulse_carries_x = death.apply_death_force && death.death_force.x != 0.0;
                if !impulse_carries_x {
                    controller.set_horizontal_force(0.0);
                }
                if death.gravity_off_on_death {
                    controller.set_gravity_active(false);
                }
                if death.apply_death_force && !self.death_impulse_applied {
                    controller.set_force(death.death_force);
                    self.death_impulse_applied = true;
                }
            }
            ConditionState::Frozen => {
                controller.set_gravity_active(false);
                controller.set_force(Vec2::ZERO);
            }
            _ => {}
        }
    }

    fn tick_condition_override(&mut self, controller: &mut dyn PlatformerController, frame: &AgentFrame) {
        let expired = match self.pending_override.as_mut() {
            Some(pending) => pending.advance(frame.delta, frame.real_delta),
            None => false,
        };
        if !expired {
            return;
        }

        if let Some(finished) = self.pending_override.take() {
            self.condition.change_state(finished.restore_to);
            if finished.restore_gravity {
                controller.set_gravity_active(true);
            }
        }
    }

    // ========================================================================
    // Condition control
    // ========================================================================

    pub fn kill(&mut self) {
        self.pending_override = None;
        self.death_impulse_applied = false;
        self.condition.change_state(ConditionState::Dead);
    }

    pub fn freeze(&mut self, controller: &mut dyn PlatformerController) {
        controller.set_gravity_active(false);
        controller.set_force(Vec2::ZERO);

        if self.condition.current() != ConditionState::Frozen {
            self.condition_before_freeze = self.condition.current();
        }
        self.condition.change_state(ConditionState::Frozen);
    }

    /// Без предшествующего freeze восстановит устаревший слот (как есть)
    pub fn unfreeze(&mut self, controller: &mut dyn PlatformerController) {
        controller.set_gravity_active(true);
        self.condition.change_state(self.condition_before_freeze);
    }

    /// Временная смена condition. Отменяет in-flight override.
    pub fn change_condition_temporarily(
        &mut self,
        controller: &mut dyn PlatformerController,
        request: TemporaryCondition,
    ) {
        let (restore_to, previously_disabled_gravity) = match self.pending_override.take() {
            Some(cancelled) => (cancelled.restore_to, cancelled.restore_gravity),
            None => (self.condition.current(), false),
        };

        self.condition.change_state(request.condition);
        if request.reset_forces {
            controller.set_force(Vec2::ZERO);
        }
        if request.disable_gravity {
            controller.set_gravity_active(false);
        }

        self.pending_override = Some(TimedConditionOverride::new(
            &request,
            restore_to,
            request.disable_gravity || previously_disabled_gravity,
        ));
    }

    pub fn pause_character(&mut self) -> bool {
        match self.abilities.find_active_mut::<PauseAbility>() {
            Some(pause) => pause.pause_character(&mut self.condition),
            None => false,
        }
    }

    pub fn unpause_character(&mut self) -> bool {
        match self.abilities.find_active_mut::<PauseAbility>() {
            Some(pause) => pause.unpause_character(&mut self.condition),
            None => false,
        }
    }

    // ========================================================================
    // Spawn / respawn
    // ========================================================================

    /// Возвращает агента в игру в точке спавна (позицию ставит вызывающий)
    pub fn respawn_at(
        &mut self,
        controller: &mut dyn PlatformerController,
        facing: Facing,
        health: Option<&mut Health>,
        persistence: Option<&Persistence>,
    ) {
        self.enabled = true;
        self.unfreeze(controller);
        self.face(facing);
        self.pending_override = None;
        self.condition.change_state(ConditionState::Normal);
        self.movement.change_state(MovementState::Idle);
        self.death_impulse_applied = false;
        controller.collisions_on();
        controller.set_force(Vec2::ZERO);

        let Some(health) = health else {
            self.abilities.reset_all();
            return;
        };

        if persistence.is_some_and(|persistence| persistence.initialized) {
            return;
        }

        health.reset_to_max();
        self.reset();
        self.force_spawn_direction();
    }

    /// Сбрасывает abilities и разрешает повторный forced spawn facing
    pub fn reset(&mut self) {
        self.spawn_direction_forced = false;
        self.abilities.reset_all();
    }

    pub fn force_spawn_direction(&mut self) {
        if self.spawn_direction_forced {
            return;
        }
        if let Some(facing) = self.config.spawn_facing.as_facing() {
            self.face(facing);
            self.spawn_direction_forced = true;
        }
    }

    /// Выключение на время смены уровня
    pub fn disable(&mut self, controller: &mut dyn PlatformerController) {
        self.enabled = false;
        controller.set_force(Vec2::ZERO);
    }

    // ========================================================================
    // Facing / flip
    // ========================================================================

    /// Повернуться в `facing` (форсированный flip, игнорирует FlipMode::Disabled)
    pub fn face(&mut self, facing: Facing) {
        if self.facing != facing {
            self.flip(true);
        }
    }

    /// Переключает facing. Возвращает false если flip подавлен.
    pub fn flip(&mut self, force: bool) -> bool {
        if self.config.flip_mode == FlipMode::Disabled && !force {
            return false;
        }
        if !self.can_flip {
            return false;
        }

        match (self.config.flip_mode, self.config.visual) {
            (FlipMode::Rotate, _) => {
                self.model.target_rotation =
                    wrap_degrees(self.model.target_rotation + self.config.model_rotation_value);
            }
            (_, VisualKind::Model) => {
                self.model.scale *= self.config.model_flip_value;
            }
            (_, VisualKind::Sprite) => {
                self.model.sprite_flip_x = !self.model.sprite_flip_x;
            }
        }

        self.flip_trigger_pending = true;
        self.facing = self.facing.opposite();
        self.abilities.flip_all();
        true
    }

    fn rotate_model(&mut self, delta: f32) {
        if self.config.flip_mode != FlipMode::Rotate {
            return;
        }

        let speed = self.config.model_rotation_speed;
        self.model.rotation = if speed > 0.0 {
            self.model
                .rotation
                .lerp(self.model.target_rotation, (speed * delta).clamp(0.0, 1.0))
        } else {
            self.model.target_rotation
        };
        self.model.rotation = wrap_degrees(self.model.rotation);
    }

    // ========================================================================
    // Animator
    // ========================================================================

    fn update_animators(
        &mut self,
        animator: &mut dyn AnimatorBinding,
        controller: &dyn PlatformerController,
        random: f32,
    ) {
        if !self.config.use_default_animator {
            return;
        }

        let collisions = controller.collisions();
        let speed = controller.speed();
        let world_speed = controller.world_speed();
        let airborne = match controller.distance_to_ground() {
            Some(distance) => distance > self.config.airborne_distance,
            None => true,
        };
        let movement = self.movement.current();

        update_bool(animator, params::GROUNDED, collisions.grounded);
        update_bool(animator, params::FALLING, movement == MovementState::Falling);
        update_bool(animator, params::AIRBORNE, airborne);
        update_bool(animator, params::ALIVE, self.is_alive());
        update_float(animator, params::X_SPEED, speed.x);
        update_float(animator, params::Y_SPEED, speed.y);
        update_float(animator, params::X_SPEED_ABSOLUTE, speed.x.abs());
        update_float(animator, params::Y_SPEED_ABSOLUTE, speed.y.abs());
        update_float(animator, params::WORLD_X_SPEED, world_speed.x);
        update_float(animator, params::WORLD_Y_SPEED, world_speed.y);
        update_bool(animator, params::COLLIDING_LEFT, collisions.colliding_left);
        update_bool(animator, params::COLLIDING_RIGHT, collisions.colliding_right);
        update_bool(animator, params::COLLIDING_ABOVE, collisions.colliding_above);
        update_bool(animator, params::COLLIDING_BELOW, collisions.colliding_below);
        update_bool(animator, params::IDLE, movement == MovementState::Idle);
        update_bool(animator, params::FACING_RIGHT, self.is_facing_right());
        update_float(animator, params::RANDOM, random);

        if !self.random_constant_pushed {
            update_int(animator, params::RANDOM_CONSTANT, self.random_constant);
            self.random_constant_pushed = true;
        }
        if self.flip_trigger_pending {
            update_trigger(animator, params::FLIP);
        }

        self.abilities.push_animators(animator);
    }
}
