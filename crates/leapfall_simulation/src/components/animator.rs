//! Animation binding (external collaborator)
//!
//! Агент и abilities пушат именованные значения раз в кадр.
//! Отсутствующий канал молча пропускается (не ошибка).

use bevy::prelude::*;
use std::collections::HashMap;

/// Стандартные имена каналов
pub mod params {
    pub const GROUNDED: &str = "Grounded";
    pub const FALLING: &str = "Falling";
    pub const AIRBORNE: &str = "Airborne";
    pub const ALIVE: &str = "Alive";
    pub const X_SPEED: &str = "xSpeed";
    pub const Y_SPEED: &str = "ySpeed";
    pub const X_SPEED_ABSOLUTE: &str = "xSpeedAbsolute";
    pub const Y_SPEED_ABSOLUTE: &str = "ySpeedAbsolute";
    pub const WORLD_X_SPEED: &str = "WorldXSpeed";
    pub const WORLD_Y_SPEED: &str = "WorldYSpeed";
    pub const COLLIDING_LEFT: &str = "CollidingLeft";
    pub const COLLIDING_RIGHT: &str = "CollidingRight";
    pub const COLLIDING_ABOVE: &str = "CollidingAbove";
    pub const COLLIDING_BELOW: &str = "CollidingBelow";
    pub const IDLE: &str = "Idle";
    pub const FACING_RIGHT: &str = "FacingRight";
    pub const RANDOM: &str = "Random";
    pub const RANDOM_CONSTANT: &str = "RandomConstant";
    pub const FLIP: &str = "Flip";
    pub const WALKING: &str = "Walking";
    pub const JUMPING: &str = "Jumping";
    pub const PAUSED: &str = "Paused";
}

pub trait AnimatorBinding {
    fn has_parameter(&self, name: &str) -> bool;
    fn set_bool(&mut self, name: &str, value: bool);
    fn set_float(&mut self, name: &str, value: f32);
    fn set_int(&mut self, name: &str, value: i32);
    fn set_trigger(&mut self, name: &str);
}

pub fn update_bool(animator: &mut dyn AnimatorBinding, name: &str, value: bool) {
    if animator.has_parameter(name) {
        animator.set_bool(name, value);
    }
}

pub fn update_float(animator: &mut dyn AnimatorBinding, name: &str, value: f32) {
    if animator.has_parameter(name) {
        animator.set_float(name, value);
    }
}

pub fn update_int(animator: &mut dyn AnimatorBinding, name: &str, value: i32) {
    if animator.has_parameter(name) {
        animator.set_int(name, value);
    }
}

pub fn update_trigger(animator: &mut dyn AnimatorBinding, name: &str) {
    if animator.has_parameter(name) {
        animator.set_trigger(name);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimatorValue {
    Bool(bool),
    Float(f32),
    Int(i32),
    /// Триггер, ещё не забранный рендером
    Trigger(bool),
}

/// Набор каналов на entity - то, что читает рендер
///
/// Каналы объявляются заранее; запись в необъявленный канал игнорируется.
#[derive(Component, Debug, Clone, Default)]
pub struct AnimatorParameters {
    channels: HashMap<String, AnimatorValue>,
}

impl AnimatorParameters {
    pub fn with_channels<'a>(declared: impl IntoIterator<Item = (&'a str, AnimatorValue)>) -> Self {
        Self {
            channels: declared
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }

    /// Все стандартные каналы агента + каналы встроенных abilities
    pub fn standard() -> Self {
        use params::*;
        let bools = [
            GROUNDED, FALLING, AIRBORNE, ALIVE, COLLIDING_LEFT, COLLIDING_RIGHT, COLLIDING_ABOVE,
            COLLIDING_BELOW, IDLE, FACING_RIGHT, WALKING, JUMPING, PAUSED,
        ];
        let floats = [
            X_SPEED, Y_SPEED, X_SPEED_ABSOLUTE, Y_SPEED_ABSOLUTE, WORLD_X_SPEED, WORLD_Y_SPEED, RANDOM,
        ];

        Self::with_channels(
            bools
                .into_iter()
                .map(|name| (name, AnimatorValue::Bool(false)))
                .chain(floats.into_iter().map(|name| (name, AnimatorValue::Float(0.0))))
                .chain([
                    (RANDOM_CONSTANT, AnimatorValue::Int(0)),
                    (FLIP, AnimatorValue::Trigger(false)),
                ]),
        )
    }

    pub fn get(&self, name: &str) -> Option<AnimatorValue> {
        self.channels.get(name).copied()
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            AnimatorValue::Bool(value) => Some(value),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            AnimatorValue::Float(value) => Some(value),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i32> {
        match self.get(name)? {
            AnimatorValue::Int(value) => Some(value),
            _ => None,
        }
    }

    /// Забирает триггер (рендер вызывает раз в кадр)
    pub fn consume_trigger(&mut self, name: &str) -> bool {
        match self.channels.get_mut(name) {
            Some(AnimatorValue::Trigger(fired)) => std::mem::replace(fired, false),
            _ => false,
        }
    }

    fn write(&mut self, name: &str, value: AnimatorValue) {
        if let Some(slot) = self.channels.get_mut(name) {
            *slot = value;
        }
    }
}

impl AnimatorBinding for AnimatorParameters {
    fn has_parameter(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        self.write(name, AnimatorValue::Bool(value));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.write(name, AnimatorValue::Float(value));
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.write(name, AnimatorValue::Int(value));
    }

    fn set_trigger(&mut self, name: &str) {
        self.write(name, AnimatorValue::Trigger(true));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_channel_is_skipped() {
        let mut animator = AnimatorParameters::with_channels([("Grounded", AnimatorValue::Bool(false))]);

        update_bool(&mut animator, "Grounded", true);
        update_bool(&mut animator, "Swimming", true);
        update_float(&mut animator, "xSpeed", 3.0);

        assert_eq!(animator.bool("Grounded"), Some(true));
        assert!(!animator.has_parameter("Swimming"));
        assert_eq!(animator.float("xSpeed"), None);
    }

    #[test]
    fn test_trigger_consumed_once() {
        let mut animator = AnimatorParameters::standard();
        update_trigger(&mut animator, params::FLIP);

        assert!(animator.consume_trigger(params::FLIP));
        assert!(!animator.consume_trigger(params::FLIP));
    }
}
