//! Camera follow target агента

use bevy::prelude::*;

/// Точка, за которой следит камера (локальные координаты агента)
///
/// Каждый кадр: `position ← lerp(position, rest + offset, speed · Δt)`, без snap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTarget {
    rest_position: Vec3,
    position: Vec3,
    pub offset: Vec3,
    pub speed: f32,
}

impl CameraTarget {
    pub fn new(rest_position: Vec3, speed: f32) -> Self {
        Self {
            rest_position,
            position: rest_position,
            offset: Vec3::ZERO,
            speed,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rest_position(&self) -> Vec3 {
        self.rest_position
    }

    pub fn target(&self) -> Vec3 {
        self.rest_position + self.offset
    }

    pub fn update(&mut self, delta: f32) {
        let t = (self.speed * delta).clamp(0.0, 1.0);
        self.position = self.position.lerp(self.target(), t);
    }
}
