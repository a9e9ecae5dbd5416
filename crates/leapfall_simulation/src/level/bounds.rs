//! Границы уровня (camera confiner, kill plane и т.п.)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for LevelBounds {
    fn default() -> Self {
        Self {
            min: Vec3::new(-100.0, -50.0, -10.0),
            max: Vec3::new(100.0, 50.0, 10.0),
        }
    }
}

impl LevelBounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_corners() {
        let bounds = LevelBounds::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(-5.0, 2.0, 1.0));
        assert_eq!(bounds.min, Vec3::new(-5.0, 0.0, 0.0));
        assert_eq!(bounds.size(), Vec3::new(10.0, 2.0, 1.0));
        assert!(bounds.contains(Vec3::new(0.0, 1.0, 0.5)));
        assert!(!bounds.contains(Vec3::new(6.0, 1.0, 0.5)));
    }
}
