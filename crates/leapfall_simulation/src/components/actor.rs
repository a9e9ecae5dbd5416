//! Базовые компоненты живых агентов: Health, Persistence, AgentKind

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Кто управляет агентом
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum AgentKind {
    #[default]
    Player,
    Ai,
}

/// Здоровье агента
///
/// Инвариант: 0 ≤ current ≤ max
/// Отсутствие компонента = фича выключена (агент не умирает от урона).
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100) // Default 100 HP
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Возвращает true если этот удар убил (был жив → стал мёртв)
    pub fn take_damage(&mut self, amount: u32) -> bool {
        let was_alive = self.is_alive();
        self.current = self.current.saturating_sub(amount);
        was_alive && !self.is_alive()
    }

    pub fn heal(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.max);
    }

    /// Мгновенная смерть (kill zones)
    pub fn kill(&mut self) -> bool {
        let was_alive = self.is_alive();
        self.current = 0;
        was_alive
    }

    pub fn reset_to_max(&mut self) {
        self.current = self.max;
    }
}

/// Persistence collaborator: агент переживает смену уровня
///
/// `initialized` = сохранённые данные уже применены, respawn не трогает здоровье.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Persistence {
    pub initialized: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage() {
        let mut health = Health::new(100);
        assert_eq!(health.current, 100);

        assert!(!health.take_damage(30));
        assert_eq!(health.current, 70);
        assert!(health.is_alive());

        assert!(health.take_damage(100)); // Saturating sub, смертельный удар
        assert_eq!(health.current, 0);
        assert!(!health.is_alive());

        // Добивание мёртвого - не новая смерть
        assert!(!health.take_damage(10));
    }

    #[test]
    fn test_health_heal() {
        let mut health = Health::new(100);
        health.take_damage(50);

        health.heal(30);
        assert_eq!(health.current, 80);

        health.heal(100); // Clamped to max
        assert_eq!(health.current, 100);
    }

    #[test]
    fn test_health_kill_and_reset() {
        let mut health = Health::new(3);
        assert!(health.kill());
        assert!(!health.kill());

        health.reset_to_max();
        assert_eq!(health.current, 3);
    }
}
