//! GameSession - состояние между уровнями (жизни, очки, пауза, persistence)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::agent::AgentBlueprint;
use crate::components::Facing;

/// Куда поставить игрока при следующем входе в уровень
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointOfEntryRecord {
    pub level: String,
    pub entry_index: usize,
    pub facing: Facing,
}

/// Game Session resource
///
/// `maximum_lives == 0` = жизни не учитываются.
#[derive(Resource, Debug, Clone)]
pub struct GameSession {
    pub maximum_lives: u32,
    pub current_lives: u32,
    initial_maximum_lives: u32,
    initial_current_lives: u32,

    pub reset_lives_on_game_over: bool,
    pub reset_persistent_on_game_over: bool,
    pub reset_stored_on_game_over: bool,
    /// Уровень, который грузится после game over (None = остаёмся)
    pub game_over_level: Option<String>,

    points: i32,
    paused: bool,
    stored_agent: Option<AgentBlueprint>,
    persistent_agent: Option<Entity>,
    points_of_entry: Vec<PointOfEntryRecord>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::with_lives(0, 0)
    }
}

impl GameSession {
    pub fn with_lives(maximum: u32, current: u32) -> Self {
        Self {
            maximum_lives: maximum,
            current_lives: current,
            initial_maximum_lives: maximum,
            initial_current_lives: current,
            reset_lives_on_game_over: true,
            reset_persistent_on_game_over: true,
            reset_stored_on_game_over: true,
            game_over_level: None,
            points: 0,
            paused: false,
            stored_agent: None,
            persistent_agent: None,
            points_of_entry: Vec::new(),
        }
    }

    // ========================================================================
    // Lives
    // ========================================================================

    pub fn lives_tracked(&self) -> bool {
        self.maximum_lives > 0
    }

    pub fn lose_life(&mut self) {
        self.current_lives = self.current_lives.saturating_sub(1);
    }

    /// +lives, не выше максимума
    pub fn gain_lives(&mut self, lives: u32) {
        self.current_lives = (self.current_lives + lives).min(self.maximum_lives);
    }

    /// Поднимает максимум (и опционально текущее значение)
    pub fn add_lives(&mut self, lives: u32, increase_current: bool) {
        self.maximum_lives += lives;
        if increase_current {
            self.current_lives += lives;
        }
    }

    pub fn reset_lives(&mut self) {
        self.maximum_lives = self.initial_maximum_lives;
        self.current_lives = self.initial_current_lives;
    }

    // ========================================================================
    // Points / pause
    // ========================================================================

    pub fn points(&self) -> i32 {
        self.points
    }

    pub fn add_points(&mut self, points: i32) {
        self.points += points;
    }

    pub fn set_points(&mut self, points: i32) {
        self.points = points;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    // ========================================================================
    // Stored / persistent agents
    // ========================================================================

    /// Выбранный персонаж (например в меню) - приоритетнее сценовых агентов
    pub fn store_agent(&mut self, blueprint: AgentBlueprint) {
        self.stored_agent = Some(blueprint);
    }

    pub fn stored_agent(&self) -> Option<&AgentBlueprint> {
        self.stored_agent.as_ref()
    }

    pub fn clear_stored_agent(&mut self) {
        self.stored_agent = None;
    }

    /// Агент, переживающий смену уровня
    pub fn set_persistent_agent(&mut self, agent: Entity) {
        self.persistent_agent = Some(agent);
    }

    pub fn persistent_agent(&self) -> Option<Entity> {
        self.persistent_agent
    }

    pub fn take_persistent_agent(&mut self) -> Option<Entity> {
        self.persistent_agent.take()
    }

    // ========================================================================
    // Points of entry
    // ========================================================================

    /// Одна запись на уровень, повторный store перезаписывает
    pub fn store_point_of_entry(&mut self, level: impl Into<String>, entry_index: usize, facing: Facing) {
        let level = level.into();
        self.points_of_entry.retain(|record| record.level != level);
        self.points_of_entry.push(PointOfEntryRecord {
            level,
            entry_index,
            facing,
        });
    }

    pub fn point_of_entry(&self, level: &str) -> Option<&PointOfEntryRecord> {
        self.points_of_entry.iter().find(|record| record.level == level)
    }

    pub fn clear_point_of_entry(&mut self, level: &str) {
        self.points_of_entry.retain(|record| record.level != level);
    }

    pub fn clear_all_points_of_entry(&mut self) {
        self.points_of_entry.clear();
    }

    pub fn points_of_entry(&self) -> &[PointOfEntryRecord] {
        &self.points_of_entry
    }

    /// Полный сброс сессии (новая игра)
    pub fn reset(&mut self) {
        self.reset_lives();
        self.points = 0;
        self.paused = false;
        self.stored_agent = None;
        self.persistent_agent = None;
        self.points_of_entry.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lives_bookkeeping() {
        let mut session = GameSession::with_lives(3, 2);
        assert!(session.lives_tracked());

        session.gain_lives(5);
        assert_eq!(session.current_lives, 3, "gain не выше максимума");

        session.add_lives(2, true);
        assert_eq!((session.maximum_lives, session.current_lives), (5, 5));

        session.lose_life();
        session.reset_lives();
        assert_eq!((session.maximum_lives, session.current_lives), (3, 2));

        session.current_lives = 0;
        session.lose_life();
        assert_eq!(session.current_lives, 0);
    }

    #[test]
    fn test_untracked_lives_by_default() {
        assert!(!GameSession::default().lives_tracked());
    }

    #[test]
    fn test_points_of_entry_one_per_level() {
        let mut session = GameSession::default();
        session.store_point_of_entry("forest", 0, Facing::Right);
        session.store_point_of_entry("cave", 1, Facing::Left);
        session.store_point_of_entry("forest", 2, Facing::Left);

        assert_eq!(session.points_of_entry().len(), 2);
        let forest = session.point_of_entry("forest").map(|record| (record.entry_index, record.facing));
        assert_eq!(forest, Some((2, Facing::Left)));

        session.clear_point_of_entry("cave");
        assert!(session.point_of_entry("cave").is_none());

        session.clear_all_points_of_entry();
        assert!(session.points_of_entry().is_empty());
    }

    #[test]
    fn test_reset_clears_session() {
        let mut session = GameSession::with_lives(3, 3);
        session.add_points(40);
        session.set_paused(true);
        session.set_persistent_agent(Entity::from_raw(3));
        session.lose_life();

        session.reset();

        assert_eq!(session.points(), 0);
        assert!(!session.is_paused());
        assert_eq!(session.persistent_agent(), None);
        assert_eq!(session.current_lives, 3);
    }
}
