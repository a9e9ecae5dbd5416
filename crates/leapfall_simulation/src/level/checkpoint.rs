//! Checkpoints: порядок прохождения, текущий чекпоинт, привязка respawnables
//!
//! `CheckpointSet` - чистая логика без ECS (тестируется без App).
//! Системы собирают entries из `Checkpoint` + `Transform` один раз на старте уровня.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::Facing;

// ============================================================================
// Components
// ============================================================================

/// Точка спавна / респавна
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Checkpoint {
    /// Явный порядок. None = ранг после пространственной сортировки
    pub order: Option<i32>,
    /// Становится текущим даже если "позади" текущего
    pub force_assignation: bool,
    pub spawn_facing: Facing,
}

/// Объект уровня, который сбрасывается при респавне на своём чекпоинте
#[derive(Component, Debug, Clone, Default)]
pub struct Respawnable {
    /// Привязаться к первому просканированному чекпоинту независимо от позиции
    pub always_bind: bool,
    /// Явные чекпоинты-владельцы
    pub associated: Vec<Entity>,
}

// ============================================================================
// Ordering
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CheckpointAxis {
    #[default]
    X,
    Y,
    Z,
}

impl CheckpointAxis {
    pub fn coordinate(self, position: Vec3) -> f32 {
        match self {
            CheckpointAxis::X => position.x,
            CheckpointAxis::Y => position.y,
            CheckpointAxis::Z => position.z,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CheckpointDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckpointEntry {
    pub id: Entity,
    pub position: Vec3,
    pub order: Option<i32>,
    pub force_assignation: bool,
    pub spawn_facing: Facing,
}

impl CheckpointEntry {
    pub fn new(id: Entity, checkpoint: &Checkpoint, position: Vec3) -> Self {
        Self {
            id,
            position,
            order: checkpoint.order,
            force_assignation: checkpoint.force_assignation,
            spawn_facing: checkpoint.spawn_facing,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RespawnableEntry {
    pub id: Entity,
    pub position: Vec3,
    pub always_bind: bool,
    pub associated: Vec<Entity>,
}

impl RespawnableEntry {
    pub fn new(id: Entity, respawnable: &Respawnable, position: Vec3) -> Self {
        Self {
            id,
            position,
            always_bind: respawnable.always_bind,
            associated: respawnable.associated.clone(),
        }
    }
}

// ============================================================================
// CheckpointSet
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct CheckpointSet {
    entries: Vec<CheckpointEntry>,
    /// Эффективный порядок каждого entry (явный или пространственный ранг)
    orders: Vec<i64>,
    assignments: Vec<Vec<Entity>>,
    axis: CheckpointAxis,
    direction: CheckpointDirection,
    current: Option<usize>,
}

impl CheckpointSet {
    /// Сортирует чекпоинты; текущим становится первый
    ///
    /// 1. Стабильная сортировка по координате оси (Descending = обратный порядок).
    /// 2. Эффективный порядок = явный `order` либо ранг из шага 1.
    /// 3. Стабильная сортировка по эффективному порядку.
    pub fn new(mut entries: Vec<CheckpointEntry>, axis: CheckpointAxis, direction: CheckpointDirection) -> Self {
        entries.sort_by(|a, b| {
            let ordering = axis.coordinate(a.position).total_cmp(&axis.coordinate(b.position));
            match direction {
                CheckpointDirection::Ascending => ordering,
                CheckpointDirection::Descending => ordering.reverse(),
            }
        });

        let mut ranked: Vec<(i64, CheckpointEntry)> = entries
            .into_iter()
            .enumerate()
            .map(|(rank, entry)| (entry.order.map(i64::from).unwrap_or(rank as i64), entry))
            .collect();
        ranked.sort_by_key(|(order, _)| *order);

        let (orders, entries): (Vec<i64>, Vec<CheckpointEntry>) = ranked.into_iter().unzip();
        let current = if entries.is_empty() { None } else { Some(0) };

        Self {
            assignments: vec![Vec::new(); entries.len()],
            entries,
            orders,
            axis,
            direction,
            current,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CheckpointEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&CheckpointEntry> {
        self.entries.get(index)
    }

    pub fn index_of(&self, id: Entity) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    pub fn order_of(&self, index: usize) -> Option<i64> {
        self.orders.get(index).copied()
    }

    pub fn current(&self) -> Option<&CheckpointEntry> {
        self.current.and_then(|index| self.entries.get(index))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Делает чекпоинт текущим, если он не "позади" текущего
    ///
    /// Возвращает true если текущий поменялся (или подтвердился).
    pub fn set_current(&mut self, id: Entity) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };

        let advance = self.entries[index].force_assignation
            || match self.current {
                None => true,
                Some(current) => self.orders[index] >= self.orders[current],
            };

        if advance {
            self.current = Some(index);
        }
        advance
    }

    /// Слот мультиплеерного спавна: i-й игрок → i-й чекпоинт (лишние на последний)
    pub fn spawn_slot(&self, player_index: usize) -> Option<&CheckpointEntry> {
        if self.entries.is_empty() {
            return None;
        }
        self.entries.get(player_index.min(self.entries.len() - 1))
    }

    /// Привязывает каждый объект к одному чекпоинту
    ///
    /// Скан с последнего чекпоинта; первый подходящий выигрывает:
    /// always_bind, явная ассоциация или объект "за" чекпоинтом по оси.
    pub fn assign_respawnables(&mut self, objects: &[RespawnableEntry]) {
        for assigned in &mut self.assignments {
            assigned.clear();
        }

        for object in objects {
            let object_coordinate = self.axis.coordinate(object.position);

            for index in (0..self.entries.len()).rev() {
                let checkpoint = &self.entries[index];
                let offset = object_coordinate - self.axis.coordinate(checkpoint.position);
                let beyond = match self.direction {
                    CheckpointDirection::Ascending => offset >= 0.0,
                    CheckpointDirection::Descending => offset <= 0.0,
                };

                if object.always_bind || object.associated.contains(&checkpoint.id) || beyond {
                    self.assignments[index].push(object.id);
                    break;
                }
            }
        }
    }

    pub fn assigned_to(&self, id: Entity) -> &[Entity] {
        match self.index_of(id) {
            Some(index) => &self.assignments[index],
            None => &[],
        }
    }
}
