//! Generic state machine с уведомлениями
//!
//! Используется агентом для двух независимых машин: movement и condition.
//! Уведомления складываются в outbox; система-владелец вычитывает их
//! каждый кадр и публикует как ECS events (animation, UI и т.д. не поллят).

/// Уведомление от state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateNotification<T> {
    /// Переход old → new (ровно один раз на различный переход)
    Changed { from: T, to: T },
    /// Per-frame "state is", пока состояние не менялось
    Is(T),
}

#[derive(Debug, Clone)]
pub struct StateMachine<T: Copy + PartialEq> {
    current: T,
    previous: T,
    send_change_events: bool,
    send_update_events: bool,
    changed_this_frame: bool,
    outbox: Vec<StateNotification<T>>,
}

impl<T: Copy + PartialEq> StateMachine<T> {
    pub fn new(initial: T, send_change_events: bool) -> Self {
        Self {
            current: initial,
            previous: initial,
            send_change_events,
            send_update_events: false,
            changed_this_frame: false,
            outbox: Vec::new(),
        }
    }

    pub fn with_update_events(mut self, enabled: bool) -> Self {
        self.send_update_events = enabled;
        self
    }

    pub fn current(&self) -> T {
        self.current
    }

    pub fn previous(&self) -> T {
        self.previous
    }

    /// Переход в `next`. No-op (без уведомлений), если уже в нём.
    ///
    /// Возвращает true если переход действительно произошёл.
    pub fn change_state(&mut self, next: T) -> bool {
        if next == self.current {
            return false;
        }

        self.previous = self.current;
        self.current = next;
        self.changed_this_frame = true;

        if self.send_change_events {
            self.outbox.push(StateNotification::Changed {
                from: self.previous,
                to: next,
            });
        }

        true
    }

    /// Возврат в предыдущее состояние (обычное ChangeState, previous перезапишется)
    pub fn restore_previous_state(&mut self) -> bool {
        let previous = self.previous;
        self.change_state(previous)
    }

    /// Начало кадра владельца. Переходы, сделанные после `end_frame`
    /// (другими системами), относятся к прошлому кадру.
    pub fn begin_frame(&mut self) {
        self.changed_this_frame = false;
    }

    /// Конец кадра: "state is", если с `begin_frame` не было перехода
    pub fn end_frame(&mut self) {
        if self.send_update_events && !self.changed_this_frame {
            self.outbox.push(StateNotification::Is(self.current));
        }
    }

    pub fn drain_notifications(&mut self) -> std::vec::Drain<'_, StateNotification<T>> {
        self.outbox.drain(..)
    }

    pub fn pending_notifications(&self) -> &[StateNotification<T>] {
        &self.outbox
    }
}

impl<T: Copy + PartialEq + Default> Default for StateMachine<T> {
    fn default() -> Self {
        Self::new(T::default(), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    enum Light {
        #[default]
        Red,
        Yellow,
        Green,
    }

    fn changes(machine: &mut StateMachine<Light>) -> Vec<(Light, Light)> {
        machine
            .drain_notifications()
            .filter_map(|n| match n {
                StateNotification::Changed { from, to } => Some((from, to)),
                StateNotification::Is(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_change_state_fires_once_per_distinct_transition() {
        let mut machine = StateMachine::new(Light::Red, true);

        assert!(machine.change_state(Light::Green));
        assert!(!machine.change_state(Light::Green));
        assert!(!machine.change_state(Light::Green));
        assert!(machine.change_state(Light::Yellow));

        assert_eq!(machine.current(), Light::Yellow);
        assert_eq!(machine.previous(), Light::Green);
        assert_eq!(
            changes(&mut machine),
            vec![(Light::Red, Light::Green), (Light::Green, Light::Yellow)]
        );
    }

    #[test]
    fn test_current_reflects_latest_call_for_any_sequence() {
        let sequence = [
            Light::Green,
            Light::Green,
            Light::Red,
            Light::Yellow,
            Light::Yellow,
            Light::Red,
        ];
        let mut machine = StateMachine::new(Light::Red, true);
        let mut expected_changes = 0;
        let mut last = Light::Red;

        for next in sequence {
            if next != last {
                expected_changes += 1;
            }
            machine.change_state(next);
            last = next;
            assert_eq!(machine.current(), next);
        }

        assert_eq!(changes(&mut machine).len(), expected_changes);
    }

    #[test]
    fn test_opted_out_machine_stays_silent() {
        let mut machine = StateMachine::new(Light::Red, false);
        machine.change_state(Light::Green);
        machine.end_frame();

        assert!(machine.pending_notifications().is_empty());
    }

    #[test]
    fn test_update_events_only_while_unchanged() {
        let mut machine = StateMachine::new(Light::Red, true).with_update_events(true);

        machine.begin_frame();
        machine.end_frame();
        machine.begin_frame();
        machine.change_state(Light::Green);
        machine.end_frame();
        machine.begin_frame();
        machine.end_frame();

        let drained: Vec<_> = machine.drain_notifications().collect();
        assert_eq!(
            drained,
            vec![
                StateNotification::Is(Light::Red),
                StateNotification::Changed {
                    from: Light::Red,
                    to: Light::Green
                },
                StateNotification::Is(Light::Green),
            ]
        );
    }

    #[test]
    fn test_restore_previous_state() {
        let mut machine = StateMachine::<Light>::default();
        machine.change_state(Light::Yellow);
        assert!(machine.restore_previous_state());
        assert_eq!(machine.current(), Light::Red);
    }

    #[test]
    fn test_change_after_end_frame_belongs_to_previous_frame() {
        let mut machine = StateMachine::new(Light::Red, true).with_update_events(true);

        machine.begin_frame();
        machine.end_frame();
        // Переход снаружи кадра владельца (например, урон после update)
        machine.change_state(Light::Green);

        machine.begin_frame();
        machine.end_frame();

        let drained: Vec<_> = machine.drain_notifications().collect();
        assert_eq!(
            drained,
            vec![
                StateNotification::Is(Light::Red),
                StateNotification::Changed {
                    from: Light::Red,
                    to: Light::Green
                },
                StateNotification::Is(Light::Green),
            ]
        );
    }
}
