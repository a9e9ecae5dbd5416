//! Ability pipeline агента
//!
//! Ability = независимо включаемый модуль поведения с трёхфазным контрактом:
//! - Early: сэмплинг input / intent (НЕ трогает physics forces)
//! - Main: переходы состояний, команды force/velocity
//! - Late: поправки, зависящие от решений всех Main фаз
//!
//! Порядок регистрации = порядок исполнения внутри фазы.
//! Регистрация явная (при конструировании агента), без reflection-discovery.

use std::any::Any;
use std::fmt;

use thiserror::Error;

use crate::components::{
    AgentInput, AnimatorBinding, ConditionState, Facing, MovementState, PlatformerController,
};
use crate::state_machine::StateMachine;

pub mod horizontal_movement;
pub mod jump;
pub mod pause;

pub use horizontal_movement::HorizontalMovement;
pub use jump::Jump;
pub use pause::PauseAbility;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AbilityError {
    #[error("ability `{ability}` is missing required collaborator `{what}`")]
    MissingCollaborator {
        ability: &'static str,
        what: &'static str,
    },
    #[error("ability `{ability}` is misconfigured: {reason}")]
    InvalidState { ability: &'static str, reason: String },
    #[error("ability `{ability}` failed: {reason}")]
    Failed { ability: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityPhase {
    Early,
    Main,
    Late,
}

/// Всё, что модуль видит во время фазы
///
/// Flip модуль не делает сам: `request_face` применяется агентом
/// после фазы через обычный (не форсированный) путь Flip.
pub struct AbilityContext<'a> {
    pub movement: &'a mut StateMachine<MovementState>,
    pub condition: &'a mut StateMachine<ConditionState>,
    pub controller: &'a mut dyn PlatformerController,
    pub input: &'a AgentInput,
    pub facing: Facing,
    pub delta: f32,
    face_request: Option<Facing>,
}

impl<'a> AbilityContext<'a> {
    pub fn new(
        movement: &'a mut StateMachine<MovementState>,
        condition: &'a mut StateMachine<ConditionState>,
        controller: &'a mut dyn PlatformerController,
        input: &'a AgentInput,
        facing: Facing,
        delta: f32,
    ) -> Self {
        Self {
            movement,
            condition,
            controller,
            input,
            facing,
            delta,
            face_request: None,
        }
    }

    pub fn request_face(&mut self, facing: Facing) {
        self.face_request = Some(facing);
    }

    pub fn take_face_request(&mut self) -> Option<Facing> {
        self.face_request.take()
    }
}

/// Downcast helper для `find::<T>()`
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub trait AbilityModule: AsAny + Send + Sync {
    fn name(&self) -> &'static str;

    /// One-time initialization. Ошибка = модуль не участвует до следующего re-scan.
    fn initialize(&mut self) -> Result<(), AbilityError> {
        Ok(())
    }

    fn early_process(&mut self, _ctx: &mut AbilityContext<'_>) -> Result<(), AbilityError> {
        Ok(())
    }

    fn process(&mut self, _ctx: &mut AbilityContext<'_>) -> Result<(), AbilityError> {
        Ok(())
    }

    fn late_process(&mut self, _ctx: &mut AbilityContext<'_>) -> Result<(), AbilityError> {
        Ok(())
    }

    fn on_flip(&mut self) {}

    fn reset_ability(&mut self) {}

    fn update_animator(&self, _animator: &mut dyn AnimatorBinding) {}
}

struct AbilitySlot {
    module: Box<dyn AbilityModule>,
    enabled: bool,
    initialized: bool,
}

impl AbilitySlot {
    fn participates(&self) -> bool {
        self.enabled && self.initialized
    }

    fn downcast_ref<T: AbilityModule>(&self) -> Option<&T> {
        let module: &dyn AbilityModule = self.module.as_ref();
        module.as_any().downcast_ref::<T>()
    }

    fn downcast_mut<T: AbilityModule>(&mut self) -> Option<&mut T> {
        let module: &mut dyn AbilityModule = self.module.as_mut();
        module.as_any_mut().downcast_mut::<T>()
    }
}

/// Упорядоченный реестр модулей агента
#[derive(Default)]
pub struct AbilitySet {
    slots: Vec<AbilitySlot>,
}

impl fmt::Debug for AbilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.slots
                    .iter()
                    .map(|slot| (slot.module.name(), slot.enabled, slot.initialized)),
            )
            .finish()
    }
}

impl AbilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, module: impl AbilityModule) -> Self {
        self.register(module);
        self
    }

    /// Новый модуль включён, но не инициализирован до `cache_abilities`
    pub fn register(&mut self, module: impl AbilityModule) {
        self.register_boxed(Box::new(module));
    }

    pub fn register_boxed(&mut self, module: Box<dyn AbilityModule>) {
        self.slots.push(AbilitySlot {
            module,
            enabled: true,
            initialized: false,
        });
    }

    /// Re-scan: инициализирует всё, что ещё не инициализировано
    ///
    /// Возвращает сколько модулей стали активными.
    pub fn cache_abilities(&mut self) -> usize {
        let mut newly_ready = 0;

        for slot in self.slots.iter_mut().filter(|slot| !slot.initialized) {
            match slot.module.initialize() {
                Ok(()) => {
                    slot.initialized = true;
                    newly_ready += 1;
                }
                Err(error) => {
                    crate::log_error(&format!("⚠️ Ability init skipped: {}", error));
                }
            }
        }

        newly_ready
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.slots.iter().map(|slot| slot.module.name()).collect()
    }

    /// Возвращает false если модуля с таким именем нет
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.slots.iter_mut().find(|slot| slot.module.name() == name) {
            Some(slot) => {
                slot.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn is_enabled(&self, name: &str) -> Option<bool> {
        self.slots
            .iter()
            .find(|slot| slot.module.name() == name)
            .map(|slot| slot.enabled)
    }

    pub fn is_initialized(&self, name: &str) -> Option<bool> {
        self.slots
            .iter()
            .find(|slot| slot.module.name() == name)
            .map(|slot| slot.initialized)
    }

    pub fn find<T: AbilityModule>(&self) -> Option<&T> {
        self.slots.iter().find_map(|slot| slot.downcast_ref::<T>())
    }

    pub fn find_mut<T: AbilityModule>(&mut self) -> Option<&mut T> {
        self.slots.iter_mut().find_map(|slot| slot.downcast_mut::<T>())
    }

    pub fn find_all<T: AbilityModule>(&self) -> Vec<&T> {
        self.slots
            .iter()
            .filter_map(|slot| slot.downcast_ref::<T>())
            .collect()
    }

    /// Только модуль, который сейчас участвует в pipeline
    pub fn find_active_mut<T: AbilityModule>(&mut self) -> Option<&mut T> {
        self.slots
            .iter_mut()
            .filter(|slot| slot.participates())
            .find_map(|slot| slot.downcast_mut::<T>())
    }

    /// Одна фаза по всем активным модулям
    ///
    /// Ошибка модуля логируется и не прерывает остальные. Возвращает число упавших.
    pub fn run_phase(&mut self, phase: AbilityPhase, ctx: &mut AbilityContext<'_>) -> usize {
        let mut failures = 0;

        for slot in self.slots.iter_mut().filter(|slot| slot.participates()) {
            let result = match phase {
                AbilityPhase::Early => slot.module.early_process(ctx),
                AbilityPhase::Main => slot.module.process(ctx),
                AbilityPhase::Late => slot.module.late_process(ctx),
            };

            if let Err(error) = result {
                failures += 1;
                crate::log_error(&format!("❌ {:?} phase: {}", phase, error));
            }
        }

        failures
    }

    pub fn flip_all(&mut self) {
        for slot in self.slots.iter_mut().filter(|slot| slot.enabled) {
            slot.module.on_flip();
        }
    }

    pub fn reset_all(&mut self) {
        for slot in self.slots.iter_mut().filter(|slot| slot.enabled) {
            slot.module.reset_ability();
        }
    }

    pub fn push_animators(&self, animator: &mut dyn AnimatorBinding) {
        for slot in self.slots.iter().filter(|slot| slot.participates()) {
            slot.module.update_animator(animator);
        }
    }
}
