//! AI coordinator: decision process + non-owning binding к телу.
//!
//! Coordinator переживает тело: на смерть отвязывается и ждёт respawn
//! (или уничтожается, если тело не вернётся).

use bevy::prelude::*;

use crate::components::TeamId;

/// Behaviour FSM по умолчанию
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BehaviorState {
    #[default]
    Idle,
    Engage {
        target: Entity,
    },
}

/// Decision process (аналог behaviour tree run state)
///
/// `generation` растёт на каждый (re)start: по нему видно, что логика
/// запущена заново из начального состояния.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecisionProcess {
    running: bool,
    generation: u32,
    state: BehaviorState,
}

impl DecisionProcess {
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn state(&self) -> BehaviorState {
        self.state
    }

    pub fn set_state(&mut self, state: BehaviorState) {
        if self.running {
            self.state = state;
        }
    }

    pub fn start(&mut self) {
        self.running = true;
        self.generation += 1;
        self.state = BehaviorState::Idle;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.state = BehaviorState::Idle;
    }

    pub fn restart(&mut self) {
        self.stop();
        self.start();
    }
}

/// Что делать coordinator'у после смерти тела
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathHandoff {
    /// Тело вернётся: ждём BodyRespawned
    AwaitRespawn,
    /// Тело уничтожается: coordinator тоже
    TearDown,
}

/// Путь `request_rebind`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebindPath {
    /// Не привязан к этому телу → полноценный bind
    Bind,
    /// Уже привязан → сброс цели + рестарт логики
    Restart,
}

#[derive(Component, Debug, Clone)]
pub struct AiCoordinator {
    pub name: String,
    pub team_tag: TeamId,
    controlled_body: Option<Entity>,
    current_target: Option<Entity>,
    logic: DecisionProcess,
}

impl AiCoordinator {
    pub fn new(name: impl Into<String>, team_tag: TeamId) -> Self {
        Self {
            name: name.into(),
            team_tag,
            controlled_body: None,
            current_target: None,
            logic: DecisionProcess::default(),
        }
    }

    pub fn controlled_body(&self) -> Option<Entity> {
        self.controlled_body
    }

    pub fn current_target(&self) -> Option<Entity> {
        self.current_target
    }

    pub fn logic(&self) -> &DecisionProcess {
        &self.logic
    }

    pub fn is_bound(&self) -> bool {
        self.controlled_body.is_some()
    }

    /// Unbound или остановленный coordinator команд не отдаёт
    pub fn can_issue_commands(&self) -> bool {
        self.controlled_body.is_some() && self.logic.is_running()
    }

    pub fn set_target(&mut self, target: Entity) {
        self.current_target = Some(target);
    }

    pub fn clear_target(&mut self) {
        self.current_target = None;
    }

    /// Engage цели (behaviour FSM + target вместе)
    pub fn engage(&mut self, target: Entity) {
        self.set_target(target);
        self.logic.set_state(BehaviorState::Engage { target });
    }

    pub fn disengage(&mut self) {
        self.clear_target();
        self.logic.set_state(BehaviorState::Idle);
    }

    /// Привязка: цель сброшена, логика с начального состояния
    pub fn bind(&mut self, body: Entity) {
        self.controlled_body = Some(body);
        self.current_target = None;
        self.logic.restart();
    }

    pub fn rebind_path(&self, body: Entity) -> RebindPath {
        if self.controlled_body == Some(body) {
            RebindPath::Restart
        } else {
            RebindPath::Bind
        }
    }

    /// Уже привязан: тот же observable результат, что и у bind
    pub fn restart_logic(&mut self) {
        self.current_target = None;
        self.logic.restart();
    }

    /// Тело умерло. `will_respawn` захвачен до unbind'а
    pub fn on_body_death(&mut self, will_respawn: bool) -> DeathHandoff {
        self.logic.stop();
        self.current_target = None;
        self.controlled_body = None;

        if will_respawn {
            DeathHandoff::AwaitRespawn
        } else {
            DeathHandoff::TearDown
        }
    }

    /// Конец матча: стоп логики без teardown. Возвращает тело для остановки
    pub fn stop_for_match_end(&mut self) -> Option<Entity> {
        self.logic.stop();
        self.current_target = None;
        self.controlled_body
    }
}
