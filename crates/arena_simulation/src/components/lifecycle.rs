//! Lifecycle timers тела: окно неуязвимости и post-death слот.
//!
//! Respawn и deferred destruction живут в одном `Option<PostDeath>`,
//! поэтому одновременно запланированы быть не могут.

use bevy::prelude::*;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum PostDeath {
    Respawn(Timer),
    Destroy(Timer),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostDeathKind {
    Respawn,
    Destroy,
}

impl PostDeath {
    pub fn kind(&self) -> PostDeathKind {
        match self {
            PostDeath::Respawn(_) => PostDeathKind::Respawn,
            PostDeath::Destroy(_) => PostDeathKind::Destroy,
        }
    }

    fn timer_mut(&mut self) -> &mut Timer {
        match self {
            PostDeath::Respawn(timer) | PostDeath::Destroy(timer) => timer,
        }
    }
}

/// Что сработало за тик
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LifecycleTick {
    pub invulnerability_expired: bool,
    pub post_death: Option<PostDeathKind>,
}

#[derive(Component, Debug, Clone, Default)]
pub struct LifecycleTimers {
    /// Длительность окна неуязвимости после (re)spawn'а. 0 = без окна
    pub spawn_protection_secs: f32,
    invulnerability: Option<Timer>,
    post_death: Option<PostDeath>,
}

impl LifecycleTimers {
    pub fn new(spawn_protection_secs: f32) -> Self {
        Self {
            spawn_protection_secs: spawn_protection_secs.max(0.0),
            invulnerability: None,
            post_death: None,
        }
    }

    /// Запустить окно неуязвимости. false если окно нулевое
    pub fn start_spawn_protection(&mut self) -> bool {
        if self.spawn_protection_secs <= 0.0 {
            self.invulnerability = None;
            return false;
        }
        self.invulnerability = Some(Timer::from_seconds(
            self.spawn_protection_secs,
            TimerMode::Once,
        ));
        true
    }

    pub fn cancel_spawn_protection(&mut self) {
        self.invulnerability = None;
    }

    pub fn schedule_respawn(&mut self, delay_secs: f32) {
        self.post_death = Some(PostDeath::Respawn(Timer::from_seconds(
            delay_secs,
            TimerMode::Once,
        )));
    }

    pub fn schedule_destruction(&mut self, delay_secs: f32) {
        self.post_death = Some(PostDeath::Destroy(Timer::from_seconds(
            delay_secs.max(0.0),
            TimerMode::Once,
        )));
    }

    pub fn pending_post_death(&self) -> Option<PostDeathKind> {
        self.post_death.as_ref().map(PostDeath::kind)
    }

    pub fn is_protected(&self) -> bool {
        self.invulnerability.is_some()
    }

    pub fn cancel_all(&mut self) {
        self.invulnerability = None;
        self.post_death = None;
    }

    /// Тикает таймеры; сработавшие забираются из слотов
    pub fn tick(&mut self, delta: Duration) -> LifecycleTick {
        let mut result = LifecycleTick::default();

        if let Some(timer) = self.invulnerability.as_mut() {
            if timer.tick(delta).finished() {
                self.invulnerability = None;
                result.invulnerability_expired = true;
            }
        }

        if let Some(post_death) = self.post_death.as_mut() {
            if post_death.timer_mut().tick(delta).finished() {
                result.post_death = self.post_death.take().map(|p| p.kind());
            }
        }

        result
    }
}
