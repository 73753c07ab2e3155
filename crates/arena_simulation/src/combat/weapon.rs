//! Weapon state machine: Idle → Firing → (Cooldown | Reloading) → Idle.
//!
//! Оружие: отдельная entity (`Weapon` + `WeaponOwner`). Refire и reload
//! таймеры лежат прямо в компоненте: despawn оружия = отмена таймеров.
//!
//! Инварианты:
//! - 0 ≤ current_ammo ≤ magazine_size
//! - никогда is_firing && is_reloading
//! - пустой магазин или reload → выстрела нет
//!
//! Guarded переходы возвращают `Result<_, WeaponRejection>`; системы
//! логируют причину на debug и проглатывают ошибку.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::authority::NetRole;

/// Небольшой допуск на накопленную погрешность f32 времени
const REFIRE_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Semi-auto
    Pistol,
    /// Full-auto
    Rifle,
}

/// Почему переход отклонён
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WeaponRejection {
    #[error("weapon is not active")]
    Inactive,
    #[error("trigger is not held")]
    TriggerReleased,
    #[error("weapon is reloading")]
    Reloading,
    #[error("magazine is empty")]
    OutOfAmmo,
    #[error("reload not possible (full magazine, firing or already reloading)")]
    CannotReload,
    #[error("only the authoritative side may change ammo")]
    NotAuthoritative,
}

/// Что запланировано после выстрела
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefireAction {
    /// Full-auto: следующий выстрел
    Fire,
    /// Semi-auto: уведомить holder'а, что cooldown истёк
    CooldownExpired,
}

/// Результат успешного выстрела (для AmmoChanged)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredRound {
    pub ammo: u32,
    pub magazine: u32,
}

/// Что сработало за тик
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeaponTick {
    pub refire: Option<RefireAction>,
    /// Reload таймер истёк → вызывающий должен вызвать `reload_complete()`
    pub reload_finished: bool,
}

#[derive(Component, Debug, Clone)]
pub struct Weapon {
    pub kind: WeaponKind,
    pub magazine_size: u32,
    /// Минимальный интервал между выстрелами (секунды)
    pub refire_interval: f32,
    pub full_auto: bool,
    pub reload_secs: f32,
    pub damage: f32,
    /// Скорость снаряда (м/с)
    pub projectile_speed: f32,
    /// Смещение дула от глаз вдоль направления выстрела (метры)
    pub muzzle_offset: f32,
    /// Радиус случайного разброса точки прицеливания (метры)
    pub aim_variance: f32,
    /// Отдача для player holder'а (градусы pitch)
    pub firing_recoil: f32,
    pub shot_loudness: f32,
    pub shot_noise_range: f32,

    current_ammo: u32,
    is_firing: bool,
    is_reloading: bool,
    active: bool,
    time_of_last_shot: Option<f32>,
    refire: Option<(RefireAction, Timer)>,
    reload_timer: Option<Timer>,
}

impl Weapon {
    fn with_stats(kind: WeaponKind, magazine_size: u32, refire_interval: f32, full_auto: bool) -> Self {
        Self {
            kind,
            magazine_size,
            refire_interval,
            full_auto,
            reload_secs: 1.5,
            damage: 20.0,
            projectile_speed: 80.0,
            muzzle_offset: 0.5,
            aim_variance: 0.02,
            firing_recoil: 1.0,
            shot_loudness: 1.0,
            shot_noise_range: 30.0,
            current_ammo: magazine_size,
            is_firing: false,
            is_reloading: false,
            active: false,
            time_of_last_shot: None,
            refire: None,
            reload_timer: None,
        }
    }

    /// Semi-auto пистолет
    pub fn pistol() -> Self {
        Self {
            damage: 25.0,
            firing_recoil: 1.5,
            ..Self::with_stats(WeaponKind::Pistol, 12, 0.25, false)
        }
    }

    /// Full-auto винтовка
    pub fn rifle() -> Self {
        Self {
            reload_secs: 2.0,
            damage: 15.0,
            projectile_speed: 120.0,
            firing_recoil: 0.8,
            shot_noise_range: 40.0,
            ..Self::with_stats(WeaponKind::Rifle, 30, 0.1, true)
        }
    }

    pub fn from_kind(kind: WeaponKind) -> Self {
        match kind {
            WeaponKind::Pistol => Self::pistol(),
            WeaponKind::Rifle => Self::rifle(),
        }
    }

    pub fn current_ammo(&self) -> u32 {
        self.current_ammo
    }

    pub fn is_firing(&self) -> bool {
        self.is_firing
    }

    pub fn is_reloading(&self) -> bool {
        self.is_reloading
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn time_of_last_shot(&self) -> Option<f32> {
        self.time_of_last_shot
    }

    pub fn pending_refire(&self) -> Option<RefireAction> {
        self.refire.as_ref().map(|(action, _)| *action)
    }

    pub fn has_pending_reload(&self) -> bool {
        self.reload_timer.is_some()
    }

    /// Нажатие на спуск.
    ///
    /// Ok(Some): выстрел произошёл сразу. Ok(None): ждём cooldown
    /// (full-auto ставит выстрел на остаток cooldown, semi-auto ничего не ставит).
    pub fn start_firing(&mut self, now: f32) -> Result<Option<FiredRound>, WeaponRejection> {
        if !self.active {
            return Err(WeaponRejection::Inactive);
        }
        if self.is_reloading {
            return Err(WeaponRejection::Reloading);
        }

        self.is_firing = true;

        let since_last = self.time_of_last_shot.map(|t| now - t);
        match since_last {
            Some(since) if since + REFIRE_EPSILON < self.refire_interval => {
                if self.full_auto {
                    let residual = (self.refire_interval - since).max(0.0);
                    self.refire = Some((RefireAction::Fire, Timer::from_seconds(residual, TimerMode::Once)));
                }
                Ok(None)
            }
            _ => self.fire(now).map(Some),
        }
    }

    /// Один выстрел. Ammo → 0 сразу гасит firing и дальше ничего не планирует
    pub fn fire(&mut self, now: f32) -> Result<FiredRound, WeaponRejection> {
        if !self.is_firing {
            return Err(WeaponRejection::TriggerReleased);
        }
        if self.is_reloading {
            return Err(WeaponRejection::Reloading);
        }
        if self.current_ammo == 0 {
            self.stop_firing();
            return Err(WeaponRejection::OutOfAmmo);
        }

        self.current_ammo -= 1;
        self.time_of_last_shot = Some(now);

        if self.current_ammo == 0 {
            self.stop_firing();
        } else {
            let action = if self.full_auto {
                RefireAction::Fire
            } else {
                RefireAction::CooldownExpired
            };
            self.refire = Some((action, Timer::from_seconds(self.refire_interval, TimerMode::Once)));
        }

        Ok(FiredRound {
            ammo: self.current_ammo,
            magazine: self.magazine_size,
        })
    }

    /// Отпустить спуск: intent сброшен, запланированный выстрел отменён
    pub fn stop_firing(&mut self) {
        self.is_firing = false;
        self.refire = None;
    }

    pub fn can_reload(&self) -> bool {
        !self.is_reloading && self.current_ammo < self.magazine_size && !self.is_firing
    }

    pub fn start_reload(&mut self, role: NetRole) -> Result<(), WeaponRejection> {
        if !role.is_authority() {
            return Err(WeaponRejection::NotAuthoritative);
        }
        if !self.active {
            return Err(WeaponRejection::Inactive);
        }
        if !self.can_reload() {
            return Err(WeaponRejection::CannotReload);
        }

        self.refire = None;
        self.is_reloading = true;
        self.reload_timer = Some(Timer::from_seconds(self.reload_secs, TimerMode::Once));
        Ok(())
    }

    pub fn stop_reload(&mut self) {
        self.is_reloading = false;
        self.reload_timer = None;
    }

    /// Полный магазин. Возвращает новый ammo
    pub fn reload_complete(&mut self) -> u32 {
        self.current_ammo = self.magazine_size;
        self.is_reloading = false;
        self.reload_timer = None;
        self.current_ammo
    }

    /// Оружие стало активным в руках владельца. Возвращает (ammo, magazine)
    pub fn activate(&mut self) -> (u32, u32) {
        self.active = true;
        (self.current_ammo, self.magazine_size)
    }

    pub fn deactivate(&mut self) {
        self.stop_firing();
        self.stop_reload();
        self.active = false;
    }

    /// Mirror: только intent флаг, без ammo/таймеров. true если предсказан выстрел
    pub fn predict_start_firing(&mut self) -> bool {
        if !self.active || self.is_reloading || self.current_ammo == 0 {
            return false;
        }
        self.is_firing = true;
        true
    }

    /// Тик refire/reload таймеров. Сработавший таймер убирается из слота
    pub fn tick(&mut self, delta: Duration) -> WeaponTick {
        let mut result = WeaponTick::default();

        if let Some((action, timer)) = self.refire.as_mut() {
            if timer.tick(delta).finished() {
                result.refire = Some(*action);
                self.refire = None;
            }
        }

        if let Some(timer) = self.reload_timer.as_mut() {
            if timer.tick(delta).finished() {
                self.reload_timer = None;
                result.reload_finished = true;
            }
        }

        result
    }
}

/// Владелец оружия (тело комбатанта)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeaponOwner(pub Entity);
