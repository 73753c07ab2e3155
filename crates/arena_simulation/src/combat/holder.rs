//! WeaponHolder: что оружию нужно от владельца.
//!
//! Реализуют оба варианта тела: `PlayerPilot` и `NpcGunner`.

use bevy::prelude::*;
use rand::RngCore;

use crate::aim::{resolve_fire_target, resolve_pilot_target, AimSource, LineTracer};
use crate::components::{NpcGunner, PlayerPilot};

pub trait WeaponHolder {
    /// Куда летит выстрел
    fn weapon_target_location(
        &self,
        source: &AimSource,
        target: Option<Vec3>,
        tracer: &dyn LineTracer,
        ignore: Option<Entity>,
        rng: &mut dyn RngCore,
    ) -> Vec3;

    /// Semi-auto cooldown истёк. true → holder снова жмёт спуск
    fn on_semi_auto_refire(&self) -> bool;

    /// Отдача (pitch, градусы) для presentation. None = holder без отдачи
    fn recoil(&self, weapon_recoil: f32) -> Option<f32>;

    /// Отслеживаемая цель (если есть)
    fn aim_target(&self) -> Option<Entity>;
}

impl WeaponHolder for PlayerPilot {
    fn weapon_target_location(
        &self,
        source: &AimSource,
        _target: Option<Vec3>,
        tracer: &dyn LineTracer,
        ignore: Option<Entity>,
        _rng: &mut dyn RngCore,
    ) -> Vec3 {
        resolve_pilot_target(source, self.max_aim_distance, tracer, ignore)
    }

    fn on_semi_auto_refire(&self) -> bool {
        // Игрок жмёт спуск сам
        false
    }

    fn recoil(&self, weapon_recoil: f32) -> Option<f32> {
        Some(weapon_recoil)
    }

    fn aim_target(&self) -> Option<Entity> {
        None
    }
}

impl WeaponHolder for NpcGunner {
    fn weapon_target_location(
        &self,
        source: &AimSource,
        target: Option<Vec3>,
        tracer: &dyn LineTracer,
        ignore: Option<Entity>,
        rng: &mut dyn RngCore,
    ) -> Vec3 {
        resolve_fire_target(source, target, &self.aim, tracer, ignore, rng)
    }

    fn on_semi_auto_refire(&self) -> bool {
        self.is_shooting
    }

    fn recoil(&self, _weapon_recoil: f32) -> Option<f32> {
        None
    }

    fn aim_target(&self) -> Option<Entity> {
        self.aim_target
    }
}

/// Выбрать holder из опциональных компонентов тела
pub fn as_weapon_holder<'a>(
    pilot: Option<&'a PlayerPilot>,
    gunner: Option<&'a NpcGunner>,
) -> Option<&'a dyn WeaponHolder> {
    match (pilot, gunner) {
        (Some(pilot), _) => Some(pilot as &dyn WeaponHolder),
        (None, Some(gunner)) => Some(gunner as &dyn WeaponHolder),
        (None, None) => None,
    }
}
