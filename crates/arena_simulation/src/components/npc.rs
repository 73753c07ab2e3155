//! NPC gunner: состояние стрельбы тела под AI.

use bevy::prelude::*;

use crate::aim::AimTuning;

/// Тело под управлением AI.
///
/// `is_shooting`: приказ AI "стрелять", не путать с `Weapon::is_firing`:
/// semi-auto оружие между выстрелами не firing, но NPC всё ещё shooting.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct NpcGunner {
    pub aim: AimTuning,
    pub is_shooting: bool,
    pub aim_target: Option<Entity>,
}

impl NpcGunner {
    pub fn new(aim: AimTuning) -> Self {
        Self {
            aim,
            is_shooting: false,
            aim_target: None,
        }
    }

    pub fn start_shooting(&mut self, target: Entity) {
        self.aim_target = Some(target);
        self.is_shooting = true;
    }

    pub fn stop_shooting(&mut self) {
        self.is_shooting = false;
    }

    pub fn reset(&mut self) {
        self.is_shooting = false;
        self.aim_target = None;
    }
}
