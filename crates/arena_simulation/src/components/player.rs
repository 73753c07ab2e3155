//! Player-side components: контроллер (переживает тела) и pilot на теле.

use bevy::prelude::*;

use super::combatant::TeamId;

/// Контроллер игрока. Живёт весь матч, тела (pawn) приходят и уходят.
///
/// `pawn == None` → lifecycle система спавнит новое тело в `spawn_point`.
#[derive(Component, Debug, Clone)]
pub struct PlayerController {
    pub name: String,
    pub team: TeamId,
    pub pawn: Option<Entity>,
    pub spawn_point: Transform,
    /// Главный выключатель input игрока: тела его наследуют, weapon intents проверяют
    pub input_enabled: bool,
}

impl PlayerController {
    pub fn new(name: impl Into<String>, team: TeamId, spawn_point: Transform) -> Self {
        Self {
            name: name.into(),
            team,
            pawn: None,
            spawn_point,
            input_enabled: true,
        }
    }
}

/// Тело под управлением игрока
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct PlayerPilot {
    pub controller: Entity,
    /// Дальность aim трассы (метры)
    pub max_aim_distance: f32,
}
