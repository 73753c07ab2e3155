//! Combat events: input → weapon → projectile → damage → death.

use bevy::prelude::*;

use super::weapon::{FiredRound, WeaponKind};
use crate::components::TeamId;

/// Input intent для оружия тела
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeaponCommand {
    pub holder: Entity,
    pub action: WeaponAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponAction {
    StartFiring,
    StopFiring,
    Reload,
    SwitchWeapon,
}

/// Выдать оружие (дубликаты по kind игнорируются)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddWeapon {
    pub holder: Entity,
    pub kind: WeaponKind,
}

/// Приказ AI телу NPC: начать/прекратить стрельбу
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShootingOrder {
    pub body: Entity,
    pub command: ShootingCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShootingCommand {
    Start { target: Entity },
    Stop,
}

/// Оружие выпустило патрон (authoritative). Дальше: aim + projectile
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotReleased {
    pub weapon: Entity,
    pub holder: Entity,
    pub round: FiredRound,
}

/// Spawn снаряда (world layer)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ProjectileSpawned {
    pub shooter: Entity,
    /// Контроллер стрелка на момент выстрела
    pub instigator: Option<Entity>,
    pub origin: Vec3,
    pub direction: Vec3,
    pub speed: f32,
    pub damage: f32,
}

/// Снаряд попал в тело (world layer → core)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ProjectileHit {
    pub shooter: Entity,
    pub instigator: Option<Entity>,
    pub target: Entity,
    pub damage: f32,
}

/// Запрос урона (обрабатывается только на authoritative side)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageRequest {
    pub target: Entity,
    pub amount: f32,
    pub instigator: Option<Entity>,
}

/// Запрос лечения (authoritative side). Мёртвых не лечит
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HealRequest {
    pub target: Entity,
    pub amount: f32,
}

/// Шум выстрела для perception layer
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct NoiseEmitted {
    pub source: Entity,
    pub position: Vec3,
    pub loudness: f32,
    pub range: f32,
}

/// Mirror: локально предсказанный выстрел (только косметика)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictedFire {
    pub holder: Entity,
}

/// HP тела упало до нуля (первый раз). Внутреннее: damage → death resolution
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatantKilled {
    pub body: Entity,
}

/// Смерть обработана (scoring, timers). Подписчики: AI coordinators
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct CombatantDied {
    pub body: Entity,
    pub team: TeamId,
    pub killer: Option<Entity>,
    /// Захвачено до unbind'а: тело вернётся через respawn
    pub will_respawn: bool,
    pub watchers: Vec<Entity>,
}

/// Тело воскрешено in place
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct BodyRespawned {
    pub body: Entity,
    pub watchers: Vec<Entity>,
}

/// Остановить движение тела (navigation layer)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopMovement {
    pub body: Entity,
}
