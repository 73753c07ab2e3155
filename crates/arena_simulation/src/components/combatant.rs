//! Combatant: HP, команда, death flags, respawn policy, body control.
//!
//! Общий для player- и NPC-тел. Вариант respawn'а задаётся при спавне
//! через `RespawnPolicy::strategy`, а не наследованием.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Команда (0-254). 255 = unassigned
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Serialize, Deserialize,
)]
pub struct TeamId(pub u8);

impl TeamId {
    pub const UNASSIGNED: TeamId = TeamId(255);

    pub fn is_assigned(self) -> bool {
        self != Self::UNASSIGNED
    }
}

impl Default for TeamId {
    fn default() -> Self {
        Self::UNASSIGNED
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_assigned() {
            write!(f, "team {}", self.0)
        } else {
            write!(f, "unassigned")
        }
    }
}

/// Боевой актор (тело игрока или NPC)
///
/// Инварианты:
/// - 0 ≤ current_hp ≤ max_hp
/// - is_dead ⟺ current_hp ≤ 0 (до respawn reset)
/// - is_invulnerable полностью блокирует урон
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Combatant {
    pub team: TeamId,
    current_hp: f32,
    max_hp: f32,
    is_dead: bool,
    is_invulnerable: bool,
    /// Контроллер, нанёсший последний принятый урон
    last_damage_source: Option<Entity>,
}

/// Результат `Combatant::apply_damage`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DamageOutcome {
    /// Сколько HP реально снято (0 если урон отклонён)
    pub applied: f32,
    /// Этот урон перевёл тело в Dead (первый раз)
    pub killed: bool,
}

impl Combatant {
    pub fn new(team: TeamId, max_hp: f32) -> Self {
        let max_hp = max_hp.max(1.0);
        Self {
            team,
            current_hp: max_hp,
            max_hp,
            is_dead: false,
            is_invulnerable: false,
            last_damage_source: None,
        }
    }

    pub fn current_hp(&self) -> f32 {
        self.current_hp
    }

    pub fn max_hp(&self) -> f32 {
        self.max_hp
    }

    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }

    pub fn is_invulnerable(&self) -> bool {
        self.is_invulnerable
    }

    pub fn set_invulnerable(&mut self, invulnerable: bool) {
        self.is_invulnerable = invulnerable;
    }

    pub fn last_damage_source(&self) -> Option<Entity> {
        self.last_damage_source
    }

    pub fn health_fraction(&self) -> f32 {
        (self.current_hp / self.max_hp).clamp(0.0, 1.0)
    }

    /// Урон (только authoritative side: гейтится системой)
    ///
    /// Dead / invulnerable / неположительный amount → отклонено, applied = 0.
    /// Instigator запоминается только если передан.
    pub fn apply_damage(&mut self, amount: f32, instigator: Option<Entity>) -> DamageOutcome {
        if self.is_dead || self.is_invulnerable || !amount.is_finite() || amount <= 0.0 {
            return DamageOutcome::default();
        }

        if instigator.is_some() {
            self.last_damage_source = instigator;
        }

        let before = self.current_hp;
        self.current_hp = (self.current_hp - amount).max(0.0);
        let applied = before - self.current_hp;

        let killed = self.current_hp <= 0.0 && self.mark_dead();

        DamageOutcome { applied, killed }
    }

    /// Переход в Dead. Idempotent: true только при первом вызове
    pub fn mark_dead(&mut self) -> bool {
        if self.is_dead {
            return false;
        }
        self.is_dead = true;
        self.current_hp = 0.0;
        true
    }

    /// Лечение (clamp к max_hp). Мёртвых не лечим
    pub fn heal(&mut self, amount: f32) -> f32 {
        if self.is_dead || !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let before = self.current_hp;
        self.current_hp = (self.current_hp + amount).min(self.max_hp);
        self.current_hp - before
    }

    /// Respawn in place: полное HP, снят death, instigator забыт
    pub fn reset_for_respawn(&mut self) {
        self.current_hp = self.max_hp;
        self.is_dead = false;
        self.last_damage_source = None;
    }
}

/// Что делать с телом после смерти
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum RespawnStrategy {
    /// Тело переиспользуется (NPC): reset HP, AI coordinator перепривязывается
    ResetInPlace,
    /// Тело уничтожается, контроллер спавнит новое (игрок)
    DestroyAndRecreate,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct RespawnPolicy {
    pub enabled: bool,
    pub delay_secs: f32,
    pub strategy: RespawnStrategy,
}

impl RespawnPolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            delay_secs: 0.0,
            strategy: RespawnStrategy::ResetInPlace,
        }
    }

    /// Respawn только при enabled И положительной задержке
    pub fn will_respawn(&self) -> bool {
        self.enabled && self.delay_secs > 0.0
    }
}

impl Default for RespawnPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Marker: тело мертво (для query фильтров)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Dead;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Default)]
pub enum CollisionProfile {
    #[default]
    Pawn,
    /// Труп: не блокирует трассы и снаряды
    Corpse,
}

/// Input / movement / collision тела
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct BodyControl {
    pub input_enabled: bool,
    pub movement_enabled: bool,
    pub collision: CollisionProfile,
}

impl Default for BodyControl {
    fn default() -> Self {
        Self {
            input_enabled: true,
            movement_enabled: true,
            collision: CollisionProfile::Pawn,
        }
    }
}

impl BodyControl {
    pub fn disable_for_death(&mut self) {
        self.input_enabled = false;
        self.movement_enabled = false;
        self.collision = CollisionProfile::Corpse;
    }

    pub fn restore(&mut self) {
        *self = Self::default();
    }

    /// Конец матча: тело живое и блокирует трассы, но input выключен
    pub fn freeze_input(&mut self) {
        self.input_enabled = false;
    }

    pub fn blocks_traces(&self) -> bool {
        self.collision == CollisionProfile::Pawn
    }
}

/// Подписчики (AI coordinators) на смерть этого тела
#[derive(Component, Debug, Clone, Default)]
pub struct DeathWatchers(Vec<Entity>);

impl DeathWatchers {
    /// Подписка ровно один раз. false если уже подписан
    pub fn subscribe(&mut self, watcher: Entity) -> bool {
        if self.0.contains(&watcher) {
            return false;
        }
        self.0.push(watcher);
        true
    }

    pub fn unsubscribe(&mut self, watcher: Entity) {
        self.0.retain(|w| *w != watcher);
    }

    pub fn watchers(&self) -> &[Entity] {
        &self.0
    }
}

/// Текущий контроллер тела (PlayerController или AiCoordinator)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PossessedBy(pub Entity);

/// Hit box тела (AABB вокруг Transform.translation)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct HitBox {
    pub half_extents: Vec3,
}

impl HitBox {
    pub fn bounds(&self, center: Vec3) -> (Vec3, Vec3) {
        (center - self.half_extents, center + self.half_extents)
    }
}

/// Высота глаз над центром тела (origin для aim трасс)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Eye {
    pub height: f32,
}
