//! Arena tuning: HP, respawn, aim, правила матча.
//!
//! Всё с `Default` (значения по умолчанию = поведение стандартной арены).
//! Можно загрузить из JSON: недостающие поля берутся из defaults.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::aim::AimTuning;
use crate::combat::weapon::WeaponKind;
use crate::components::{RespawnPolicy, RespawnStrategy};
use crate::scoring::MatchRules;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse arena config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid arena config: {0}")]
    Invalid(String),
}

/// Параметры одного вида тела (игрок / NPC)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatantTuning {
    pub max_hp: f32,
    /// Окно неуязвимости после (re)spawn'а (секунды)
    pub invulnerability_secs: f32,
    pub respawn: RespawnPolicy,
    /// Высота глаз над центром тела (метры)
    pub eye_height: f32,
    pub hit_box_half_extents: [f32; 3],
}

impl CombatantTuning {
    pub fn player() -> Self {
        Self {
            max_hp: 500.0,
            invulnerability_secs: 3.0,
            respawn: RespawnPolicy {
                enabled: true,
                delay_secs: 5.0,
                strategy: RespawnStrategy::DestroyAndRecreate,
            },
            eye_height: 0.7,
            hit_box_half_extents: [0.4, 0.9, 0.4],
        }
    }

    pub fn npc() -> Self {
        Self {
            max_hp: 100.0,
            invulnerability_secs: 0.0,
            respawn: RespawnPolicy::disabled(),
            eye_height: 0.7,
            hit_box_half_extents: [0.4, 0.9, 0.4],
        }
    }
}

impl Default for CombatantTuning {
    fn default() -> Self {
        Self::npc()
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub rules: MatchRules,
    pub player: CombatantTuning,
    pub npc: CombatantTuning,
    pub npc_aim: AimTuning,
    /// Дальность aim трассы игрока (метры)
    pub player_max_aim_distance: f32,
    /// Задержка уничтожения тела без respawn'а (секунды)
    pub deferred_destruction_secs: f32,
    pub projectile_lifetime_secs: f32,
    /// Первое оружие активно
    pub player_loadout: Vec<WeaponKind>,
    pub npc_weapon: WeaponKind,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            rules: MatchRules::default(),
            player: CombatantTuning::player(),
            npc: CombatantTuning::npc(),
            npc_aim: AimTuning::default(),
            player_max_aim_distance: 100.0,
            deferred_destruction_secs: 5.0,
            projectile_lifetime_secs: 3.0,
            player_loadout: vec![WeaponKind::Rifle, WeaponKind::Pistol],
            npc_weapon: WeaponKind::Pistol,
        }
    }
}

impl ArenaConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ArenaConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (label, tuning) in [("player", &self.player), ("npc", &self.npc)] {
            if !(tuning.max_hp > 0.0) {
                return Err(ConfigError::Invalid(format!("{label}.max_hp must be positive")));
            }
            if tuning.hit_box_half_extents.iter().any(|e| !(*e > 0.0)) {
                return Err(ConfigError::Invalid(format!(
                    "{label}.hit_box_half_extents must be positive"
                )));
            }
        }
        if self.rules.target_score == 0 {
            return Err(ConfigError::Invalid("rules.target_score must be at least 1".into()));
        }
        if self.player_loadout.is_empty() {
            return Err(ConfigError::Invalid("player_loadout must not be empty".into()));
        }
        if !(self.npc_aim.aim_range > 0.0) || !(self.player_max_aim_distance > 0.0) {
            return Err(ConfigError::Invalid("aim distances must be positive".into()));
        }
        Ok(())
    }
}
