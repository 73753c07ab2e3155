//! Presentation notifications (core → UI/audio/animation).

use bevy::prelude::*;

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HealthChanged {
    pub body: Entity,
    pub fraction: f32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmmoChanged {
    pub holder: Entity,
    pub current: u32,
    pub magazine: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueKind {
    Fire,
    Reload,
}

/// Анимация/звук оружия
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeaponCue {
    pub holder: Entity,
    pub cue: CueKind,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct RecoilApplied {
    pub holder: Entity,
    pub pitch_degrees: f32,
}

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct KillFeed {
    pub killer_name: String,
    pub victim_name: String,
}

/// Показать death screen контроллеру игрока
#[derive(Event, Debug, Clone, PartialEq)]
pub struct DeathScreen {
    pub controller: Entity,
    pub killer_name: String,
    pub respawn_secs: f32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeathScreenHidden {
    pub controller: Entity,
}
