//! Match-level events.

use bevy::prelude::*;

use super::state::MatchOutcome;
use crate::components::TeamId;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreChanged {
    pub team: TeamId,
    pub score: u32,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct MatchEnded {
    pub outcome: MatchOutcome,
}

/// Per-viewer: победила ли его команда
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerOutcome {
    pub viewer: Entity,
    pub victory: bool,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct TimeRemaining {
    pub seconds: f32,
}

/// Запрос ручного рестарта матча (authoritative)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RestartMatch;

/// Матч перезапущен: UI сбрасывается
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchRestarted;
