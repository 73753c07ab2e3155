//! Scoring module: очки команд, victory conditions, match clock, рестарт.
//!
//! Authoritative-only. Viewer'ы получают ScoreChanged / ViewerOutcome /
//! TimeRemaining через presentation.

use bevy::prelude::*;

pub mod events;
pub mod state;
pub mod systems;

#[cfg(test)]
mod state_tests;

pub use events::{
    MatchEnded, MatchRestarted, RestartMatch, ScoreChanged, TimeRemaining, ViewerOutcome,
};
pub use state::{
    ClockTick, MatchOutcome, MatchRules, MatchState, PlayerStats, ScoreUpdate, TeamScore,
    VictoryReason,
};

use crate::authority::is_authority;
use crate::ArenaSet;

pub struct MatchPlugin;

impl Plugin for MatchPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ScoreChanged>()
            .add_event::<MatchEnded>()
            .add_event::<ViewerOutcome>()
            .add_event::<TimeRemaining>()
            .add_event::<RestartMatch>()
            .add_event::<MatchRestarted>();

        app.add_systems(
            FixedUpdate,
            (
                systems::tick_match_clock,
                systems::apply_match_end,
                systems::restart_match,
            )
                .chain()
                .in_set(ArenaSet::Match)
                .run_if(is_authority),
        );
    }
}
