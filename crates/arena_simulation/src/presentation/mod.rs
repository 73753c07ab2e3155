//! Presentation: события для UI/audio/animation и per-viewer UI state.
//!
//! Core пишет события, presentation только слушает.

use bevy::prelude::*;

pub mod events;
pub mod systems;
pub mod viewer;

pub use events::{
    AmmoChanged, CueKind, DeathScreen, DeathScreenHidden, HealthChanged, KillFeed, RecoilApplied,
    WeaponCue,
};
pub use viewer::{DeathScreenInfo, Viewer, ViewerUi, KILL_FEED_CAPACITY};

use crate::ArenaSet;

pub struct PresentationPlugin;

impl Plugin for PresentationPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<HealthChanged>()
            .add_event::<AmmoChanged>()
            .add_event::<WeaponCue>()
            .add_event::<RecoilApplied>()
            .add_event::<KillFeed>()
            .add_event::<DeathScreen>()
            .add_event::<DeathScreenHidden>();

        // Обе роли: на mirror события приходят из репликации
        app.add_systems(
            FixedUpdate,
            (
                systems::reset_on_restart,
                systems::show_scores,
                systems::show_kill_feed,
                systems::show_death_screens,
                systems::show_outcome,
                systems::show_pawn_status,
                systems::show_time_remaining,
            )
                .chain()
                .in_set(ArenaSet::Presentation),
        );
    }
}
