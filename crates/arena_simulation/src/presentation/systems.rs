//! Подписчики: события → ViewerUi. Обе роли.

use bevy::prelude::*;

use super::events::{AmmoChanged, DeathScreen, DeathScreenHidden, HealthChanged, KillFeed};
use super::viewer::{DeathScreenInfo, Viewer};
use crate::components::PlayerController;
use crate::scoring::{MatchRestarted, ScoreChanged, TimeRemaining, ViewerOutcome};

pub fn show_scores(mut scores: EventReader<ScoreChanged>, mut viewers: Query<&mut Viewer>) {
    for event in scores.read() {
        for mut viewer in viewers.iter_mut() {
            viewer.ui.set_score(event.team, event.score);
        }
    }
}

pub fn show_kill_feed(mut feed: EventReader<KillFeed>, mut viewers: Query<&mut Viewer>) {
    for event in feed.read() {
        for mut viewer in viewers.iter_mut() {
            viewer.ui.push_kill(&event.killer_name, &event.victim_name);
        }
    }
}

pub fn show_death_screens(
    mut shown: EventReader<DeathScreen>,
    mut hidden: EventReader<DeathScreenHidden>,
    mut viewers: Query<&mut Viewer>,
) {
    for event in shown.read() {
        if let Ok(mut viewer) = viewers.get_mut(event.controller) {
            viewer.ui.death_screen = Some(DeathScreenInfo {
                killer_name: event.killer_name.clone(),
                respawn_secs: event.respawn_secs,
            });
        }
    }
    for event in hidden.read() {
        if let Ok(mut viewer) = viewers.get_mut(event.controller) {
            viewer.ui.death_screen = None;
        }
    }
}

pub fn show_outcome(mut outcomes: EventReader<ViewerOutcome>, mut viewers: Query<&mut Viewer>) {
    for event in outcomes.read() {
        if let Ok(mut viewer) = viewers.get_mut(event.viewer) {
            viewer.ui.outcome = Some(event.victory);
        }
    }
}

/// HP/ammo только своего текущего тела
pub fn show_pawn_status(
    mut health: EventReader<HealthChanged>,
    mut ammo: EventReader<AmmoChanged>,
    mut viewers: Query<(&PlayerController, &mut Viewer)>,
) {
    for event in health.read() {
        for (controller, mut viewer) in viewers.iter_mut() {
            if controller.pawn == Some(event.body) {
                viewer.ui.health_fraction = event.fraction;
            }
        }
    }
    for event in ammo.read() {
        for (controller, mut viewer) in viewers.iter_mut() {
            if controller.pawn == Some(event.holder) {
                viewer.ui.ammo = (event.current, event.magazine);
            }
        }
    }
}

pub fn show_time_remaining(
    mut remaining: EventReader<TimeRemaining>,
    mut viewers: Query<&mut Viewer>,
) {
    let Some(event) = remaining.read().last() else {
        return;
    };
    for mut viewer in viewers.iter_mut() {
        viewer.ui.remaining_secs = Some(event.seconds);
    }
}

pub fn reset_on_restart(mut restarted: EventReader<MatchRestarted>, mut viewers: Query<&mut Viewer>) {
    if restarted.read().count() == 0 {
        return;
    }
    for mut viewer in viewers.iter_mut() {
        viewer.ui.reset();
    }
}
