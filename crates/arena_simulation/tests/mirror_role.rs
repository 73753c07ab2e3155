//! Mirror: состояние боя не мутируется, только intent флаги и UI.

mod common;

use arena_simulation::*;
use bevy::prelude::*;
use common::{active_weapon, combatant, events, tick};

fn create_mirror() -> App {
    create_stepped_app(common::SEED, NetRole::Mirror, ArenaConfig::default())
}

/// На mirror тела приходят из репликации: спавним напрямую, без bind
fn replicated_npc(app: &mut App, team: TeamId) -> Entity {
    let config = app.world().resource::<ArenaConfig>().clone();
    let body = spawn_npc_body(&mut app.world_mut().commands(), Transform::default(), team, &config);
    app.world_mut().flush();
    body
}

#[test]
fn test_mirror_ignores_damage_requests() {
    let mut app = create_mirror();
    let body = replicated_npc(&mut app, TeamId(1));

    app.world_mut().send_event(DamageRequest {
        target: body,
        amount: 1_000.0,
        instigator: None,
    });
    tick(&mut app);

    assert!(combatant(&app, body).is_alive());
    assert_eq!(combatant(&app, body).current_hp(), 100.0);
    assert!(events::<CombatantDied>(&app).is_empty());
    assert!(app.world().resource::<MatchState>().team_scores().is_empty());
}

#[test]
fn test_mirror_fire_is_prediction_only() {
    let mut app = create_mirror();
    let body = replicated_npc(&mut app, TeamId(1));
    let ammo_before = active_weapon(&app, body).current_ammo();

    app.world_mut().send_event(WeaponCommand {
        holder: body,
        action: WeaponAction::StartFiring,
    });
    tick(&mut app);

    assert_eq!(events::<PredictedFire>(&app).len(), 1);
    assert!(active_weapon(&app, body).is_firing());
    assert_eq!(active_weapon(&app, body).current_ammo(), ammo_before);
    assert!(events::<ProjectileSpawned>(&app).is_empty());
}

#[test]
fn test_mirror_cannot_reload() {
    let mut app = create_mirror();
    let body = replicated_npc(&mut app, TeamId(1));

    app.world_mut().send_event(WeaponCommand {
        holder: body,
        action: WeaponAction::Reload,
    });
    tick(&mut app);

    assert!(!active_weapon(&app, body).is_reloading());
}

#[test]
fn test_mirror_match_clock_does_not_run() {
    let mut app = create_mirror();
    run_for_secs(&mut app, 2.0);

    assert!(events::<TimeRemaining>(&app).is_empty());
    assert!(!app.world().resource::<MatchState>().has_ended());
}

#[test]
fn test_mirror_viewer_applies_replicated_notifications() {
    let mut app = create_mirror();
    let viewer = spawn_player_controller(
        &mut app.world_mut().commands(),
        "Remote",
        TeamId(0),
        Transform::default(),
    );
    app.world_mut().flush();

    app.world_mut().send_event(ScoreChanged {
        team: TeamId(0),
        score: 4,
    });
    app.world_mut().send_event(ViewerOutcome {
        viewer,
        victory: true,
    });
    app.world_mut().send_event(TimeRemaining { seconds: 42.0 });
    tick(&mut app);

    // Тело игрока на mirror не спавнится (это делает authority)
    assert_eq!(common::pawn_of(&app, viewer), None);
    let ui = app.world().get::<Viewer>(viewer).map(|v| v.ui.clone()).unwrap_or_default();
    assert_eq!(ui.score(TeamId(0)), 4);
    assert_eq!(ui.outcome, Some(true));
    assert_eq!(ui.remaining_secs, Some(42.0));
}
