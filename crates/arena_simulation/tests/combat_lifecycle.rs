//! Combat lifecycle: смерть, respawn, invulnerability, deferred destruction
//!
//! Всё на stepped App: время двигаем руками, таймеры детерминированы.

mod common;

use arena_simulation::*;
use bevy::prelude::*;
use common::*;

#[test]
fn test_npc_respawns_in_place_after_delay() {
    let mut app = create_arena(respawning_npcs(5.0));
    let (killer, _) = spawn_bound_npc(&mut app, "Killer", TeamId(0), Vec3::new(0.0, 1.0, -10.0));
    let (_, victim) = spawn_bound_npc(&mut app, "Victim", TeamId(1), Vec3::new(0.0, 1.0, 10.0));

    kill(&mut app, victim, Some(killer));

    assert!(combatant(&app, victim).is_dead());
    assert!(app.world().get::<Dead>(victim).is_some());
    let control = app.world().get::<BodyControl>(victim).copied().unwrap_or_default();
    assert!(!control.input_enabled && !control.movement_enabled);
    assert!(!control.blocks_traces(), "Труп не должен блокировать трассы");
    assert!(events::<StopMovement>(&app).iter().any(|e| e.body == victim));

    run_for_secs(&mut app, 4.8);
    assert!(combatant(&app, victim).is_dead(), "Respawn раньше 5 секунд");

    run_for_secs(&mut app, 0.3);
    let respawned = combatant(&app, victim);
    assert!(respawned.is_alive());
    assert_eq!(respawned.current_hp(), respawned.max_hp());
    assert!(app.world().get::<Dead>(victim).is_none());
    assert!(app
        .world()
        .get::<BodyControl>(victim)
        .is_some_and(BodyControl::blocks_traces));
    assert!(events::<BodyRespawned>(&app).iter().any(|e| e.body == victim));
    assert!(active_weapon(&app, victim).is_active());
}

#[test]
fn test_spawn_invulnerability_rejects_damage() {
    let mut config = ArenaConfig::default();
    config.npc.invulnerability_secs = 2.0;
    let mut app = create_arena(config);
    let (_, body) = spawn_bound_npc(&mut app, "Fresh", TeamId(1), Vec3::ZERO);

    hit(&mut app, body, 50.0, None);
    assert!(combatant(&app, body).is_invulnerable());
    assert_eq!(combatant(&app, body).current_hp(), 100.0);

    run_for_secs(&mut app, 2.1);
    hit(&mut app, body, 50.0, None);
    assert!(!combatant(&app, body).is_invulnerable());
    assert_eq!(combatant(&app, body).current_hp(), 50.0);
}

#[test]
fn test_dead_body_ignores_further_damage() {
    let mut app = create_arena(respawning_npcs(5.0));
    let (killer, _) = spawn_bound_npc(&mut app, "Killer", TeamId(0), Vec3::new(0.0, 1.0, -10.0));
    let (_, victim) = spawn_bound_npc(&mut app, "Victim", TeamId(1), Vec3::new(0.0, 1.0, 10.0));

    kill(&mut app, victim, Some(killer));
    kill(&mut app, victim, Some(killer));

    let deaths = events::<CombatantDied>(&app)
        .iter()
        .filter(|e| e.body == victim)
        .count();
    assert_eq!(deaths, 1, "Повторный урон по трупу не должен убивать второй раз");
    assert_eq!(
        app.world().resource::<MatchState>().team_score(TeamId(0)),
        Some(1)
    );
}

/// Повторный CombatantKilled по уже мёртвому телу: ни очков, ни нового таймера
#[test]
fn test_repeated_kill_notice_resolves_death_once() {
    let mut app = create_arena(respawning_npcs(5.0));
    let (killer, _) = spawn_bound_npc(&mut app, "Killer", TeamId(0), Vec3::new(0.0, 1.0, -10.0));
    let (_, victim) = spawn_bound_npc(&mut app, "Victim", TeamId(1), Vec3::new(0.0, 1.0, 10.0));

    kill(&mut app, victim, Some(killer));
    run_for_secs(&mut app, 1.0);
    app.world_mut().send_event(CombatantKilled { body: victim });
    tick(&mut app);

    let deaths = events::<CombatantDied>(&app)
        .iter()
        .filter(|e| e.body == victim)
        .count();
    assert_eq!(deaths, 1);
    assert_eq!(
        app.world().resource::<MatchState>().team_score(TeamId(0)),
        Some(1)
    );
    assert_eq!(events::<ScoreChanged>(&app).len(), 1);
    assert_eq!(events::<presentation::KillFeed>(&app).len(), 1);

    // Respawn таймер не перезапущен: тело встаёт через 5 с после первой смерти
    run_for_secs(&mut app, 4.2);
    assert!(combatant(&app, victim).is_alive());
}

#[test]
fn test_double_kill_notice_in_one_tick() {
    let mut app = create_arena(ArenaConfig::default());
    let (_, body) = spawn_bound_npc(&mut app, "Target", TeamId(1), Vec3::ZERO);

    app.world_mut().send_event(CombatantKilled { body });
    app.world_mut().send_event(CombatantKilled { body });
    tick(&mut app);

    assert!(combatant(&app, body).is_dead());
    assert_eq!(events::<CombatantDied>(&app).len(), 1);
    assert_eq!(events::<presentation::KillFeed>(&app).len(), 1);
    let pending = app
        .world()
        .get::<LifecycleTimers>(body)
        .and_then(LifecycleTimers::pending_post_death);
    assert_eq!(pending, Some(PostDeathKind::Destroy));
}

#[test]
fn test_heal_request_clamps_to_max_and_skips_dead() {
    let mut app = create_arena(ArenaConfig::default());
    let (_, body) = spawn_bound_npc(&mut app, "Medic", TeamId(0), Vec3::ZERO);

    hit(&mut app, body, 30.0, None);
    assert_eq!(combatant(&app, body).current_hp(), 70.0);

    app.world_mut().send_event(HealRequest {
        target: body,
        amount: 500.0,
    });
    tick(&mut app);
    assert_eq!(combatant(&app, body).current_hp(), 100.0);
    let last = events::<presentation::HealthChanged>(&app)
        .into_iter()
        .filter(|e| e.body == body)
        .last();
    assert_eq!(last.map(|e| e.fraction), Some(1.0));

    kill(&mut app, body, None);
    let notices_before = events::<presentation::HealthChanged>(&app).len();
    app.world_mut().send_event(HealRequest {
        target: body,
        amount: 50.0,
    });
    tick(&mut app);

    assert!(combatant(&app, body).is_dead());
    assert_eq!(combatant(&app, body).current_hp(), 0.0);
    assert_eq!(events::<presentation::HealthChanged>(&app).len(), notices_before);
}

#[test]
fn test_deferred_destruction_despawns_body_and_weapons() {
    let mut app = create_arena(ArenaConfig::default());
    let (killer, _) = spawn_bound_npc(&mut app, "Killer", TeamId(0), Vec3::new(0.0, 1.0, -10.0));
    let (_, victim) = spawn_bound_npc(&mut app, "Victim", TeamId(1), Vec3::new(0.0, 1.0, 10.0));
    let weapons: Vec<Entity> = app
        .world()
        .get::<Loadout>(victim)
        .map(|l| l.owned().to_vec())
        .unwrap_or_default();
    assert!(!weapons.is_empty());

    kill(&mut app, victim, Some(killer));

    run_for_secs(&mut app, 4.8);
    assert!(exists(&app, victim), "Тело уничтожено раньше срока");

    run_for_secs(&mut app, 0.3);
    assert!(!exists(&app, victim));
    for weapon in weapons {
        assert!(!exists(&app, weapon), "Оружие {weapon:?} пережило владельца");
    }
}

#[test]
fn test_player_recreated_with_fresh_invulnerable_body() {
    let mut app = create_arena(ArenaConfig::default());
    let (killer, _) = spawn_bound_npc(&mut app, "Bot", TeamId(1), Vec3::new(0.0, 1.0, 20.0));
    let player = spawn_player(&mut app, "Alice", TeamId(0), Vec3::new(0.0, 1.0, -20.0));

    let first_body = pawn_of(&app, player).unwrap_or_else(|| panic!("player has no pawn"));
    assert_eq!(combatant(&app, first_body).max_hp(), 500.0);
    assert!(combatant(&app, first_body).is_invulnerable());

    run_for_secs(&mut app, 3.1);
    assert!(!combatant(&app, first_body).is_invulnerable());

    kill(&mut app, first_body, Some(killer));
    assert!(combatant(&app, first_body).is_dead());
    let ui = &app.world().get::<Viewer>(player).map(|v| v.ui.clone()).unwrap_or_default();
    let death_screen = ui.death_screen.clone().unwrap_or_else(|| panic!("no death screen"));
    assert_eq!(death_screen.killer_name, "Bot");
    assert_eq!(death_screen.respawn_secs, 5.0);
    assert_eq!(ui.ammo, (0, 0));

    run_for_secs(&mut app, 5.1);

    assert!(!exists(&app, first_body));
    let second_body = pawn_of(&app, player).unwrap_or_else(|| panic!("player was not re-spawned"));
    assert_ne!(second_body, first_body);
    let fresh = combatant(&app, second_body);
    assert!(fresh.is_alive());
    assert_eq!(fresh.current_hp(), 500.0);
    assert!(fresh.is_invulnerable());
    assert_eq!(fresh.team, TeamId(0));

    let ui = app.world().get::<Viewer>(player).map(|v| v.ui.clone()).unwrap_or_default();
    assert!(ui.death_screen.is_none());
    assert_eq!(ui.health_fraction, 1.0);

    let stats = app
        .world()
        .resource::<MatchState>()
        .player_stats(player)
        .cloned()
        .unwrap_or_default();
    assert_eq!(stats.deaths, 1);
    assert_eq!(stats.name, "Alice");
}

#[test]
fn test_reload_refills_magazine_after_reload_time() {
    let mut app = create_arena(ArenaConfig::default());
    let player = spawn_player(&mut app, "Alice", TeamId(0), Vec3::ZERO);
    let body = pawn_of(&app, player).unwrap_or_else(|| panic!("player has no pawn"));

    // Rifle: full-auto, магазин 30, refire 0.1s
    app.world_mut().send_event(WeaponCommand {
        holder: body,
        action: WeaponAction::StartFiring,
    });
    run_for_secs(&mut app, 0.5);
    app.world_mut().send_event(WeaponCommand {
        holder: body,
        action: WeaponAction::StopFiring,
    });
    tick(&mut app);

    let fired = 30 - active_weapon(&app, body).current_ammo();
    assert!(fired >= 4, "Full-auto выпустил только {fired}");
    assert!(!events::<ProjectileSpawned>(&app).is_empty());

    app.world_mut().send_event(WeaponCommand {
        holder: body,
        action: WeaponAction::Reload,
    });
    tick(&mut app);
    assert!(active_weapon(&app, body).is_reloading());

    // Во время reload спуск не срабатывает
    app.world_mut().send_event(WeaponCommand {
        holder: body,
        action: WeaponAction::StartFiring,
    });
    tick(&mut app);
    assert!(!active_weapon(&app, body).is_firing());

    run_for_secs(&mut app, 2.1);
    let weapon = active_weapon(&app, body);
    assert!(!weapon.is_reloading());
    assert_eq!(weapon.current_ammo(), 30);
}

#[test]
fn test_switch_weapon_cycles_loadout() {
    let mut app = create_arena(ArenaConfig::default());
    let player = spawn_player(&mut app, "Alice", TeamId(0), Vec3::ZERO);
    let body = pawn_of(&app, player).unwrap_or_else(|| panic!("player has no pawn"));
    assert_eq!(active_weapon(&app, body).kind, WeaponKind::Rifle);

    app.world_mut().send_event(WeaponCommand {
        holder: body,
        action: WeaponAction::SwitchWeapon,
    });
    tick(&mut app);
    assert_eq!(active_weapon(&app, body).kind, WeaponKind::Pistol);

    // Дубликат по kind не выдаётся
    app.world_mut().send_event(AddWeapon {
        holder: body,
        kind: WeaponKind::Rifle,
    });
    tick(&mut app);
    let owned = app.world().get::<Loadout>(body).map(|l| l.owned().len());
    assert_eq!(owned, Some(2));
}
