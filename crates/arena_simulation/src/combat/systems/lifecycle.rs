//! Lifecycle: invulnerability expiry, respawn / deferred destruction,
//! player re-spawn, осиротевшее оружие.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::arena::spawn_player_body;
use crate::combat::events::BodyRespawned;
use crate::combat::loadout::Loadout;
use crate::combat::weapon::{Weapon, WeaponOwner};
use crate::components::{
    BodyControl, Combatant, Dead, DeathWatchers, LifecycleTimers, NpcGunner, PlayerController,
    PlayerPilot, PostDeathKind, RespawnPolicy, RespawnStrategy,
};
use crate::config::ArenaConfig;
use crate::logger;
use crate::presentation::{AmmoChanged, DeathScreenHidden, HealthChanged};
use crate::scoring::MatchState;

#[derive(SystemParam)]
pub struct LifecycleNotices<'w> {
    health: EventWriter<'w, HealthChanged>,
    ammo: EventWriter<'w, AmmoChanged>,
    respawned: EventWriter<'w, BodyRespawned>,
    death_screen_hidden: EventWriter<'w, DeathScreenHidden>,
}

type LifecycleBody = (
    Entity,
    &'static mut Combatant,
    &'static mut LifecycleTimers,
    &'static RespawnPolicy,
    &'static mut BodyControl,
    Option<&'static Loadout>,
    Option<&'static DeathWatchers>,
    Option<&'static PlayerPilot>,
    Option<&'static mut NpcGunner>,
);

/// Despawn тела вместе со всем его оружием
fn despawn_body(commands: &mut Commands, body: Entity, loadout: Option<&Loadout>) {
    if let Some(loadout) = loadout {
        for weapon in loadout.owned() {
            if let Ok(mut weapon_commands) = commands.get_entity(*weapon) {
                weapon_commands.try_despawn();
            }
        }
    }
    if let Ok(mut body_commands) = commands.get_entity(body) {
        body_commands.try_despawn();
    }
}

pub fn tick_lifecycle_timers(
    mut bodies: Query<LifecycleBody>,
    mut weapons: Query<&mut Weapon>,
    mut controllers: Query<&mut PlayerController>,
    match_state: Res<MatchState>,
    time: Res<Time>,
    mut notices: LifecycleNotices,
    mut commands: Commands,
) {
    let delta = time.delta();

    for (body, mut combatant, mut timers, policy, mut control, loadout, watchers, pilot, gunner) in
        bodies.iter_mut()
    {
        let tick = timers.tick(delta);

        if tick.invulnerability_expired {
            combatant.set_invulnerable(false);
            logger::log(&format!("🛡️ {:?}: spawn protection expired", body));
        }

        match tick.post_death {
            None => {}
            Some(PostDeathKind::Destroy) => {
                logger::log_info(&format!("⚰️ {:?}: deferred destruction", body));
                despawn_body(&mut commands, body, loadout);
            }
            Some(PostDeathKind::Respawn) => match policy.strategy {
                RespawnStrategy::ResetInPlace => {
                    combatant.reset_for_respawn();
                    control.restore();
                    if match_state.has_ended() {
                        control.freeze_input();
                    }
                    if timers.start_spawn_protection() {
                        combatant.set_invulnerable(true);
                    }
                    if let Ok(mut body_commands) = commands.get_entity(body) {
                        body_commands.try_remove::<Dead>();
                    }

                    if let Some(mut weapon) = loadout
                        .and_then(Loadout::active)
                        .and_then(|w| weapons.get_mut(w).ok())
                    {
                        let (current, magazine) = weapon.activate();
                        notices.ammo.write(AmmoChanged {
                            holder: body,
                            current,
                            magazine,
                        });
                    }
                    if let Some(mut gunner) = gunner {
                        gunner.reset();
                    }

                    notices.health.write(HealthChanged {
                        body,
                        fraction: combatant.health_fraction(),
                    });
                    notices.respawned.write(BodyRespawned {
                        body,
                        watchers: watchers.map(|w| w.watchers().to_vec()).unwrap_or_default(),
                    });
                    logger::log_info(&format!("✨ {:?} respawned in place", body));
                }
                RespawnStrategy::DestroyAndRecreate => {
                    despawn_body(&mut commands, body, loadout);
                    if let Some(pilot) = pilot {
                        if let Ok(mut controller) = controllers.get_mut(pilot.controller) {
                            if controller.pawn == Some(body) {
                                controller.pawn = None;
                            }
                        }
                        notices.death_screen_hidden.write(DeathScreenHidden {
                            controller: pilot.controller,
                        });
                    }
                    logger::log_info(&format!("✨ {:?} destroyed for re-spawn", body));
                }
            },
        }
    }
}

/// Контроллер без тела → новое тело в spawn point
pub fn spawn_missing_player_pawns(
    mut controllers: Query<(Entity, &mut PlayerController)>,
    config: Res<ArenaConfig>,
    mut health: EventWriter<HealthChanged>,
    mut commands: Commands,
) {
    for (controller_entity, mut controller) in controllers.iter_mut() {
        if controller.pawn.is_some() {
            continue;
        }
        let body = spawn_player_body(&mut commands, controller_entity, &controller, &config);
        controller.pawn = Some(body);
        health.write(HealthChanged {
            body,
            fraction: 1.0,
        });
        logger::log_info(&format!("🧍 {} spawned body {:?}", controller.name, body));
    }
}

/// Оружие, чей владелец исчез, уходит вместе с ним
pub fn despawn_orphaned_weapons(
    weapons: Query<(Entity, &WeaponOwner)>,
    owners: Query<(), With<Combatant>>,
    mut commands: Commands,
) {
    for (weapon, owner) in weapons.iter() {
        if !owners.contains(owner.0) {
            if let Ok(mut weapon_commands) = commands.get_entity(weapon) {
                weapon_commands.try_despawn();
            }
        }
    }
}
