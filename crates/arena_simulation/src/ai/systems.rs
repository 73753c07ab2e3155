//! AI systems: possession, death/respawn handoff, perception forwarding,
//! built-in behaviour.

use bevy::prelude::*;

use super::coordinator::{AiCoordinator, BehaviorState, DeathHandoff, RebindPath};
use super::events::{BehaviorStimulus, PerceptionEvent, PossessBody, Stimulus};
use crate::combat::events::{
    BodyRespawned, CombatantDied, ShootingCommand, ShootingOrder, StopMovement, WeaponAction,
    WeaponCommand,
};
use crate::combat::loadout::Loadout;
use crate::combat::systems::halt_active_weapon;
use crate::combat::weapon::Weapon;
use crate::components::{Combatant, DeathWatchers, NpcGunner, PossessedBy};
use crate::logger;
use crate::scoring::MatchState;

type BindableBody = (
    &'static mut Combatant,
    &'static mut DeathWatchers,
    Option<&'static PossessedBy>,
    Option<&'static mut NpcGunner>,
);

/// Bind с валидацией тела. false → coordinator остаётся unbound.
/// После конца матча тело привязывается, но логика не стартует
fn try_bind(
    coordinator_entity: Entity,
    coordinator: &mut AiCoordinator,
    body: Entity,
    match_over: bool,
    bodies: &mut Query<BindableBody>,
    commands: &mut Commands,
) -> bool {
    let Ok((combatant, _, possessed, _)) = bodies.get(body) else {
        logger::log_warning(&format!(
            "⚠️ {} cannot bind {:?}: body does not exist",
            coordinator.name, body
        ));
        return false;
    };

    if combatant.is_dead() {
        logger::log_warning(&format!(
            "⚠️ {} cannot bind {:?}: body is dead",
            coordinator.name, body
        ));
        return false;
    }

    if let Some(PossessedBy(other)) = possessed {
        if *other != coordinator_entity {
            logger::log_warning(&format!(
                "⚠️ {} cannot bind {:?}: already possessed by {:?}",
                coordinator.name, body, other
            ));
            return false;
        }
    }

    // Отпускаем прошлое тело, если переезжаем
    if let Some(previous) = coordinator.controlled_body() {
        if previous != body {
            if let Ok((_, mut watchers, _, _)) = bodies.get_mut(previous) {
                watchers.unsubscribe(coordinator_entity);
            }
            if let Ok(mut previous_commands) = commands.get_entity(previous) {
                previous_commands.try_remove::<PossessedBy>();
            }
        }
    }

    if let Ok((mut combatant, mut watchers, _, gunner)) = bodies.get_mut(body) {
        combatant.team = coordinator.team_tag;
        watchers.subscribe(coordinator_entity);
        if let Some(mut gunner) = gunner {
            gunner.reset();
        }
    }
    if let Ok(mut body_commands) = commands.get_entity(body) {
        body_commands.try_insert(PossessedBy(coordinator_entity));
    }

    coordinator.bind(body);
    if match_over {
        coordinator.stop_for_match_end();
        logger::log(&format!(
            "🏁 {} bound {:?} after match end, logic stays stopped",
            coordinator.name, body
        ));
        return true;
    }
    logger::log(&format!(
        "🤖 {} bound {:?} ({}), logic generation {}",
        coordinator.name,
        body,
        coordinator.team_tag,
        coordinator.logic().generation()
    ));
    true
}

/// PossessBody → bind
pub fn handle_possess_requests(
    mut requests: EventReader<PossessBody>,
    mut coordinators: Query<&mut AiCoordinator>,
    mut bodies: Query<BindableBody>,
    match_state: Res<MatchState>,
    mut commands: Commands,
) {
    for request in requests.read() {
        let Ok(mut coordinator) = coordinators.get_mut(request.coordinator) else {
            logger::log_warning(&format!(
                "⚠️ PossessBody: coordinator {:?} not found",
                request.coordinator
            ));
            continue;
        };

        try_bind(
            request.coordinator,
            &mut coordinator,
            request.body,
            match_state.has_ended(),
            &mut bodies,
            &mut commands,
        );
    }
}

/// Смерть тела: стоп движения/логики/оружия, unbind, teardown если без respawn
pub fn handle_body_deaths(
    mut died: EventReader<CombatantDied>,
    mut coordinators: Query<&mut AiCoordinator>,
    mut gunners: Query<(&mut NpcGunner, &Loadout)>,
    mut weapons: Query<&mut Weapon>,
    mut stop_movement: EventWriter<StopMovement>,
    mut commands: Commands,
) {
    for event in died.read() {
        for &watcher in &event.watchers {
            let Ok(mut coordinator) = coordinators.get_mut(watcher) else {
                continue;
            };
            if coordinator.controlled_body() != Some(event.body) {
                continue;
            }

            stop_movement.write(StopMovement { body: event.body });
            if let Ok((mut gunner, loadout)) = gunners.get_mut(event.body) {
                gunner.reset();
                halt_active_weapon(loadout, &mut weapons);
            }

            let handoff = coordinator.on_body_death(event.will_respawn);
            if let Ok(mut body_commands) = commands.get_entity(event.body) {
                body_commands.try_remove::<PossessedBy>();
            }

            match handoff {
                DeathHandoff::AwaitRespawn => {
                    logger::log(&format!(
                        "🤖 {} lost body {:?}, awaiting respawn",
                        coordinator.name, event.body
                    ));
                }
                DeathHandoff::TearDown => {
                    logger::log_info(&format!(
                        "🤖 {} torn down (body {:?} will not respawn)",
                        coordinator.name, event.body
                    ));
                    if let Ok(mut coordinator_commands) = commands.get_entity(watcher) {
                        coordinator_commands.try_despawn();
                    }
                }
            }
        }
    }
}

/// Respawn in place → request_rebind каждого подписчика
pub fn handle_body_respawns(
    mut respawned: EventReader<BodyRespawned>,
    mut coordinators: Query<&mut AiCoordinator>,
    mut bodies: Query<BindableBody>,
    loadouts: Query<&Loadout>,
    mut weapons: Query<&mut Weapon>,
    match_state: Res<MatchState>,
    mut commands: Commands,
) {
    let match_over = match_state.has_ended();

    for event in respawned.read() {
        for &watcher in &event.watchers {
            let Ok(mut coordinator) = coordinators.get_mut(watcher) else {
                continue;
            };

            match coordinator.rebind_path(event.body) {
                RebindPath::Bind => {
                    try_bind(
                        watcher,
                        &mut coordinator,
                        event.body,
                        match_over,
                        &mut bodies,
                        &mut commands,
                    );
                }
                RebindPath::Restart => {
                    if match_over {
                        coordinator.stop_for_match_end();
                    } else {
                        coordinator.restart_logic();
                    }
                    if let Ok(loadout) = loadouts.get(event.body) {
                        halt_active_weapon(loadout, &mut weapons);
                    }
                    if let Ok((_, _, _, Some(mut gunner))) = bodies.get_mut(event.body) {
                        gunner.reset();
                    }
                    logger::log(&format!(
                        "🤖 {} rebound {:?} (logic running: {})",
                        coordinator.name,
                        event.body,
                        coordinator.logic().is_running()
                    ));
                }
            }
        }
    }
}

/// Perception → подписанная behaviour логика (без изменений)
pub fn forward_perception(
    mut perception: EventReader<PerceptionEvent>,
    coordinators: Query<&AiCoordinator>,
    mut stimuli: EventWriter<BehaviorStimulus>,
) {
    for event in perception.read() {
        let Ok(coordinator) = coordinators.get(event.observer) else {
            continue;
        };
        if !coordinator.can_issue_commands() {
            logger::log(&format!(
                "🤖 {} dropped {:?}: logic not running",
                coordinator.name, event.stimulus
            ));
            continue;
        }
        stimuli.write(BehaviorStimulus {
            coordinator: event.observer,
            stimulus: event.stimulus,
        });
    }
}

/// Встроенная behaviour логика: Idle ⇄ Engage
pub fn run_decision_process(
    mut stimuli: EventReader<BehaviorStimulus>,
    mut coordinators: Query<&mut AiCoordinator>,
    combatants: Query<&Combatant>,
    loadouts: Query<&Loadout>,
    weapons: Query<&Weapon>,
    mut orders: EventWriter<ShootingOrder>,
    mut weapon_commands: EventWriter<WeaponCommand>,
) {
    for event in stimuli.read() {
        let Ok(mut coordinator) = coordinators.get_mut(event.coordinator) else {
            continue;
        };
        let Some(body) = coordinator.controlled_body() else {
            continue;
        };
        if !coordinator.can_issue_commands() {
            continue;
        }

        match event.stimulus {
            Stimulus::TargetAcquired(actor) => {
                let hostile = combatants
                    .get(actor)
                    .is_ok_and(|c| c.is_alive() && c.team != coordinator.team_tag);
                if hostile && coordinator.logic().state() == BehaviorState::Idle {
                    coordinator.engage(actor);
                    orders.write(ShootingOrder {
                        body,
                        command: ShootingCommand::Start { target: actor },
                    });
                    logger::log(&format!("🎯 {} engages {:?}", coordinator.name, actor));
                }
            }
            Stimulus::TargetLost(actor) => {
                if coordinator.current_target() == Some(actor) {
                    coordinator.disengage();
                    orders.write(ShootingOrder {
                        body,
                        command: ShootingCommand::Stop,
                    });
                    logger::log(&format!("🎯 {} lost {:?}", coordinator.name, actor));
                }
            }
        }
    }

    for mut coordinator in coordinators.iter_mut() {
        if !coordinator.can_issue_commands() {
            continue;
        }
        let BehaviorState::Engage { target } = coordinator.logic().state() else {
            continue;
        };
        let Some(body) = coordinator.controlled_body() else {
            continue;
        };

        let target_alive = combatants.get(target).is_ok_and(Combatant::is_alive);
        if !target_alive {
            coordinator.disengage();
            orders.write(ShootingOrder {
                body,
                command: ShootingCommand::Stop,
            });
            continue;
        }

        let Some(weapon) = loadouts
            .get(body)
            .ok()
            .and_then(Loadout::active)
            .and_then(|w| weapons.get(w).ok())
        else {
            continue;
        };

        if weapon.current_ammo() == 0 {
            if weapon.can_reload() {
                weapon_commands.write(WeaponCommand {
                    holder: body,
                    action: WeaponAction::Reload,
                });
            }
        } else if !weapon.is_firing() && !weapon.is_reloading() {
            // После reload: снова жмём спуск
            orders.write(ShootingOrder {
                body,
                command: ShootingCommand::Start { target },
            });
        }
    }
}
