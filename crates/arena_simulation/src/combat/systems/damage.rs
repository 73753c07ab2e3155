//! Damage → death → match arbiter.
//!
//! Одна смерть обрабатывается целиком (stop, timers, scoring, victory)
//! до следующей: очки инкрементируются строго последовательно.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::weapon::halt_active_weapon;
use crate::ai::AiCoordinator;
use crate::combat::events::{
    CombatantDied, CombatantKilled, DamageRequest, HealRequest, StopMovement,
};
use crate::combat::loadout::Loadout;
use crate::combat::weapon::Weapon;
use crate::components::{
    BodyControl, Combatant, Dead, DeathWatchers, LifecycleTimers, NpcGunner, PlayerController,
    PlayerPilot, PossessedBy, RespawnPolicy,
};
use crate::config::ArenaConfig;
use crate::logger;
use crate::presentation::{AmmoChanged, DeathScreen, HealthChanged, KillFeed};
use crate::scoring::{MatchEnded, MatchState, ScoreChanged};

const UNKNOWN_NAME: &str = "Unknown";

/// Контроллеры (игроки + AI) по entity
#[derive(SystemParam)]
pub struct ControllerLookup<'w, 's> {
    players: Query<'w, 's, &'static PlayerController>,
    coordinators: Query<'w, 's, &'static AiCoordinator>,
}

impl ControllerLookup<'_, '_> {
    pub fn name(&self, controller: Option<Entity>) -> String {
        let Some(controller) = controller else {
            return UNKNOWN_NAME.to_string();
        };
        if let Ok(player) = self.players.get(controller) {
            return player.name.clone();
        }
        if let Ok(coordinator) = self.coordinators.get(controller) {
            return coordinator.name.clone();
        }
        UNKNOWN_NAME.to_string()
    }

    pub fn is_player(&self, controller: Entity) -> bool {
        self.players.contains(controller)
    }

    /// Тело, которым контроллер управляет прямо сейчас
    pub fn controlled_body(&self, controller: Entity) -> Option<Entity> {
        if let Ok(player) = self.players.get(controller) {
            return player.pawn;
        }
        self.coordinators
            .get(controller)
            .ok()
            .and_then(AiCoordinator::controlled_body)
    }
}

/// Authoritative damage. Запуск только под `is_authority`
pub fn apply_damage_requests(
    mut requests: EventReader<DamageRequest>,
    mut combatants: Query<&mut Combatant>,
    mut health: EventWriter<HealthChanged>,
    mut killed: EventWriter<CombatantKilled>,
) {
    for request in requests.read() {
        let Ok(mut combatant) = combatants.get_mut(request.target) else {
            continue;
        };

        let outcome = combatant.apply_damage(request.amount, request.instigator);
        if outcome.applied <= 0.0 {
            logger::log(&format!(
                "🛡️ {:?}: {:.1} damage rejected (dead={}, invulnerable={})",
                request.target,
                request.amount,
                combatant.is_dead(),
                combatant.is_invulnerable()
            ));
            continue;
        }

        logger::log(&format!(
            "💥 {:?} took {:.1} damage (HP: {:.1}/{:.1})",
            request.target,
            outcome.applied,
            combatant.current_hp(),
            combatant.max_hp()
        ));
        health.write(HealthChanged {
            body: request.target,
            fraction: combatant.health_fraction(),
        });

        if outcome.killed {
            killed.write(CombatantKilled {
                body: request.target,
            });
        }
    }
}

/// Лечение живых тел, clamp к max HP
pub fn apply_heal_requests(
    mut requests: EventReader<HealRequest>,
    mut combatants: Query<&mut Combatant>,
    mut health: EventWriter<HealthChanged>,
) {
    for request in requests.read() {
        let Ok(mut combatant) = combatants.get_mut(request.target) else {
            continue;
        };

        let healed = combatant.heal(request.amount);
        if healed <= 0.0 {
            continue;
        }

        logger::log(&format!(
            "💚 {:?} healed {:.1} (HP: {:.1}/{:.1})",
            request.target,
            healed,
            combatant.current_hp(),
            combatant.max_hp()
        ));
        health.write(HealthChanged {
            body: request.target,
            fraction: combatant.health_fraction(),
        });
    }
}

#[derive(SystemParam)]
pub struct DeathNotices<'w> {
    score: EventWriter<'w, ScoreChanged>,
    ended: EventWriter<'w, MatchEnded>,
    kill_feed: EventWriter<'w, KillFeed>,
    death_screen: EventWriter<'w, DeathScreen>,
    died: EventWriter<'w, CombatantDied>,
    stop_movement: EventWriter<'w, StopMovement>,
    ammo: EventWriter<'w, AmmoChanged>,
}

type DyingBody = (
    &'static mut Combatant,
    &'static RespawnPolicy,
    &'static mut LifecycleTimers,
    &'static mut BodyControl,
    Option<&'static Loadout>,
    Option<&'static PossessedBy>,
    Option<&'static DeathWatchers>,
    Option<&'static PlayerPilot>,
    Option<&'static mut NpcGunner>,
    Has<Dead>,
);

/// Что запомнили о жертве до того, как отпустить borrow тела
struct Victim {
    team: crate::components::TeamId,
    killer: Option<Entity>,
    controller: Option<Entity>,
    will_respawn: bool,
    respawn_secs: f32,
    watchers: Vec<Entity>,
}

/// Death: stop, corpse, post-death timer, затем kill/death stats и очко команде убийцы
pub fn resolve_deaths(
    mut killed: EventReader<CombatantKilled>,
    mut bodies: Query<DyingBody>,
    mut weapons: Query<&mut Weapon>,
    controllers: ControllerLookup,
    mut match_state: ResMut<MatchState>,
    config: Res<ArenaConfig>,
    time: Res<Time>,
    mut notices: DeathNotices,
    mut commands: Commands,
) {
    let now = time.elapsed_secs();

    for event in killed.read() {
        let body = event.body;

        let victim = {
            let Ok((
                mut combatant,
                policy,
                mut timers,
                mut control,
                loadout,
                possessed,
                watchers,
                pilot,
                gunner,
                already_dead,
            )) = bodies.get_mut(body)
            else {
                continue;
            };

            // Смерть уже разрешена: post-death таймер стоит или труп помечен
            if already_dead || timers.pending_post_death().is_some() {
                logger::log(&format!("💀 {:?}: death already resolved, ignored", body));
                continue;
            }
            combatant.mark_dead();

            if let Some(mut gunner) = gunner {
                gunner.reset();
            }
            if let Some(loadout) = loadout {
                if pilot.is_some() {
                    if let Some(mut weapon) = loadout.active().and_then(|w| weapons.get_mut(w).ok()) {
                        weapon.deactivate();
                    }
                    notices.ammo.write(AmmoChanged {
                        holder: body,
                        current: 0,
                        magazine: 0,
                    });
                } else {
                    halt_active_weapon(loadout, &mut weapons);
                }
            }
            control.disable_for_death();
            notices.stop_movement.write(StopMovement { body });

            combatant.set_invulnerable(false);
            timers.cancel_spawn_protection();
            let will_respawn = policy.will_respawn();
            if will_respawn {
                timers.schedule_respawn(policy.delay_secs);
            } else {
                timers.schedule_destruction(config.deferred_destruction_secs);
            }

            Victim {
                team: combatant.team,
                killer: combatant.last_damage_source(),
                controller: possessed.map(|p| p.0),
                will_respawn,
                respawn_secs: if will_respawn { policy.delay_secs } else { 0.0 },
                watchers: watchers.map(|w| w.watchers().to_vec()).unwrap_or_default(),
            }
        };

        if let Ok(mut body_commands) = commands.get_entity(body) {
            body_commands.try_insert(Dead);
        }

        let victim_name = controllers.name(victim.controller);
        let killer_name = controllers.name(victim.killer);

        // Stats: только контроллеры игроков
        if let Some(victim_controller) = victim.controller.filter(|c| controllers.is_player(*c)) {
            match_state.record_death(victim_controller, &victim_name);
        }
        if let Some(killer) = victim
            .killer
            .filter(|k| controllers.is_player(*k) && Some(*k) != victim.controller)
        {
            match_state.record_kill(killer, &killer_name);
        }

        // Команда убийцы: через тело, которым он управляет сейчас
        let killer_team = victim
            .killer
            .and_then(|killer| controllers.controlled_body(killer))
            .and_then(|killer_body| bodies.get(killer_body).ok())
            .map(|(killer_combatant, ..)| killer_combatant.team);

        match killer_team {
            Some(team) if team != victim.team => {
                if let Some(update) = match_state.increment_team_score(team, now) {
                    logger::log(&format!("🏆 {} scores ({} total)", team, update.score));
                    notices.score.write(ScoreChanged {
                        team,
                        score: update.score,
                    });
                    if let Some(outcome) = update.outcome {
                        logger::log_info(&format!(
                            "🏁 Match ended: {:?} wins ({:?})",
                            outcome.winning_team, outcome.reason
                        ));
                        notices.ended.write(MatchEnded { outcome });
                    }
                }
            }
            Some(team) => {
                logger::log(&format!(
                    "🤝 {:?} killed by own side ({}), no score",
                    body, team
                ));
            }
            None => {
                logger::log_warning(&format!(
                    "⚠️ {:?}: killer {:?} unresolved, no score",
                    body, victim.killer
                ));
            }
        }

        notices.kill_feed.write(KillFeed {
            killer_name: killer_name.clone(),
            victim_name: victim_name.clone(),
        });

        if let Some(victim_controller) = victim.controller.filter(|c| controllers.is_player(*c)) {
            notices.death_screen.write(DeathScreen {
                controller: victim_controller,
                killer_name: killer_name.clone(),
                respawn_secs: victim.respawn_secs,
            });
        }

        logger::log_info(&format!(
            "💀 {} ({}) killed by {} (respawn: {})",
            victim_name, victim.team, killer_name, victim.will_respawn
        ));

        notices.died.write(CombatantDied {
            body,
            team: victim.team,
            killer: victim.killer,
            will_respawn: victim.will_respawn,
            watchers: victim.watchers,
        });
    }
}
