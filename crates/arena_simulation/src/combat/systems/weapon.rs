//! Weapon systems: input → state machine → released shots → projectiles.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use rand::RngCore;

use crate::aim::{random_unit_vector, AimSource, ArenaTracer, ObstacleField};
use crate::authority::NetRole;
use crate::combat::events::{
    AddWeapon, NoiseEmitted, PredictedFire, ProjectileSpawned, ShootingCommand, ShootingOrder,
    ShotReleased, WeaponAction, WeaponCommand,
};
use crate::combat::holder::as_weapon_holder;
use crate::combat::loadout::Loadout;
use crate::combat::weapon::{FiredRound, RefireAction, Weapon, WeaponOwner};
use crate::components::{
    BodyControl, Combatant, Eye, HitBox, NpcGunner, PlayerController, PlayerPilot, PossessedBy,
};
use crate::logger;
use crate::presentation::{AmmoChanged, CueKind, RecoilApplied, WeaponCue};
use crate::DeterministicRng;

/// Остановить активное оружие тела (смерть, конец матча, рестарт логики)
pub fn halt_active_weapon(loadout: &Loadout, weapons: &mut Query<&mut Weapon>) {
    if let Some(mut weapon) = loadout.active().and_then(|w| weapons.get_mut(w).ok()) {
        weapon.stop_firing();
    }
}

fn release_shot(
    shots: &mut EventWriter<ShotReleased>,
    weapon: Entity,
    holder: Entity,
    round: FiredRound,
) {
    shots.write(ShotReleased {
        weapon,
        holder,
        round,
    });
}

/// Input тела и (для pawn'а игрока) его контроллера
fn accepts_input(
    control: &BodyControl,
    pilot: Option<&PlayerPilot>,
    controllers: &Query<&PlayerController>,
) -> bool {
    control.input_enabled
        && pilot.is_none_or(|pilot| {
            controllers
                .get(pilot.controller)
                .is_ok_and(|controller| controller.input_enabled)
        })
}

/// Input intents. Authority: полный state machine; mirror: только intent флаг
pub fn handle_weapon_commands(
    mut intents: EventReader<WeaponCommand>,
    mut bodies: Query<(&mut Loadout, &BodyControl, Option<&PlayerPilot>)>,
    controllers: Query<&PlayerController>,
    mut weapons: Query<&mut Weapon>,
    role: Res<NetRole>,
    time: Res<Time>,
    mut shots: EventWriter<ShotReleased>,
    mut cues: EventWriter<WeaponCue>,
    mut ammo: EventWriter<AmmoChanged>,
    mut predicted: EventWriter<PredictedFire>,
) {
    let now = time.elapsed_secs();

    for intent in intents.read() {
        let Ok((mut loadout, control, pilot)) = bodies.get_mut(intent.holder) else {
            continue;
        };
        if !accepts_input(control, pilot, &controllers) {
            logger::log(&format!(
                "🔫 {:?}: {:?} ignored, input disabled",
                intent.holder, intent.action
            ));
            continue;
        }

        if intent.action == WeaponAction::SwitchWeapon {
            if role.is_authority() {
                if let Some((current, magazine)) = switch_weapon(&mut loadout, &mut weapons) {
                    ammo.write(AmmoChanged {
                        holder: intent.holder,
                        current,
                        magazine,
                    });
                }
            }
            continue;
        }

        let Some(weapon_entity) = loadout.active() else {
            continue;
        };
        let Ok(mut weapon) = weapons.get_mut(weapon_entity) else {
            continue;
        };

        match (intent.action, role.is_authority()) {
            (WeaponAction::StartFiring, true) => match weapon.start_firing(now) {
                Ok(Some(round)) => release_shot(&mut shots, weapon_entity, intent.holder, round),
                Ok(None) => {}
                Err(reason) => {
                    logger::log(&format!("🔫 {:?}: start firing rejected: {}", intent.holder, reason));
                }
            },
            (WeaponAction::StartFiring, false) => {
                if weapon.predict_start_firing() {
                    predicted.write(PredictedFire {
                        holder: intent.holder,
                    });
                }
            }
            (WeaponAction::StopFiring, _) => weapon.stop_firing(),
            (WeaponAction::Reload, _) => match weapon.start_reload(*role) {
                Ok(()) => {
                    cues.write(WeaponCue {
                        holder: intent.holder,
                        cue: CueKind::Reload,
                    });
                    logger::log(&format!("🔄 {:?}: reloading", intent.holder));
                }
                Err(reason) => {
                    logger::log(&format!("🔄 {:?}: reload rejected: {}", intent.holder, reason));
                }
            },
            (WeaponAction::SwitchWeapon, _) => {}
        }
    }
}

/// Следующее оружие по кругу: текущее deactivate, новое activate
fn switch_weapon(loadout: &mut Loadout, weapons: &mut Query<&mut Weapon>) -> Option<(u32, u32)> {
    let next = loadout.next_after_active()?;
    if let Some(mut current) = loadout.active().and_then(|w| weapons.get_mut(w).ok()) {
        current.deactivate();
    }
    let mut next_weapon = weapons.get_mut(next).ok()?;
    loadout.set_active(next);
    Some(next_weapon.activate())
}

/// Выдать оружие по kind; дубликат → no-op
pub fn handle_add_weapon(
    mut requests: EventReader<AddWeapon>,
    mut loadouts: Query<&mut Loadout>,
    mut weapons: Query<&mut Weapon>,
    mut ammo: EventWriter<AmmoChanged>,
    mut commands: Commands,
) {
    for request in requests.read() {
        let Ok(mut loadout) = loadouts.get_mut(request.holder) else {
            continue;
        };

        let already_owned = loadout
            .owned()
            .iter()
            .any(|w| weapons.get(*w).is_ok_and(|weapon| weapon.kind == request.kind));
        if already_owned {
            logger::log(&format!(
                "🔫 {:?} already owns {:?}",
                request.holder, request.kind
            ));
            continue;
        }

        if let Some(mut current) = loadout.active().and_then(|w| weapons.get_mut(w).ok()) {
            current.deactivate();
        }

        let mut weapon = Weapon::from_kind(request.kind);
        let (current, magazine) = weapon.activate();
        let weapon_entity = commands
            .spawn((weapon, WeaponOwner(request.holder)))
            .id();
        loadout.add_and_equip(weapon_entity);

        ammo.write(AmmoChanged {
            holder: request.holder,
            current,
            magazine,
        });
    }
}

/// Приказы AI телу NPC (StartShooting / StopShooting)
pub fn apply_shooting_orders(
    mut orders: EventReader<ShootingOrder>,
    mut gunners: Query<(&mut NpcGunner, &Loadout, &Combatant)>,
    mut weapons: Query<&mut Weapon>,
    time: Res<Time>,
    mut shots: EventWriter<ShotReleased>,
) {
    let now = time.elapsed_secs();

    for order in orders.read() {
        let Ok((mut gunner, loadout, combatant)) = gunners.get_mut(order.body) else {
            continue;
        };

        match order.command {
            ShootingCommand::Start { target } => {
                if combatant.is_dead() {
                    continue;
                }
                gunner.start_shooting(target);
                let Some(weapon_entity) = loadout.active() else {
                    continue;
                };
                let Ok(mut weapon) = weapons.get_mut(weapon_entity) else {
                    continue;
                };
                match weapon.start_firing(now) {
                    Ok(Some(round)) => release_shot(&mut shots, weapon_entity, order.body, round),
                    Ok(None) => {}
                    Err(reason) => {
                        logger::log(&format!("🔫 {:?}: shooting order rejected: {}", order.body, reason));
                    }
                }
            }
            ShootingCommand::Stop => {
                gunner.stop_shooting();
                halt_active_weapon(loadout, &mut weapons);
            }
        }
    }
}

/// Refire / reload таймеры всех оружий
pub fn tick_weapon_timers(
    mut weapons: Query<(Entity, &mut Weapon, &WeaponOwner)>,
    holders: Query<(Option<&PlayerPilot>, Option<&NpcGunner>)>,
    time: Res<Time>,
    mut shots: EventWriter<ShotReleased>,
    mut ammo: EventWriter<AmmoChanged>,
) {
    let now = time.elapsed_secs();
    let delta = time.delta();

    for (weapon_entity, mut weapon, owner) in weapons.iter_mut() {
        let tick = weapon.tick(delta);

        let round = match tick.refire {
            Some(RefireAction::Fire) => weapon.fire(now).ok(),
            Some(RefireAction::CooldownExpired) => {
                let wants_refire = holders
                    .get(owner.0)
                    .ok()
                    .and_then(|(pilot, gunner)| as_weapon_holder(pilot, gunner))
                    .is_some_and(|holder| holder.on_semi_auto_refire());
                if wants_refire {
                    weapon.start_firing(now).ok().flatten()
                } else {
                    None
                }
            }
            None => None,
        };
        if let Some(round) = round {
            release_shot(&mut shots, weapon_entity, owner.0, round);
        }

        if tick.reload_finished {
            let current = weapon.reload_complete();
            ammo.write(AmmoChanged {
                holder: owner.0,
                current,
                magazine: weapon.magazine_size,
            });
            logger::log(&format!("🔄 {:?}: reload complete ({})", owner.0, current));
        }
    }
}

#[derive(SystemParam)]
pub struct ShotEffects<'w> {
    projectiles: EventWriter<'w, ProjectileSpawned>,
    noise: EventWriter<'w, NoiseEmitted>,
    cues: EventWriter<'w, WeaponCue>,
    recoil: EventWriter<'w, RecoilApplied>,
    ammo: EventWriter<'w, AmmoChanged>,
}

/// Выпущенный патрон → aim у holder'а → снаряд + шум + cue + отдача
pub fn resolve_released_shots(
    mut shots: EventReader<ShotReleased>,
    holders: Query<(
        &Transform,
        &Eye,
        Option<&PlayerPilot>,
        Option<&NpcGunner>,
        Option<&PossessedBy>,
    )>,
    bodies: Query<(Entity, &Transform, &HitBox, &BodyControl)>,
    weapons: Query<&Weapon>,
    obstacles: Res<ObstacleField>,
    mut rng: ResMut<DeterministicRng>,
    mut effects: ShotEffects,
) {
    if shots.is_empty() {
        return;
    }

    let mut tracer = ArenaTracer::new(&obstacles);
    for (entity, transform, hit_box, control) in bodies.iter() {
        if control.blocks_traces() {
            tracer.push_body(entity, transform.translation, hit_box.half_extents);
        }
    }

    for shot in shots.read() {
        effects.ammo.write(AmmoChanged {
            holder: shot.holder,
            current: shot.round.ammo,
            magazine: shot.round.magazine,
        });

        let Ok(weapon) = weapons.get(shot.weapon) else {
            continue;
        };
        let Ok((transform, eye, pilot, gunner, possessed)) = holders.get(shot.holder) else {
            continue;
        };
        let Some(holder) = as_weapon_holder(pilot, gunner) else {
            continue;
        };

        let source = AimSource::from_transform(transform, eye.height);
        let target_position = holder
            .aim_target()
            .and_then(|target| bodies.get(target).ok())
            .map(|(_, target_transform, _, _)| target_transform.translation);

        let point = {
            let rng: &mut dyn RngCore = &mut rng.rng;
            holder.weapon_target_location(&source, target_position, &tracer, Some(shot.holder), rng)
        };

        // Дуло: от глаз вдоль направления на цель; разброс вокруг точки
        let aim_dir = (point - source.origin)
            .try_normalize()
            .unwrap_or_else(|| source.forward_dir());
        let muzzle = source.origin + aim_dir * weapon.muzzle_offset;
        let jitter = random_unit_vector(&mut rng.rng) * weapon.aim_variance;
        let direction = (point + jitter - muzzle).try_normalize().unwrap_or(aim_dir);

        effects.projectiles.write(ProjectileSpawned {
            shooter: shot.holder,
            instigator: possessed.map(|p| p.0),
            origin: muzzle,
            direction,
            speed: weapon.projectile_speed,
            damage: weapon.damage,
        });
        effects.noise.write(NoiseEmitted {
            source: shot.holder,
            position: muzzle,
            loudness: weapon.shot_loudness,
            range: weapon.shot_noise_range,
        });
        effects.cues.write(WeaponCue {
            holder: shot.holder,
            cue: CueKind::Fire,
        });
        if let Some(pitch_degrees) = holder.recoil(weapon.firing_recoil) {
            effects.recoil.write(RecoilApplied {
                holder: shot.holder,
                pitch_degrees,
            });
        }
    }
}
