//! Arena population: spawn helpers для тел, оружия, контроллеров и roster NPC.
//!
//! Respawn strategy задаётся здесь, при сборке тела:
//! - player body → `DestroyAndRecreate`
//! - NPC body → `ResetInPlace`

use bevy::prelude::*;

use crate::ai::{AiCoordinator, PossessBody};
use crate::combat::loadout::Loadout;
use crate::combat::weapon::{Weapon, WeaponKind, WeaponOwner};
use crate::components::{
    BodyControl, Combatant, DeathWatchers, Eye, HitBox, LifecycleTimers, NpcGunner,
    PlayerController, PlayerPilot, PossessedBy, RespawnPolicy, RespawnStrategy, TeamId,
};
use crate::config::{ArenaConfig, CombatantTuning};
use crate::logger;
use crate::presentation::Viewer;

/// NPC, который появляется на старте (и после каждого рестарта)
#[derive(Debug, Clone, PartialEq)]
pub struct NpcSpawn {
    pub name: String,
    pub team: TeamId,
    pub transform: Transform,
}

/// Состав арены. `pending` → populate_arena спавнит всех на ближайшем тике
#[derive(Resource, Debug, Clone)]
pub struct ArenaRoster {
    pub npcs: Vec<NpcSpawn>,
    pending: bool,
}

impl Default for ArenaRoster {
    fn default() -> Self {
        Self {
            npcs: Vec::new(),
            pending: true,
        }
    }
}

impl ArenaRoster {
    pub fn with_npcs(npcs: Vec<NpcSpawn>) -> Self {
        Self { npcs, pending: true }
    }

    pub fn request_population(&mut self) {
        self.pending = true;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

/// Оружие как отдельная entity
pub fn spawn_weapon(commands: &mut Commands, owner: Entity, kind: WeaponKind, active: bool) -> Entity {
    let mut weapon = Weapon::from_kind(kind);
    if active {
        weapon.activate();
    }
    commands.spawn((weapon, WeaponOwner(owner))).id()
}

/// Общая часть тела: HP, таймеры, control, hit box, loadout
fn spawn_combatant_body(
    commands: &mut Commands,
    transform: Transform,
    team: TeamId,
    tuning: &CombatantTuning,
    strategy: RespawnStrategy,
    control: BodyControl,
    kinds: &[WeaponKind],
) -> Entity {
    let mut combatant = Combatant::new(team, tuning.max_hp);
    let mut timers = LifecycleTimers::new(tuning.invulnerability_secs);
    if timers.start_spawn_protection() {
        combatant.set_invulnerable(true);
    }

    let body = commands
        .spawn((
            transform,
            combatant,
            RespawnPolicy {
                strategy,
                ..tuning.respawn
            },
            timers,
            control,
            DeathWatchers::default(),
            HitBox {
                half_extents: Vec3::from_array(tuning.hit_box_half_extents),
            },
            Eye {
                height: tuning.eye_height,
            },
        ))
        .id();

    let weapons: Vec<Entity> = kinds
        .iter()
        .enumerate()
        .map(|(index, kind)| spawn_weapon(commands, body, *kind, index == 0))
        .collect();
    commands.entity(body).insert(Loadout::with_weapons(weapons));

    body
}

/// Тело игрока в spawn point контроллера.
/// Input тела наследуется от контроллера (после конца матча остаётся выключенным)
pub fn spawn_player_body(
    commands: &mut Commands,
    controller_entity: Entity,
    controller: &PlayerController,
    config: &ArenaConfig,
) -> Entity {
    let body = spawn_combatant_body(
        commands,
        controller.spawn_point,
        controller.team,
        &config.player,
        RespawnStrategy::DestroyAndRecreate,
        BodyControl {
            input_enabled: controller.input_enabled,
            ..BodyControl::default()
        },
        &config.player_loadout,
    );
    commands.entity(body).insert((
        PlayerPilot {
            controller: controller_entity,
            max_aim_distance: config.player_max_aim_distance,
        },
        PossessedBy(controller_entity),
    ));
    body
}

/// Тело NPC (без контроллера: привязка через `PossessBody`)
pub fn spawn_npc_body(
    commands: &mut Commands,
    transform: Transform,
    team: TeamId,
    config: &ArenaConfig,
) -> Entity {
    let body = spawn_combatant_body(
        commands,
        transform,
        team,
        &config.npc,
        RespawnStrategy::ResetInPlace,
        BodyControl::default(),
        &[config.npc_weapon],
    );
    commands.entity(body).insert(NpcGunner::new(config.npc_aim));
    body
}

pub fn spawn_ai_coordinator(commands: &mut Commands, name: impl Into<String>, team: TeamId) -> Entity {
    commands.spawn(AiCoordinator::new(name, team)).id()
}

/// Контроллер игрока-зрителя. Тело появится на ближайшем lifecycle тике
pub fn spawn_player_controller(
    commands: &mut Commands,
    name: impl Into<String>,
    team: TeamId,
    spawn_point: Transform,
) -> Entity {
    commands
        .spawn((
            PlayerController::new(name, team, spawn_point),
            Viewer::default(),
        ))
        .id()
}

/// Roster → тела NPC + coordinators + bind
pub fn populate_arena(
    mut roster: ResMut<ArenaRoster>,
    config: Res<ArenaConfig>,
    mut possess: EventWriter<PossessBody>,
    mut commands: Commands,
) {
    if !roster.pending {
        return;
    }
    roster.pending = false;

    for spawn in &roster.npcs {
        let body = spawn_npc_body(&mut commands, spawn.transform, spawn.team, &config);
        let coordinator = spawn_ai_coordinator(&mut commands, spawn.name.clone(), spawn.team);
        possess.write(PossessBody { coordinator, body });
    }

    if !roster.npcs.is_empty() {
        logger::log_info(&format!("🏟️ Arena populated: {} NPCs", roster.npcs.len()));
    }
}
