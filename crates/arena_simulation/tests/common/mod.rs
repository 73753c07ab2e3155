//! Общие helpers для интеграционных тестов: stepped арена, spawn, события.

#![allow(dead_code)]

use arena_simulation::*;
use bevy::prelude::*;

pub const SEED: u64 = 7;

/// Stepped authoritative арена без roster'а
pub fn create_arena(config: ArenaConfig) -> App {
    create_stepped_app(SEED, NetRole::Authority, config)
}

/// Config с respawn'ом NPC in place
pub fn respawning_npcs(delay_secs: f32) -> ArenaConfig {
    let mut config = ArenaConfig::default();
    config.npc.respawn = RespawnPolicy {
        enabled: true,
        delay_secs,
        strategy: RespawnStrategy::ResetInPlace,
    };
    config
}

/// NPC тело + coordinator, bind на ближайшем тике
pub fn spawn_bound_npc(app: &mut App, name: &str, team: TeamId, position: Vec3) -> (Entity, Entity) {
    let config = app.world().resource::<ArenaConfig>().clone();
    let (coordinator, body) = {
        let mut commands = app.world_mut().commands();
        let body = spawn_npc_body(&mut commands, Transform::from_translation(position), team, &config);
        let coordinator = spawn_ai_coordinator(&mut commands, name, team);
        (coordinator, body)
    };
    app.world_mut().flush();
    app.world_mut().send_event(PossessBody { coordinator, body });
    tick(app);
    (coordinator, body)
}

pub fn spawn_player(app: &mut App, name: &str, team: TeamId, position: Vec3) -> Entity {
    let controller = {
        let mut commands = app.world_mut().commands();
        spawn_player_controller(&mut commands, name, team, Transform::from_translation(position))
    };
    app.world_mut().flush();
    // Тело появляется на lifecycle фазе
    tick(app);
    controller
}

pub fn tick(app: &mut App) {
    step_simulation(app, FIXED_TIMESTEP);
}

/// Урон от контроллера (instigator) по телу, затем один тик
pub fn hit(app: &mut App, target: Entity, amount: f32, instigator: Option<Entity>) {
    app.world_mut().send_event(DamageRequest {
        target,
        amount,
        instigator,
    });
    tick(app);
}

pub fn kill(app: &mut App, target: Entity, instigator: Option<Entity>) {
    hit(app, target, 10_000.0, instigator);
}

pub fn combatant(app: &App, body: Entity) -> &Combatant {
    app.world()
        .get::<Combatant>(body)
        .unwrap_or_else(|| panic!("{body:?} has no Combatant"))
}

pub fn coordinator(app: &App, entity: Entity) -> &AiCoordinator {
    app.world()
        .get::<AiCoordinator>(entity)
        .unwrap_or_else(|| panic!("{entity:?} has no AiCoordinator"))
}

pub fn pawn_of(app: &App, controller: Entity) -> Option<Entity> {
    app.world()
        .get::<PlayerController>(controller)
        .and_then(|c| c.pawn)
}

pub fn exists(app: &App, entity: Entity) -> bool {
    app.world().get_entity(entity).is_ok()
}

/// Все события типа T с начала прогона (stepped app их не чистит)
pub fn events<T: Event + Clone>(app: &App) -> Vec<T> {
    app.world()
        .resource::<Events<T>>()
        .iter_current_update_events()
        .cloned()
        .collect()
}

pub fn active_weapon<'a>(app: &'a App, body: Entity) -> &'a Weapon {
    let weapon = app
        .world()
        .get::<Loadout>(body)
        .and_then(Loadout::active)
        .unwrap_or_else(|| panic!("{body:?} has no active weapon"));
    app.world()
        .get::<Weapon>(weapon)
        .unwrap_or_else(|| panic!("{weapon:?} is not a weapon"))
}
