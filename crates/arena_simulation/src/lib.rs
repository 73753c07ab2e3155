//! Arena Simulation Core
//!
//! Authoritative combat-match ядро на Bevy 0.16 (headless ECS):
//! - combat: оружие (refire/reload), снаряды, урон, смерть, respawn
//! - ai: coordinators, которые переживают свои тела (possess / rebind)
//! - scoring: очки команд, victory conditions, match clock
//! - presentation: события для UI и per-viewer UI state
//!
//! Physics / rendering / networking транспорт вне ядра: движение и
//! репликация приходят событиями, line traces через `LineTracer`.

use std::time::Duration;

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod aim;
pub mod arena;
pub mod authority;
pub mod combat;
pub mod components;
pub mod config;
pub mod logger;
pub mod presentation;
pub mod scoring;

// Re-exports для удобства
pub use ai::{AIPlugin, AiCoordinator, BehaviorState, PerceptionEvent, PossessBody, Stimulus};
pub use aim::{AimSource, AimTuning, ArenaTracer, LineTracer, ObstacleField};
pub use arena::{
    populate_arena, spawn_ai_coordinator, spawn_npc_body, spawn_player_body,
    spawn_player_controller, spawn_weapon, ArenaRoster, NpcSpawn,
};
pub use authority::{is_authority, NetRole};
pub use combat::{
    AddWeapon, BodyRespawned, CombatPlugin, CombatantDied, CombatantKilled, DamageRequest,
    HealRequest, Loadout, NoiseEmitted, PredictedFire, Projectile, ProjectileHit, ProjectileSpawned,
    ShootingCommand, ShootingOrder, StopMovement, Weapon, WeaponAction, WeaponCommand, WeaponKind,
    WeaponOwner, WeaponRejection,
};
pub use components::*;
pub use config::{ArenaConfig, CombatantTuning, ConfigError};
pub use logger::init_logger;
pub use presentation::{PresentationPlugin, Viewer, ViewerUi};
pub use scoring::{
    MatchEnded, MatchOutcome, MatchPlugin, MatchRestarted, MatchRules, MatchState, RestartMatch,
    ScoreChanged, TimeRemaining, VictoryReason, ViewerOutcome,
};

/// Шаг fixed timestep (60Hz)
pub const FIXED_TIMESTEP: Duration = Duration::from_nanos(16_666_667);

/// Фазы одного тика. Строго по порядку, см. `SimulationPlugin`
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArenaSet {
    /// Intents игроков, приказы AI, выдача оружия
    Input,
    /// Refire/reload таймеры, выстрелы
    Weapons,
    Projectiles,
    /// HP, смерть, очки
    Damage,
    /// Invulnerability, respawn, destruction, spawn тел
    Lifecycle,
    Ai,
    /// Match clock, эффекты победы, рестарт
    Match,
    /// UI подписчики (обе роли)
    Presentation,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Config может прийти заранее (insert_resource до add_plugins)
        let config = app
            .world()
            .get_resource::<ArenaConfig>()
            .cloned()
            .unwrap_or_default();

        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_duration(FIXED_TIMESTEP))
            .init_resource::<NetRole>()
            .init_resource::<ObstacleField>()
            .init_resource::<ArenaRoster>()
            .insert_resource(MatchState::new(config.rules))
            .insert_resource(config)
            .configure_sets(
                FixedUpdate,
                (
                    ArenaSet::Input,
                    ArenaSet::Weapons,
                    ArenaSet::Projectiles,
                    ArenaSet::Damage,
                    ArenaSet::Lifecycle,
                    ArenaSet::Ai,
                    ArenaSet::Match,
                    ArenaSet::Presentation,
                )
                    .chain(),
            )
            .add_plugins((CombatPlugin, AIPlugin, MatchPlugin, PresentationPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Тот же seed заново (рестарт матча)
    pub fn reseed(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }
}

/// Snapshot мира для сравнения детерминизма: компоненты T по Entity index
pub fn world_snapshot<T: Component + std::fmt::Debug>(world: &mut World) -> Vec<u8> {
    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    let mut snapshot = Vec::new();
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }
    snapshot
}

/// Создаёт minimal Bevy App для headless симуляции (real-time main loop)
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .add_plugins(SimulationPlugin);

    app
}

/// App без main loop: время двигаем руками через `step_simulation`.
/// Детерминированно, для тестов и fast-forward прогонов
pub fn create_stepped_app(seed: u64, role: NetRole, config: ArenaConfig) -> App {
    let mut app = App::new();
    app.init_resource::<Time>()
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(role)
        .insert_resource(config)
        .add_plugins(SimulationPlugin);

    app
}

/// Один fixed тик: сдвигаем время и гоняем FixedUpdate
pub fn step_simulation(app: &mut App, delta: Duration) {
    app.world_mut().resource_mut::<Time>().advance_by(delta);
    app.world_mut().run_schedule(FixedUpdate);
}

/// `secs` секунд симуляции тиками по `FIXED_TIMESTEP`
pub fn run_for_secs(app: &mut App, secs: f32) {
    let ticks = (secs / FIXED_TIMESTEP.as_secs_f32()).ceil() as u32;
    for _ in 0..ticks {
        step_simulation(app, FIXED_TIMESTEP);
    }
}
