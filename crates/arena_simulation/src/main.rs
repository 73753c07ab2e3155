//! Headless arena match
//!
//! Две команды NPC стреляют друг в друга до победы (очки или время).
//! Опционально: путь к JSON config первым аргументом.

use arena_simulation::logger::{self, LogLevel};
use arena_simulation::*;
use bevy::prelude::*;

const SEED: u64 = 42;
const TEAM_SIZE: usize = 3;
/// Радиус "зрения" demo perception (метры)
const SIGHT_RANGE: f32 = 60.0;
/// Страховка от бесконечного матча без лимита времени
const MAX_SIM_SECS: f32 = 900.0;

fn main() {
    init_logger();
    logger::set_log_level(LogLevel::Info);

    let config = match std::env::args().nth(1) {
        Some(path) => match load_config(&path) {
            Ok(config) => config,
            Err(err) => {
                logger::log_error(&format!("❌ {}: {}", path, err));
                std::process::exit(1);
            }
        },
        None => demo_config(),
    };

    println!("Starting arena match (seed: {})", SEED);

    let mut app = create_stepped_app(SEED, NetRole::Authority, config);
    app.insert_resource(ArenaRoster::with_npcs(demo_roster()));
    {
        let mut field = app.world_mut().resource_mut::<ObstacleField>();
        field.add_box(Vec3::new(-6.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        field.add_box(Vec3::new(6.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
    }
    app.add_systems(
        FixedUpdate,
        demo_perception
            .after(ArenaSet::Lifecycle)
            .before(ArenaSet::Ai),
    );

    let mut elapsed = 0.0;
    while !app.world().resource::<MatchState>().has_ended() && elapsed < MAX_SIM_SECS {
        step_simulation(&mut app, FIXED_TIMESTEP);
        elapsed += FIXED_TIMESTEP.as_secs_f32();
    }

    let outcome = app
        .world()
        .resource::<Events<MatchEnded>>()
        .iter_current_update_events()
        .last()
        .map(|event| event.outcome.clone());

    match outcome {
        Some(outcome) => match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{}", json),
            Err(err) => logger::log_error(&format!("❌ outcome serialization failed: {}", err)),
        },
        None => println!("No winner after {:.0}s", elapsed),
    }
}

fn load_config(path: &str) -> Result<ArenaConfig, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    Ok(ArenaConfig::from_json(&json)?)
}

fn demo_config() -> ArenaConfig {
    let mut config = ArenaConfig::default();
    config.rules.target_score = 5;
    config.rules.time_limit_secs = 120.0;
    config.npc.respawn = RespawnPolicy {
        enabled: true,
        delay_secs: 3.0,
        strategy: RespawnStrategy::ResetInPlace,
    };
    config.npc.invulnerability_secs = 1.0;
    config
}

fn demo_roster() -> Vec<NpcSpawn> {
    let mut roster = Vec::new();
    for (team, z) in [(TeamId(0), -15.0), (TeamId(1), 15.0)] {
        for i in 0..TEAM_SIZE {
            let x = (i as f32 - 1.0) * 4.0;
            roster.push(NpcSpawn {
                name: format!("Bot-{}-{}", team.0, i),
                team,
                transform: Transform::from_xyz(x, 1.0, z).looking_at(Vec3::new(x, 1.0, 0.0), Vec3::Y),
            });
        }
    }
    roster
}

/// Demo perception: ближайший живой враг в радиусе, без line of sight
fn demo_perception(
    coordinators: Query<(Entity, &AiCoordinator)>,
    bodies: Query<(Entity, &Combatant, &Transform)>,
    mut perception: EventWriter<PerceptionEvent>,
) {
    for (observer, coordinator) in coordinators.iter() {
        if coordinator.current_target().is_some() || !coordinator.can_issue_commands() {
            continue;
        }
        let Some(position) = coordinator
            .controlled_body()
            .and_then(|body| bodies.get(body).ok())
            .map(|(_, _, transform)| transform.translation)
        else {
            continue;
        };

        let nearest = bodies
            .iter()
            .filter(|(_, combatant, _)| combatant.is_alive() && combatant.team != coordinator.team_tag)
            .map(|(entity, _, transform)| (entity, transform.translation.distance(position)))
            .filter(|(_, distance)| *distance <= SIGHT_RANGE)
            .min_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((target, _)) = nearest {
            perception.write(PerceptionEvent {
                observer,
                stimulus: Stimulus::TargetAcquired(target),
            });
        }
    }
}
