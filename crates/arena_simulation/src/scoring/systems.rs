//! Match systems: clock, эффекты победы, рестарт.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::events::{MatchEnded, MatchRestarted, RestartMatch, TimeRemaining, ViewerOutcome};
use super::state::MatchState;
use crate::ai::AiCoordinator;
use crate::arena::ArenaRoster;
use crate::combat::events::StopMovement;
use crate::combat::loadout::Loadout;
use crate::combat::projectile::Projectile;
use crate::combat::systems::halt_active_weapon;
use crate::combat::weapon::Weapon;
use crate::components::{BodyControl, Combatant, NpcGunner, PlayerController};
use crate::logger;
use crate::presentation::Viewer;
use crate::DeterministicRng;

/// Match clock: TimeRemaining раз в период, конец матча по времени
pub fn tick_match_clock(
    time: Res<Time>,
    mut match_state: ResMut<MatchState>,
    mut remaining: EventWriter<TimeRemaining>,
    mut ended: EventWriter<MatchEnded>,
) {
    let tick = match_state.tick_clock(time.delta(), time.elapsed_secs());

    if let Some(seconds) = tick.remaining_secs {
        remaining.write(TimeRemaining { seconds });
    }

    if let Some(outcome) = tick.outcome {
        logger::log_info(&format!(
            "⏱️ Time limit reached: winner {:?}",
            outcome.winning_team
        ));
        ended.write(MatchEnded { outcome });
    }
}

type MatchEndBody = (
    &'static mut BodyControl,
    Option<&'static Loadout>,
    Option<&'static mut NpcGunner>,
);

/// Победа: input игроков off, AI остановлен, всё оружие молчит.
/// Каждому viewer'у: victory/defeat по команде его контроллера
pub fn apply_match_end(
    mut ended: EventReader<MatchEnded>,
    mut controllers: Query<(Entity, &mut PlayerController), With<Viewer>>,
    mut coordinators: Query<&mut AiCoordinator>,
    mut bodies: Query<MatchEndBody>,
    mut weapons: Query<&mut Weapon>,
    mut outcomes: EventWriter<ViewerOutcome>,
    mut stop_movement: EventWriter<StopMovement>,
) {
    // Несколько MatchEnded за тик невозможно (state заморожен), но берём последний
    let Some(event) = ended.read().last() else {
        return;
    };
    let winner = event.outcome.winning_team;

    for (viewer, mut controller) in controllers.iter_mut() {
        controller.input_enabled = false;
        if let Some(mut control) = controller.pawn.and_then(|pawn| bodies.get_mut(pawn).ok()) {
            control.0.input_enabled = false;
        }

        let victory = winner == Some(controller.team);
        outcomes.write(ViewerOutcome { viewer, victory });
        logger::log(&format!(
            "🎬 {} sees {}",
            controller.name,
            if victory { "VICTORY" } else { "DEFEAT" }
        ));
    }

    for mut coordinator in coordinators.iter_mut() {
        if let Some(body) = coordinator.stop_for_match_end() {
            stop_movement.write(StopMovement { body });
        }
    }

    for (_, loadout, gunner) in bodies.iter_mut() {
        if let Some(loadout) = loadout {
            halt_active_weapon(loadout, &mut weapons);
        }
        if let Some(mut gunner) = gunner {
            gunner.reset();
        }
    }
}

#[derive(SystemParam)]
pub struct RestartTargets<'w, 's> {
    bodies: Query<'w, 's, Entity, With<Combatant>>,
    weapons: Query<'w, 's, Entity, With<Weapon>>,
    projectiles: Query<'w, 's, Entity, With<Projectile>>,
    coordinators: Query<'w, 's, Entity, With<AiCoordinator>>,
}

impl RestartTargets<'_, '_> {
    fn despawn_all(&self, commands: &mut Commands) -> usize {
        let mut count = 0;
        let entities = self
            .bodies
            .iter()
            .chain(self.weapons.iter())
            .chain(self.projectiles.iter())
            .chain(self.coordinators.iter());
        for entity in entities {
            if let Ok(mut entity_commands) = commands.get_entity(entity) {
                entity_commands.try_despawn();
                count += 1;
            }
        }
        count
    }
}

/// Рестарт: state, RNG, мир арены заново из roster'а
pub fn restart_match(
    mut requests: EventReader<RestartMatch>,
    mut match_state: ResMut<MatchState>,
    mut rng: ResMut<DeterministicRng>,
    mut roster: ResMut<ArenaRoster>,
    mut controllers: Query<&mut PlayerController>,
    targets: RestartTargets,
    time: Res<Time>,
    mut restarted: EventWriter<MatchRestarted>,
    mut commands: Commands,
) {
    if requests.read().count() == 0 {
        return;
    }

    match_state.restart(time.elapsed_secs());
    rng.reseed();

    let despawned = targets.despawn_all(&mut commands);

    for mut controller in controllers.iter_mut() {
        controller.pawn = None;
        controller.input_enabled = true;
    }
    roster.request_population();

    restarted.write(MatchRestarted);
    logger::log_info(&format!(
        "🔄 Match restarted ({} entities cleared, seed {})",
        despawned, rng.seed
    ));
}
