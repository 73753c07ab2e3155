//! AI module: coordinators, possession, perception, behaviour.
//!
//! Coordinator: отдельная entity, тело: non-owning ссылка.
//! Все системы authoritative-only (AI на mirror не крутится).

use bevy::prelude::*;

pub mod coordinator;
pub mod events;
pub mod systems;

#[cfg(test)]
mod coordinator_tests;

pub use coordinator::{AiCoordinator, BehaviorState, DeathHandoff, DecisionProcess, RebindPath};
pub use events::{BehaviorStimulus, PerceptionEvent, PossessBody, Stimulus};

use crate::authority::is_authority;
use crate::ArenaSet;

pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PossessBody>()
            .add_event::<PerceptionEvent>()
            .add_event::<BehaviorStimulus>();

        app.add_systems(
            FixedUpdate,
            (
                // Фаза 1: binding (possess, death handoff, respawn rebind)
                systems::handle_possess_requests,
                systems::handle_body_deaths,
                systems::handle_body_respawns,
                // Фаза 2: perception → behaviour
                systems::forward_perception,
                systems::run_decision_process,
            )
                .chain()
                .in_set(ArenaSet::Ai)
                .run_if(is_authority),
        );
    }
}
