//! AI events: possession requests и perception stimuli.

use bevy::prelude::*;

/// Привязать coordinator к телу
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PossessBody {
    pub coordinator: Entity,
    pub body: Entity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stimulus {
    TargetAcquired(Entity),
    TargetLost(Entity),
}

/// Perception layer → coordinator (opaque "updated"/"forgotten")
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerceptionEvent {
    pub observer: Entity,
    pub stimulus: Stimulus,
}

/// Coordinator → подписанная behaviour логика (форвард без изменений)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BehaviorStimulus {
    pub coordinator: Entity,
    pub stimulus: Stimulus,
}
