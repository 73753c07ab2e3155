//! Authority model: кто источник истины для combat state
//!
//! - Authority (server): HP, ammo, timers, scores: мутируются только здесь
//! - Mirror (client): применяет replicated state, локально трогает только
//!   weapon intent flags (client-predicted fire)

use bevy::prelude::*;

/// Роль процесса в матче
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetRole {
    /// Authoritative side (server / listen-server host)
    #[default]
    Authority,
    /// Non-authoritative viewer (replicated mirror)
    Mirror,
}

impl NetRole {
    pub fn is_authority(self) -> bool {
        matches!(self, NetRole::Authority)
    }
}

/// Run condition: система работает только на authoritative side
pub fn is_authority(role: Res<NetRole>) -> bool {
    role.is_authority()
}
